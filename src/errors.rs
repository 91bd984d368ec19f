use thiserror::Error;

/// Errors raised by the collaborators around the resolution core.
///
/// Normalization and resolution themselves never fail; everything here comes
/// from files, HTTP, or configuration.
#[derive(Error, Debug)]
pub enum IbgeMatchError {
    #[error("file error: {message} (path: {path})")]
    File { message: String, path: String },

    #[error("input error: {message} (path: {path}, line: {line:?})")]
    Input {
        message: String,
        path: String,
        line: Option<u64>,
    },

    #[error("http error: {message} (url: {url})")]
    Http { message: String, url: String },

    #[error("registry error: {message}")]
    Registry { message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience alias for results using `IbgeMatchError`.
pub type Result<T> = std::result::Result<T, IbgeMatchError>;
