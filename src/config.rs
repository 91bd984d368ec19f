use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{IbgeMatchError, Result};
use crate::resolution::MatchPolicy;

/// Name of the configuration file stored in the project root.
pub const CONFIG_FILENAME: &str = "ibgematch.toml";

/// Name of the dotenv file consulted for secrets.
pub const DOTENV_FILENAME: &str = ".env";

/// Environment variable holding the submission token.
pub const ACCESS_TOKEN_VAR: &str = "ACCESS_TOKEN";

pub const DEFAULT_REGISTRY_URL: &str =
    "https://servicodados.ibge.gov.br/api/v1/localidades/municipios";

pub const DEFAULT_SUBMIT_URL: &str =
    "https://mynxlubykylncinttggu.functions.supabase.co/ibge-submit";

/// Configuration for an ibgematch project.
///
/// Relative paths are resolved against the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Input CSV with `municipio,populacao` columns.
    pub input_csv: String,
    /// Result CSV written by `run`.
    pub output_csv: String,
    pub registry: RegistryConfig,
    pub submit: SubmitConfig,
    pub matching: MatchPolicy,
}

/// Where and how the municipality registry is fetched and cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub url: String,
    pub cache_file: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Cache entries older than this are refetched; 0 never expires.
    pub cache_max_age_secs: u64,
}

/// Grading endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitConfig {
    pub url: String,
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_csv: "storage/input.csv".to_string(),
            output_csv: "storage/resultado.csv".to_string(),
            registry: RegistryConfig::default(),
            submit: SubmitConfig::default(),
            matching: MatchPolicy::default(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REGISTRY_URL.to_string(),
            cache_file: "storage/cache_municipios.json".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            cache_max_age_secs: 0,
        }
    }
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SUBMIT_URL.to_string(),
            timeout_secs: 30,
            access_token: None,
        }
    }
}

/// Returns the path to the configuration file within the given project root.
pub fn get_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_FILENAME)
}

/// Resolves a configured path against the project root.
///
/// Absolute paths are returned unchanged.
pub fn resolve_project_path(project_root: &Path, configured: &str) -> PathBuf {
    project_root.join(configured)
}

/// Loads the configuration from disk.
///
/// If the configuration file does not exist, returns the default
/// configuration.
pub fn load_config(project_root: &Path) -> Result<AppConfig> {
    let config_path = get_config_path(project_root);

    if !config_path.exists() {
        return Ok(AppConfig::default());
    }

    let contents = fs::read_to_string(&config_path).map_err(|e| IbgeMatchError::Config {
        message: format!(
            "failed to read config file '{}': {}",
            config_path.display(),
            e
        ),
    })?;

    let config: AppConfig = toml::from_str(&contents).map_err(|e| IbgeMatchError::Config {
        message: format!(
            "failed to parse config file '{}': {}",
            config_path.display(),
            e
        ),
    })?;

    Ok(config)
}

/// Saves the configuration to disk using an atomic write.
///
/// Writes to a temporary file first and then renames it to the final location,
/// ensuring that a partial write never corrupts the configuration.
pub fn save_config(project_root: &Path, config: &AppConfig) -> Result<()> {
    fs::create_dir_all(project_root).map_err(|e| IbgeMatchError::Config {
        message: format!(
            "failed to create project directory '{}': {}",
            project_root.display(),
            e
        ),
    })?;

    let config_path = get_config_path(project_root);
    let body = toml::to_string_pretty(config).map_err(|e| IbgeMatchError::Config {
        message: format!("failed to serialize config: {}", e),
    })?;

    write_atomic(&config_path, body.as_bytes()).map_err(|e| IbgeMatchError::Config {
        message: format!(
            "failed to write config file '{}': {}",
            config_path.display(),
            e
        ),
    })
}

/// Writes `contents` to `path` through a sibling temporary file and a rename.
///
/// Creates missing parent directories.
pub fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)
}

/// Parses a dotenv file into a map without touching the process environment.
///
/// Blank lines and `#` comments are skipped; values keep everything after the
/// first `=`. A missing or unreadable file yields an empty map.
pub fn load_dotenv(path: &Path) -> HashMap<String, String> {
    let Ok(contents) = fs::read_to_string(path) else {
        return HashMap::new();
    };

    contents
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            (!key.is_empty()).then(|| (key.to_string(), value.trim_end_matches('\r').to_string()))
        })
        .collect()
}

/// Strips one matching pair of surrounding quotes from a command-line value.
fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    ['"', '\'']
        .into_iter()
        .find_map(|quote| s.strip_prefix(quote)?.strip_suffix(quote))
        .unwrap_or(s)
}

/// Picks the submission token.
///
/// Precedence: command-line value, `ACCESS_TOKEN` in the process environment,
/// `ACCESS_TOKEN` in the project's `.env`, then the config file. Empty values
/// are skipped.
pub fn access_token(
    project_root: &Path,
    cli_token: Option<&str>,
    config: &AppConfig,
) -> Option<String> {
    let non_empty = |s: String| (!s.is_empty()).then_some(s);

    cli_token
        .map(|t| strip_quotes(t).to_string())
        .and_then(non_empty)
        .or_else(|| std::env::var(ACCESS_TOKEN_VAR).ok().and_then(non_empty))
        .or_else(|| {
            load_dotenv(&project_root.join(DOTENV_FILENAME))
                .remove(ACCESS_TOKEN_VAR)
                .and_then(non_empty)
        })
        .or_else(|| config.submit.access_token.clone().and_then(non_empty))
}
