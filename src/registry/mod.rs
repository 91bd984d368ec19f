/// Registry supply: fetches the IBGE municipality list, caches it as JSON,
/// and maps it into [`RegistryEntry`] values ready for indexing.
mod cache;
mod mapping;

pub use cache::{load_cache, save_cache, CacheFile};
pub use mapping::map_municipalities;

use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::config::RegistryConfig;
use crate::errors::{IbgeMatchError, Result};
use crate::http::HttpClient;
use crate::types::RegistryEntry;

/// Outcome of trying to obtain the registry.
#[derive(Debug, Clone)]
pub enum RegistryLoad {
    Available(Vec<RegistryEntry>),
    /// The registry could not be obtained; the resolver is never built.
    Unavailable { reason: String },
}

impl RegistryLoad {
    pub fn is_available(&self) -> bool {
        matches!(self, RegistryLoad::Available(_))
    }

    pub fn entries(&self) -> Option<&[RegistryEntry]> {
        match self {
            RegistryLoad::Available(entries) => Some(entries),
            RegistryLoad::Unavailable { .. } => None,
        }
    }
}

/// Loads the registry from the cache file or the remote API.
pub struct RegistryLoader {
    config: RegistryConfig,
    cache_path: PathBuf,
    client: HttpClient,
}

impl RegistryLoader {
    /// Creates a loader. `cache_path` must already be resolved against the
    /// project root.
    pub fn new(config: RegistryConfig, cache_path: PathBuf) -> Self {
        let client = HttpClient::new(
            Duration::from_secs(config.timeout_secs),
            Duration::from_secs(config.connect_timeout_secs),
        );
        Self {
            config,
            cache_path,
            client,
        }
    }

    /// Loads the registry, preferring the cache unless `refresh` is set.
    ///
    /// Never fails: fetch and shape errors are logged and reported as
    /// [`RegistryLoad::Unavailable`].
    pub fn load(&self, refresh: bool) -> RegistryLoad {
        match self.try_load(refresh) {
            Ok(entries) => RegistryLoad::Available(entries),
            Err(e) => {
                warn!(error = %e, "registry unavailable");
                RegistryLoad::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn try_load(&self, refresh: bool) -> Result<Vec<RegistryEntry>> {
        if !refresh {
            if let Some(raw) = load_cache(&self.cache_path, self.config.cache_max_age_secs) {
                let entries = map_municipalities(&raw);
                info!(
                    path = %self.cache_path.display(),
                    entries = entries.len(),
                    "registry loaded from cache"
                );
                return Ok(entries);
            }
        }

        let raw = self.fetch()?;
        if let Err(e) = save_cache(&self.cache_path, &raw) {
            warn!(error = %e, "failed to write registry cache");
        } else {
            info!(path = %self.cache_path.display(), "registry cache written");
        }

        let entries = map_municipalities(&raw);
        info!(
            url = %self.config.url,
            entries = entries.len(),
            "registry fetched"
        );
        Ok(entries)
    }

    fn fetch(&self) -> Result<Vec<Value>> {
        match self.client.get_json(&self.config.url)? {
            Value::Array(items) => Ok(items),
            other => Err(IbgeMatchError::Registry {
                message: format!(
                    "expected a JSON array of municipalities, got {}",
                    json_kind(&other)
                ),
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
