use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::write_atomic;
use crate::errors::{IbgeMatchError, Result};

/// On-disk wrapper around the raw registry payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheFile {
    /// UNIX timestamp (seconds) of the fetch.
    pub fetched_at: u64,
    pub data: Value,
}

/// Returns the current UNIX timestamp in seconds.
pub(crate) fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Loads the cached raw registry items.
///
/// Returns `None` when the file is missing, unreadable, malformed, has no
/// non-empty `data` array, or is older than `max_age_secs` (0 disables the
/// age check).
pub fn load_cache(path: &Path, max_age_secs: u64) -> Option<Vec<Value>> {
    let contents = fs::read_to_string(path).ok()?;
    let cache: CacheFile = match serde_json::from_str(&contents) {
        Ok(c) => c,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "ignoring malformed cache");
            return None;
        }
    };

    if max_age_secs > 0 && current_timestamp().saturating_sub(cache.fetched_at) > max_age_secs {
        debug!(path = %path.display(), fetched_at = cache.fetched_at, "cache expired");
        return None;
    }

    match cache.data {
        Value::Array(items) if !items.is_empty() => Some(items),
        _ => None,
    }
}

/// Writes the raw registry payload to the cache, stamped with the current time.
pub fn save_cache(path: &Path, raw: &[Value]) -> Result<()> {
    let cache = CacheFile {
        fetched_at: current_timestamp(),
        data: Value::Array(raw.to_vec()),
    };
    let json = serde_json::to_vec(&cache)?;
    write_atomic(path, &json).map_err(|e| IbgeMatchError::File {
        message: format!("failed to write registry cache: {}", e),
        path: path.display().to_string(),
    })
}
