//! Blocking JSON-over-HTTP client shared by the registry loader and the
//! submission step.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use ureq::Agent;

use crate::errors::{IbgeMatchError, Result};

/// Upper bound on response bodies; the full municipality list is a few MB.
const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// Thin wrapper over a `ureq` agent with fixed timeouts.
#[derive(Clone)]
pub struct HttpClient {
    agent: Agent,
}

impl HttpClient {
    /// Creates a client with a global request timeout and a connect timeout.
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            .timeout_connect(Some(connect_timeout))
            .build();
        Self {
            agent: config.into(),
        }
    }

    /// Sends a GET request and decodes the response body as JSON.
    ///
    /// Non-2xx statuses, transport failures, and invalid JSON all become
    /// [`IbgeMatchError::Http`].
    pub fn get_json(&self, url: &str) -> Result<Value> {
        debug!(url, "GET");
        let mut response = self
            .agent
            .get(url)
            .header("Accept", "application/json")
            .call()
            .map_err(|e| http_error(url, "GET failed", e))?;

        response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_json::<Value>()
            .map_err(|e| http_error(url, "invalid JSON in GET response", e))
    }

    /// Sends `payload` as a JSON POST with a bearer token and decodes the
    /// JSON response.
    pub fn post_json<T: Serialize>(&self, url: &str, payload: &T, token: &str) -> Result<Value> {
        debug!(url, "POST");
        let mut response = self
            .agent
            .post(url)
            .header("Accept", "application/json")
            .header("Authorization", format!("Bearer {}", token))
            .send_json(payload)
            .map_err(|e| http_error(url, "POST failed", e))?;

        response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_json::<Value>()
            .map_err(|e| http_error(url, "invalid JSON in POST response", e))
    }
}

fn http_error(url: &str, context: &str, err: ureq::Error) -> IbgeMatchError {
    IbgeMatchError::Http {
        message: format!("{}: {}", context, err),
        url: url.to_string(),
    }
}
