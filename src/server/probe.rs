//! HTTP liveness probe for the Ollama API.

use std::time::Duration;

use tracing::debug;

/// Per-probe request timeout.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Path that answers 200 once the server accepts requests.
const HEALTH_PATH: &str = "/api/tags";

/// Lightweight health check against a fixed endpoint.
#[derive(Debug, Clone)]
pub struct HealthProbe {
    client: reqwest::Client,
    url: String,
}

impl HealthProbe {
    /// Probe the server rooted at `base_url` (e.g. `http://127.0.0.1:11434`).
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}{}", base_url.trim_end_matches('/'), HEALTH_PATH),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// True only on HTTP 200. Connection errors, timeouts and any other
    /// status all mean "not running"; nothing is raised to the caller.
    pub async fn is_live(&self) -> bool {
        match self
            .client
            .get(&self.url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(response) if response.status() == reqwest::StatusCode::OK => true,
            Ok(response) => {
                debug!("Health check {} returned {}", self.url, response.status());
                false
            }
            Err(e) => {
                debug!("Health check {} failed: {}", self.url, e);
                false
            }
        }
    }
}
