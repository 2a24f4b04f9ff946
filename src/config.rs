//! Runtime configuration read from `AUTO_COMMIT_*` environment variables.
//!
//! Every setting has a default; an invalid value logs a warning and falls
//! back to that default rather than aborting the run.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::diff::NoiseFiles;

/// Model used when `AUTO_COMMIT_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "hf.co/bartowski/Meta-Llama-3.1-8B-Instruct-GGUF:Q4_K_M";

/// Loopback host the Ollama server listens on.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Ollama's well-known port.
pub const DEFAULT_PORT: u16 = 11434;

/// Name of the Ollama executable.
pub const DEFAULT_BINARY: &str = "ollama";

/// Deterministic sampling.
pub const DEFAULT_TEMPERATURE: f32 = 0.0;

/// How long to wait for a freshly spawned server to answer its health check.
const DEFAULT_STARTUP_TIMEOUT_SECS: u64 = 5;

/// Default timeout for the inference request (5 minutes).
const DEFAULT_INFERENCE_TIMEOUT_SECS: u64 = 300;

const MODEL_ENV_VAR: &str = "AUTO_COMMIT_MODEL";
const HOST_ENV_VAR: &str = "AUTO_COMMIT_OLLAMA_HOST";
const PORT_ENV_VAR: &str = "AUTO_COMMIT_OLLAMA_PORT";
const BINARY_ENV_VAR: &str = "AUTO_COMMIT_OLLAMA_BIN";
const TEMPERATURE_ENV_VAR: &str = "AUTO_COMMIT_TEMPERATURE";
const STARTUP_TIMEOUT_ENV_VAR: &str = "AUTO_COMMIT_STARTUP_TIMEOUT";
const INFERENCE_TIMEOUT_ENV_VAR: &str = "AUTO_COMMIT_INFERENCE_TIMEOUT";
const NOISE_FILES_ENV_VAR: &str = "AUTO_COMMIT_NOISE_FILES";

/// Resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub model: String,
    pub host: String,
    pub port: u16,
    pub binary: String,
    pub temperature: f32,
    pub startup_timeout: Duration,
    pub inference_timeout: Duration,
    pub noise_files: NoiseFiles,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            binary: DEFAULT_BINARY.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            startup_timeout: Duration::from_secs(DEFAULT_STARTUP_TIMEOUT_SECS),
            inference_timeout: Duration::from_secs(DEFAULT_INFERENCE_TIMEOUT_SECS),
            noise_files: NoiseFiles::default(),
        }
    }
}

impl Config {
    /// Build a configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let noise_files = match env::var(NOISE_FILES_ENV_VAR) {
            Ok(v) if !v.trim().is_empty() => NoiseFiles::from_iter(
                v.split(',').map(str::trim).filter(|s| !s.is_empty()),
            ),
            _ => defaults.noise_files,
        };

        Self {
            model: string_var(MODEL_ENV_VAR).unwrap_or(defaults.model),
            host: string_var(HOST_ENV_VAR).unwrap_or(defaults.host),
            port: parsed_var(PORT_ENV_VAR, defaults.port),
            binary: string_var(BINARY_ENV_VAR).unwrap_or(defaults.binary),
            temperature: parsed_var(TEMPERATURE_ENV_VAR, defaults.temperature),
            startup_timeout: Duration::from_secs(parsed_var(
                STARTUP_TIMEOUT_ENV_VAR,
                DEFAULT_STARTUP_TIMEOUT_SECS,
            )),
            inference_timeout: Duration::from_secs(parsed_var(
                INFERENCE_TIMEOUT_ENV_VAR,
                DEFAULT_INFERENCE_TIMEOUT_SECS,
            )),
            noise_files,
        }
    }

    /// Base URL of the Ollama HTTP API.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Value for `OLLAMA_HOST` so a spawned server binds where we probe.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Read a non-empty string variable.
fn string_var(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

/// Read and parse a variable, warning and using `default` when it is invalid.
fn parsed_var<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match env::var(name) {
        Ok(v) if !v.is_empty() => match v.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!("Invalid {} value '{}', using default {}", name, v, default);
                default
            }
        },
        _ => default,
    }
}
