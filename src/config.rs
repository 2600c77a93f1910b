use crate::error::{config_error, env_error, SlotResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use tracing::warn;
use url::Url;

/// Default path of the department catalog endpoint
pub const DEFAULT_CATALOG_PATH: &str = "lenskart/department-dropdown";
/// Default path of the apply (submit) endpoint
pub const DEFAULT_APPLY_PATH: &str = "lenskart/apply";
/// Default HTTP timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
/// Optional file with endpoint overrides
pub const OVERRIDES_FILE: &str = "config/slots.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the catalog and apply collaborator
    pub api_base_url: String,
    /// Department whose catalog is active, if known
    pub department: Option<String>,
    /// Job the selection applies to
    pub job_id: String,
    /// Bearer token used when submitting
    pub auth_token: Option<String>,
    /// Catalog endpoint path relative to the base URL
    pub catalog_path: String,
    /// Apply endpoint path relative to the base URL
    pub apply_path: String,
    /// HTTP timeout in seconds
    pub request_timeout_secs: u64,
    /// Locale for user-facing messages
    pub locale: String,
}

/// Overrides read from `config/slots.toml`
#[derive(Debug, Default, Deserialize)]
struct FileOverrides {
    catalog_path: Option<String>,
    apply_path: Option<String>,
    request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> SlotResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let api_base_url =
            env::var("SLOTS_API_BASE_URL").map_err(|_| env_error("SLOTS_API_BASE_URL"))?;
        Url::parse(&api_base_url)
            .map_err(|e| config_error(&format!("Invalid SLOTS_API_BASE_URL: {}", e)))?;

        let department = env::var("SLOTS_DEPARTMENT")
            .ok()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        let job_id = env::var("SLOTS_JOB_ID").unwrap_or_default();
        let auth_token = env::var("SLOTS_AUTH_TOKEN").ok().filter(|t| !t.is_empty());

        let request_timeout_secs = match env::var("SLOTS_REQUEST_TIMEOUT_SECS") {
            Ok(value) => value
                .parse::<u64>()
                .map_err(|_| config_error("Invalid SLOTS_REQUEST_TIMEOUT_SECS format"))?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let locale = env::var("SLOTS_LOCALE").unwrap_or_else(|_| String::from("en"));

        let mut config = Config {
            api_base_url,
            department,
            job_id,
            auth_token,
            catalog_path: DEFAULT_CATALOG_PATH.to_string(),
            apply_path: DEFAULT_APPLY_PATH.to_string(),
            request_timeout_secs,
            locale,
        };

        config.apply_overrides_file(Path::new(OVERRIDES_FILE));

        Ok(config)
    }

    /// Merge endpoint overrides from a TOML file, ignoring unreadable files
    pub fn apply_overrides_file(&mut self, path: &Path) {
        let Ok(content) = fs::read_to_string(path) else {
            return;
        };

        match toml::from_str::<FileOverrides>(&content) {
            Ok(overrides) => self.merge(overrides),
            Err(e) => warn!("Ignoring malformed {}: {}", path.display(), e),
        }
    }

    fn merge(&mut self, overrides: FileOverrides) {
        if let Some(path) = overrides.catalog_path {
            self.catalog_path = path;
        }
        if let Some(path) = overrides.apply_path {
            self.apply_path = path;
        }
        if let Some(secs) = overrides.request_timeout_secs {
            self.request_timeout_secs = secs;
        }
    }

    /// Resolve an endpoint path against the base URL
    pub fn endpoint(&self, path: &str) -> SlotResult<Url> {
        let mut base = self.api_base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)
            .map_err(|e| config_error(&format!("Invalid base URL {}: {}", self.api_base_url, e)))?;
        base.join(path.trim_start_matches('/'))
            .map_err(|e| config_error(&format!("Invalid endpoint path {}: {}", path, e)))
    }
}
