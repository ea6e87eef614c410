use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};

/// One upstream provider endpoint. Constructed by the caller and injected;
/// the crate never reads environment or files itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub base_url: String,
    pub api_key: String,
}

impl EndpointConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    pub job: EndpointConfig,
    pub realestate: EndpointConfig,
    pub policy: EndpointConfig,
    /// Per-call transport timeout, applied to every TLS candidate.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    20
}

impl HubConfig {
    pub fn new(job: EndpointConfig, realestate: EndpointConfig, policy: EndpointConfig) -> Self {
        Self {
            job,
            realestate,
            policy,
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl Validate for HubConfig {
    fn validate(&self) -> Result<()> {
        validate_url("job.base_url", &self.job.base_url)?;
        validate_url("realestate.base_url", &self.realestate.base_url)?;
        validate_url("policy.base_url", &self.policy.base_url)?;
        validate_non_empty_string("job.api_key", &self.job.api_key)?;
        validate_non_empty_string("realestate.api_key", &self.realestate.api_key)?;
        validate_non_empty_string("policy.api_key", &self.policy.api_key)?;
        validate_range("timeout_secs", self.timeout_secs, 1, 300)?;
        Ok(())
    }
}
