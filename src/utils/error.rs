use thiserror::Error;

#[derive(Error, Debug)]
pub enum HubError {
    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("response parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("provider error {code}: {message}")]
    Provider { code: i64, message: String },

    #[error("invalid configuration value for {field}: {value} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, HubError>;
