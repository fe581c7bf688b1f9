use thiserror::Error;

/// Errors raised while turning raw settings into a [`Configuration`].
///
/// [`Configuration`]: crate::settings::validated::Configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingRequired(&'static str),

    #[error("'custom.query' requires 'incremental.column' to be set")]
    CustomQueryWithoutIncrementalColumn,

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    ValidationFailed(Vec<ConfigError>),
}
