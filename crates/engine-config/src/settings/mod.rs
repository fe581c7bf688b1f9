use crate::settings::{
    error::ConfigError, raw::RawSettings, validated::Configuration, validator::SettingsValidator,
};
use std::path::Path;

pub mod error;
pub mod keys;
pub mod raw;
pub mod validated;
pub mod validator;

/// Reads a JSON settings file and validates it for the named source.
pub fn load_configuration(
    path: impl AsRef<Path>,
    source_name: &str,
) -> Result<Configuration, ConfigError> {
    let raw = RawSettings::from_path(path)?;
    SettingsValidator::new(source_name, &raw).validate()
}
