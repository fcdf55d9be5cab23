//! TOML parsing for the arm configuration

use fischer_core::config::ArmConfig;

use super::loader::LoadError;

/// Parse and validate an arm configuration
pub fn parse_config(input: &str) -> Result<ArmConfig, LoadError> {
    let config: ArmConfig = ::toml::from_str(input)?;
    config.validate()?;
    Ok(config)
}
