//! core::config::schema
//!
//! Configuration schema types.
//!
//! Located at (in order of precedence):
//! 1. `$CASEDB_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/casedb/config.toml`
//! 3. `~/.casedb/config.toml` (canonical write location)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// User configuration.
///
/// # Example
///
/// ```toml
/// [load]
/// fill_with_default = true
///
/// [output]
/// format = "json"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CaseConfig {
    /// How case files are read
    pub load: Option<LoadDefaults>,

    /// How documents are printed
    pub output: Option<OutputDefaults>,
}

impl CaseConfig {
    /// Set a value by its dotted key, e.g. `output.format`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an unknown key or a value
    /// that does not parse.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "load.fill_with_default" => {
                let flag = value.parse::<bool>().map_err(|_| {
                    ConfigError::InvalidValue(format!("'{value}' is not true or false"))
                })?;
                self.load.get_or_insert_with(Default::default).fill_with_default = Some(flag);
            }
            "output.format" => {
                self.output.get_or_insert_with(Default::default).format = Some(value.parse()?);
            }
            other => {
                return Err(ConfigError::InvalidValue(format!(
                    "unknown key '{other}', must be one of: load.fill_with_default, output.format"
                )))
            }
        }
        Ok(())
    }
}

/// Loading defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LoadDefaults {
    /// Substitute schema defaults for missing fields instead of failing
    pub fill_with_default: Option<bool>,
}

/// Output defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputDefaults {
    /// Format used by `dump`
    pub format: Option<OutputFormat>,
}

/// Document output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yaml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            other => Err(ConfigError::InvalidValue(format!(
                "invalid format '{other}', must be one of: yaml, json"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Yaml => write!(f, "yaml"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config: CaseConfig = toml::from_str(
            r#"
            [load]
            fill_with_default = true

            [output]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.load.unwrap().fill_with_default, Some(true));
        assert_eq!(config.output.unwrap().format, Some(OutputFormat::Json));
    }

    #[test]
    fn empty_config_is_default() {
        let config: CaseConfig = toml::from_str("").unwrap();
        assert_eq!(config, CaseConfig::default());
    }

    #[test]
    fn unknown_format_rejected() {
        let result: Result<CaseConfig, _> = toml::from_str("[output]\nformat = \"xml\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn set_by_dotted_key() {
        let mut config = CaseConfig::default();
        config.set("output.format", "JSON").unwrap();
        config.set("load.fill_with_default", "true").unwrap();
        assert_eq!(config.output.unwrap().format, Some(OutputFormat::Json));
        assert_eq!(config.load.unwrap().fill_with_default, Some(true));
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut config = CaseConfig::default();
        let err = config.set("output.colour", "red").unwrap_err();
        insta::assert_snapshot!(
            err.to_string(),
            @"invalid config value: unknown key 'output.colour', must be one of: load.fill_with_default, output.format"
        );
    }
}
