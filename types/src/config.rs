use serde::{Deserialize, Serialize};

/// Year assumed for timestamps that omit it (older log headers).
pub const DEFAULT_YEAR: i32 = 2024;

/// Combat log format family.
///
/// `Retail` logs carry explicit arena markers and `COMBATANT_INFO`
/// snapshots. `Classic` is the legacy layout: no markers, no snapshots,
/// a shorter advanced block, and occasional double-flushed lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Retail,
    Classic,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Retail => "retail",
            LogFormat::Classic => "classic",
        }
    }

    /// Whether identical lines may be emitted twice within one timestamp.
    pub fn needs_dedup(self) -> bool {
        matches!(self, LogFormat::Classic)
    }

    /// Whether match boundaries and outcomes must be inferred.
    pub fn needs_inference(self) -> bool {
        matches!(self, LogFormat::Classic)
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "retail" => Ok(LogFormat::Retail),
            "classic" | "legacy" => Ok(LogFormat::Classic),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Parser settings persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub log_format: LogFormat,
    /// Year used when a line's timestamp carries only month/day.
    pub default_year: i32,
    /// Let line sources pick the format from the `COMBAT_LOG_VERSION` header.
    pub detect_format: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Retail,
            default_year: DEFAULT_YEAR,
            detect_format: true,
        }
    }
}

impl ParserConfig {
    pub fn with_format(log_format: LogFormat) -> Self {
        Self {
            log_format,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_toml() {
        let toml = r#"
log_format = "classic"
default_year = 2021
"#;

        let config: ParserConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.log_format, LogFormat::Classic);
        assert_eq!(config.default_year, 2021);
        // Missing keys fall back to defaults
        assert!(config.detect_format);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: ParserConfig = toml::from_str("").unwrap();
        assert_eq!(config, ParserConfig::default());
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("Retail".parse::<LogFormat>(), Ok(LogFormat::Retail));
        assert_eq!("legacy".parse::<LogFormat>(), Ok(LogFormat::Classic));
        assert!("wotlk".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_format_capabilities() {
        assert!(LogFormat::Classic.needs_dedup());
        assert!(LogFormat::Classic.needs_inference());
        assert!(!LogFormat::Retail.needs_dedup());
        assert!(!LogFormat::Retail.needs_inference());
    }
}
