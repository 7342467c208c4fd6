//! Codec options
//!
//! Options resolve in three layers: built-in values, `SECHUB_CODEC_*`
//! environment variables, then an optional `[codec]` table in a TOML file.
//! Keys missing from the file keep their environment or built-in value.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Default cap on predicates per filter field
pub const DEFAULT_MAX_FILTERS_PER_FIELD: usize = 20;

// ============================================================================
// CODEC MODE
// ============================================================================

/// How the codecs treat ambiguous or malformed input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecMode {
    /// Record every problem and reject the tree as a whole
    Strict,
    /// Permissive: swallow parse failures, first populated union arm wins
    Legacy,
}

impl CodecMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "legacy" => Some(Self::Legacy),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Legacy => "legacy",
        }
    }
}

impl std::fmt::Display for CodecMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CODEC OPTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Strict or legacy handling of malformed input
    pub mode: CodecMode,

    /// Maximum predicates per filter field, `None` or `0` for no limit.
    /// Only enforced in strict mode.
    pub max_filters_per_field: Option<usize>,

    /// Whether date filter bounds must be RFC 3339 timestamps (strict mode)
    pub validate_timestamps: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            mode: env::var("SECHUB_CODEC_MODE")
                .ok()
                .and_then(|v| CodecMode::parse(&v))
                .unwrap_or(CodecMode::Strict),
            max_filters_per_field: env::var("SECHUB_CODEC_MAX_FILTERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .or(Some(DEFAULT_MAX_FILTERS_PER_FIELD)),
            validate_timestamps: env::var("SECHUB_CODEC_VALIDATE_TIMESTAMPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

impl CodecOptions {
    /// Strict options with built-in values, ignoring the environment
    pub fn strict() -> Self {
        Self {
            mode: CodecMode::Strict,
            max_filters_per_field: Some(DEFAULT_MAX_FILTERS_PER_FIELD),
            validate_timestamps: true,
        }
    }

    /// Permissive options matching the historical provider behaviour
    pub fn legacy() -> Self {
        Self {
            mode: CodecMode::Legacy,
            max_filters_per_field: None,
            validate_timestamps: false,
        }
    }

    pub fn with_mode(mut self, mode: CodecMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_filters_per_field(mut self, max: Option<usize>) -> Self {
        self.max_filters_per_field = max;
        self
    }

    pub fn with_timestamp_validation(mut self, enabled: bool) -> Self {
        self.validate_timestamps = enabled;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.mode == CodecMode::Strict
    }

    /// Effective per-field limit, `None` when unlimited
    pub fn filter_limit(&self) -> Option<usize> {
        self.max_filters_per_field.filter(|max| *max > 0)
    }

    /// Load options from TOML text containing an optional `[codec]` table
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.codec.unwrap_or_default())
    }

    /// Load options from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    codec: Option<CodecOptions>,
}

/// Errors while loading codec options
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_mode_parse() {
        assert_eq!(CodecMode::parse("Strict"), Some(CodecMode::Strict));
        assert_eq!(CodecMode::parse(" legacy "), Some(CodecMode::Legacy));
        assert_eq!(CodecMode::parse("lenient"), None);
    }

    #[test]
    fn test_presets() {
        let strict = CodecOptions::strict();
        assert!(strict.is_strict());
        assert_eq!(strict.filter_limit(), Some(20));

        let legacy = CodecOptions::legacy();
        assert!(!legacy.is_strict());
        assert_eq!(legacy.filter_limit(), None);
        assert!(!legacy.validate_timestamps);
    }

    #[test]
    fn test_zero_limit_means_unlimited() {
        let options = CodecOptions::strict().with_max_filters_per_field(Some(0));
        assert_eq!(options.filter_limit(), None);
    }

    #[test]
    fn test_from_toml_str() {
        let options = CodecOptions::from_toml_str(
            r#"
            [codec]
            mode = "legacy"
            max_filters_per_field = 5
            validate_timestamps = false
            "#,
        )
        .unwrap();

        assert_eq!(options.mode, CodecMode::Legacy);
        assert_eq!(options.max_filters_per_field, Some(5));
        assert!(!options.validate_timestamps);
    }

    #[test]
    fn test_from_toml_str_rejects_bad_mode() {
        let result = CodecOptions::from_toml_str("[codec]\nmode = \"lenient\"\n");
        assert_matches!(result, Err(ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[codec]").unwrap();
        writeln!(file, "mode = \"strict\"").unwrap();
        writeln!(file, "max_filters_per_field = 3").unwrap();

        let options = CodecOptions::from_toml_file(file.path()).unwrap();
        assert_eq!(options.mode, CodecMode::Strict);
        assert_eq!(options.filter_limit(), Some(3));
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = CodecOptions::from_toml_file(dir.path().join("absent.toml"));
        assert_matches!(result, Err(ConfigError::Io { .. }));
    }
}
