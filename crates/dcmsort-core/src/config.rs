use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;

pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_RENAME_ATTEMPTS: u32 = 5;

/// Knobs for one reconciliation run. Passed into the engine; nothing here is global.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SortConfig {
    /// Width of the worker pool used for extraction and file moves.
    pub workers: usize,
    /// Attempts per folder rename in each retry pass.
    pub rename_attempts: u32,
    /// Extra pause before folder renames, for filesystems that release handles lazily.
    pub settle_delay_ms: u64,
    /// Glob patterns; matching directories are skipped along with their subtrees.
    pub ignore_patterns: Vec<String>,
    /// Compute plans without touching the filesystem.
    pub dry_run: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            rename_attempts: DEFAULT_RENAME_ATTEMPTS,
            settle_delay_ms: 0,
            ignore_patterns: Vec::new(),
            dry_run: false,
        }
    }
}

impl SortConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Message("workers must be at least 1".into()));
        }
        if self.rename_attempts == 0 {
            return Err(ConfigError::Message(
                "rename_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// `DCMSORT_*` variables. `DCMSORT_IGNORE_PATTERNS` is a comma-separated list.
fn environment() -> Environment {
    Environment::with_prefix("DCMSORT")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("ignore_patterns")
}

/// Load `Config.*` from the working directory (optional) overlaid with `DCMSORT_*` variables.
pub fn load_configuration() -> Result<SortConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(environment())
        .build()?;
    let config = builder.try_deserialize::<SortConfig>()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Map;

    #[test]
    fn test_defaults() {
        let config = SortConfig::default();
        assert_eq!(config.workers, 10);
        assert_eq!(config.rename_attempts, 5);
        assert_eq!(config.settle_delay_ms, 0);
        assert!(!config.dry_run);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_source_keeps_defaults() {
        let config: SortConfig = Config::builder()
            .set_override("workers", 3)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.rename_attempts, DEFAULT_RENAME_ATTEMPTS);
    }

    #[test]
    fn test_environment_parses_lists_and_numbers() {
        let mut vars = Map::new();
        vars.insert("DCMSORT_IGNORE_PATTERNS".to_string(), "*/tmp,**/scratch".to_string());
        vars.insert("DCMSORT_WORKERS".to_string(), "3".to_string());
        vars.insert("DCMSORT_DRY_RUN".to_string(), "true".to_string());

        let config: SortConfig = Config::builder()
            .add_source(environment().source(Some(vars)))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.ignore_patterns, vec!["*/tmp", "**/scratch"]);
        assert_eq!(config.workers, 3);
        assert!(config.dry_run);
        assert_eq!(config.rename_attempts, DEFAULT_RENAME_ATTEMPTS);
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let config = SortConfig {
            workers: 0,
            ..SortConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
