// ⚙️ Configuration - data directory + default selection
//
// Data directory resolution priority:
// 1. Command-line argument (highest priority)
// 2. ENERGY_ATLAS_DATA_DIR environment variable
// 3. TOML config file (ENERGY_ATLAS_CONFIG, or ./energy-atlas.toml)
// 4. Compiled default "public/data"

use crate::dataset::Year;
use crate::error::{EngineError, Result};
use crate::selection::{Selection, YearRange};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "ENERGY_ATLAS_DATA_DIR";
pub const CONFIG_PATH_ENV: &str = "ENERGY_ATLAS_CONFIG";
pub const CONFIG_FILE_NAME: &str = "energy-atlas.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding the JSON resources
    pub data_dir: PathBuf,
    pub default_country: String,
    pub default_year: Year,
    pub year_range: YearRange,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            data_dir: PathBuf::from("public/data"),
            default_country: "IT".to_string(),
            default_year: 2023,
            year_range: YearRange::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            EngineError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve from CLI argument, environment and config file
    pub fn resolve(cli_data_dir: Option<&Path>) -> Result<Self> {
        let config_path = match env::var(CONFIG_PATH_ENV) {
            Ok(path) => Some(PathBuf::from(path)),
            Err(_) => {
                let local = PathBuf::from(CONFIG_FILE_NAME);
                local.exists().then_some(local)
            }
        };
        Self::resolve_with(cli_data_dir, env::var(DATA_DIR_ENV).ok(), config_path.as_deref())
    }

    fn resolve_with(
        cli_data_dir: Option<&Path>,
        env_data_dir: Option<String>,
        config_path: Option<&Path>,
    ) -> Result<Self> {
        // Priority 3/4: config file or defaults
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => EngineConfig::default(),
        };

        // Priority 1/2: CLI argument, then environment
        if let Some(dir) = cli_data_dir {
            config.data_dir = dir.to_path_buf();
        } else if let Some(dir) = env_data_dir.filter(|d| !d.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_country.trim().is_empty() {
            return Err(EngineError::Config("default_country must not be empty".to_string()));
        }
        if self.year_range.min > self.year_range.max {
            return Err(EngineError::Config(format!(
                "year_range min {} is after max {}",
                self.year_range.min, self.year_range.max
            )));
        }
        Ok(())
    }

    pub fn default_selection(&self) -> Selection {
        Selection::new(&self.default_country, self.default_year)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("public/data"));
        assert_eq!(config.default_selection(), Selection::new("IT", 2023));
        assert_eq!(config.year_range, YearRange::new(1990, 2024));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            data_dir = "/srv/atlas"
            default_country = "DE"
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/atlas"));
        assert_eq!(config.default_country, "DE");
        assert_eq!(config.default_year, 2023);
    }

    #[test]
    fn test_invalid_year_range_rejected() {
        let err = EngineConfig::from_toml_str(
            r#"
            [year_range]
            min = 2024
            max = 1990
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_resolution_priority() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "data_dir = \"from-toml\"\ndefault_year = 2020\n").unwrap();

        // TOML only
        let config = EngineConfig::resolve_with(None, None, Some(&config_path)).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("from-toml"));
        assert_eq!(config.default_year, 2020);

        // Environment beats TOML
        let config =
            EngineConfig::resolve_with(None, Some("from-env".to_string()), Some(&config_path))
                .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("from-env"));

        // CLI beats everything
        let config = EngineConfig::resolve_with(
            Some(Path::new("from-cli")),
            Some("from-env".to_string()),
            Some(&config_path),
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("from-cli"));
        assert_eq!(config.default_year, 2020);

        // Nothing set
        let config = EngineConfig::resolve_with(None, None, None).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let err = EngineConfig::resolve_with(None, None, Some(Path::new("/nonexistent/atlas.toml")))
            .unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }
}
