//! Configuration management for stable-collector
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use crate::walk::WalkOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory to index (the WebUI outputs folder). Can be overridden on
    /// the command line per run.
    #[serde(default)]
    pub search_root: Option<PathBuf>,

    /// Persisted index location; defaults to `<base>/index.json`
    #[serde(default)]
    pub index_file: Option<PathBuf>,

    /// Discard the persisted index before every run
    #[serde(default)]
    pub reset_on_start: bool,

    /// Directory walk configuration
    #[serde(default)]
    pub walk: WalkSection,

    /// Query configuration
    #[serde(default)]
    pub query: QuerySection,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// Directory walk configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkSection {
    /// Exclude paths containing the substring "grid"
    #[serde(default = "default_skip_grid_files")]
    pub skip_grid_files: bool,

    /// Stop indexing once this many entries exist
    #[serde(default)]
    pub max_files: Option<usize>,

    /// Recursion depth cap
    #[serde(default = "default_walk_max_depth")]
    pub max_depth: usize,
}

/// Query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySection {
    /// Candidate terms to pick from when no query term is supplied
    #[serde(default = "default_query_candidates")]
    pub candidates: Vec<String>,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for stable-collector data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_root: None,
            index_file: None,
            reset_on_start: false,
            walk: WalkSection::default(),
            query: QuerySection::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Default for WalkSection {
    fn default() -> Self {
        Self {
            skip_grid_files: default_skip_grid_files(),
            max_files: None,
            max_depth: default_walk_max_depth(),
        }
    }
}

impl Default for QuerySection {
    fn default() -> Self {
        Self {
            candidates: default_query_candidates(),
        }
    }
}

impl Config {
    /// Get the default base directory (~/.stable-collector)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".stable-collector")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
            base_dir: base,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a base directory, falling back to defaults
    /// when no config file exists there yet.
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir);

        if config.paths.config_file.exists() {
            debug!("Loading config from {:?}", config.paths.config_file);
            let content = std::fs::read_to_string(&config.paths.config_file)?;
            let mut loaded: Config = toml::from_str(&content)?;
            loaded.paths = config.paths;
            loaded.validate()?;
            config = loaded;
        } else {
            debug!("No config file found, using defaults");
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Effective index file location
    pub fn index_path(&self) -> PathBuf {
        self.index_file
            .clone()
            .unwrap_or_else(|| self.paths.base_dir.join("index.json"))
    }

    /// Walk options derived from the config
    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            skip_grid_files: self.walk.skip_grid_files,
            max_files: self.walk.max_files,
            max_depth: self.walk.max_depth,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.walk.max_depth == 0 {
            return Err(Error::Config(
                "walk.max_depth must be at least 1".to_string(),
            ));
        }

        if self.query.candidates.is_empty() {
            return Err(Error::Config(
                "query.candidates must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.walk.skip_grid_files);
        assert_eq!(config.walk.max_files, None);
        assert_eq!(config.query.candidates.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.init_paths(Some(tmp.path().to_path_buf()));
        config.search_root = Some(PathBuf::from("/tmp/outputs"));
        config.walk.max_files = Some(500);

        config.save().unwrap();
        assert!(config.paths.config_file.exists());

        let loaded = Config::load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(loaded.search_root, Some(PathBuf::from("/tmp/outputs")));
        assert_eq!(loaded.walk.max_files, Some(500));
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(config.walk.skip_grid_files);
        assert_eq!(config.index_path(), tmp.path().join("index.json"));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "search_root = \"/data/outputs\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.search_root, Some(PathBuf::from("/data/outputs")));
        assert!(config.walk.skip_grid_files);
        assert_eq!(config.walk.max_depth, default_walk_max_depth());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.walk.max_depth = 0;
        assert!(config.validate().is_err());
        config.walk.max_depth = 8;
        assert!(config.validate().is_ok());

        config.query.candidates.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_index_file_override() {
        let mut config = Config::default();
        config.init_paths(Some(PathBuf::from("/base")));
        assert_eq!(config.index_path(), PathBuf::from("/base/index.json"));

        config.index_file = Some(PathBuf::from("/elsewhere/idx.json"));
        assert_eq!(config.index_path(), PathBuf::from("/elsewhere/idx.json"));
    }
}
