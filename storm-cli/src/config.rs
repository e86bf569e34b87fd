//! Configuration file support

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// StormLib shared library to load
    pub library: Option<PathBuf>,

    /// Default wildcard filter
    pub filter: Option<String>,

    /// Default extraction directory
    pub target: Option<PathBuf>,
}

/// Default config locations, most specific first
fn default_paths() -> Vec<PathBuf> {
    match dirs::home_dir() {
        Some(home) => vec![
            home.join(".storm-cli").join("config.toml"),
            home.join(".config").join("storm-cli").join("config.toml"),
        ],
        None => Vec::new(),
    }
}

/// Load configuration from file or defaults
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_paths().into_iter().find(|p| p.exists()) {
            Some(p) => p,
            None => return Ok(Config::default()),
        },
    };

    if !config_path.exists() {
        return Ok(Config::default());
    }

    log::debug!("Reading configuration from {}", config_path.display());
    let contents = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;
    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "library = \"/opt/stormlib/libstorm.so\"\nfilter = \"data/**\"\ntarget = \"out\"\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(
            config,
            Config {
                library: Some(PathBuf::from("/opt/stormlib/libstorm.so")),
                filter: Some("data/**".to_string()),
                target: Some(PathBuf::from("out")),
            }
        );
    }

    #[test]
    fn test_partial_config_leaves_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "filter = \"*.txt\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.filter.as_deref(), Some("*.txt"));
        assert_eq!(config.library, None);
        assert_eq!(config.target, None);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "compression = \"zlib\"\n").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }
}
