//! Default paths and configuration directory management

use crate::serialization::GrammarFormat;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Get the configuration directory for phrase-trie
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine configuration directory")?;
    Ok(base.join("phrase-trie"))
}

/// Get the default grammar path for a given format
pub fn default_grammar_path(format: GrammarFormat) -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    Ok(dir.join(format!("grammar.{}", format.extension())))
}

/// Get the config file path with optional override
pub fn config_file_path_with_override(custom_path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = custom_path {
        validate_config_path(&path)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        return Ok(path);
    }

    let dir = config_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    Ok(dir.join("config.json"))
}

/// Validate that a config file path has .json extension
pub fn validate_config_path(path: &Path) -> Result<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => Ok(()),
        Some(ext) => Err(anyhow::anyhow!(
            "Config file must have .json extension, got .{}. Please use a .json file.",
            ext
        )),
        None => Err(anyhow::anyhow!(
            "Config file must have .json extension. Please add .json to the filename."
        )),
    }
}

/// User configuration stored in config file
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PersistentConfig {
    /// Default grammar path
    pub grammar_path: Option<PathBuf>,
    /// Default format
    pub format: Option<GrammarFormat>,
    /// Default scope
    pub scope: Option<String>,
    /// Default lookahead
    pub lookahead: Option<usize>,
    /// Default result limit
    pub limit: Option<usize>,
}

impl PersistentConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from custom path
    pub fn load_from(custom_path: Option<PathBuf>) -> Result<Self> {
        let path = config_file_path_with_override(custom_path)?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(None)
    }

    /// Save configuration to custom path
    pub fn save_to(&self, custom_path: Option<PathBuf>) -> Result<()> {
        let path = config_file_path_with_override(custom_path)?;
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Merge with command-line options (CLI options take precedence)
    pub fn merge_with_cli(&self, cli: &PersistentConfig) -> Self {
        Self {
            grammar_path: cli.grammar_path.clone().or_else(|| self.grammar_path.clone()),
            format: cli.format.or(self.format),
            scope: cli.scope.clone().or_else(|| self.scope.clone()),
            lookahead: cli.lookahead.or(self.lookahead),
            limit: cli.limit.or(self.limit),
        }
    }

    /// Grammar path to use: the configured one, else the default location.
    pub fn resolve_grammar_path(&self) -> Result<PathBuf> {
        match &self.grammar_path {
            Some(path) => Ok(path.clone()),
            None => default_grammar_path(self.format.unwrap_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_values_take_precedence() {
        let stored = PersistentConfig {
            grammar_path: Some(PathBuf::from("stored.json")),
            scope: Some("main".to_string()),
            lookahead: Some(2),
            ..Default::default()
        };
        let cli = PersistentConfig {
            scope: Some("colors".to_string()),
            limit: Some(5),
            ..Default::default()
        };

        let merged = stored.merge_with_cli(&cli);
        assert_eq!(merged.grammar_path, Some(PathBuf::from("stored.json")));
        assert_eq!(merged.scope.as_deref(), Some("colors"));
        assert_eq!(merged.lookahead, Some(2));
        assert_eq!(merged.limit, Some(5));
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = PersistentConfig {
            format: Some(GrammarFormat::Bincode),
            lookahead: Some(3),
            ..Default::default()
        };

        config.save_to(Some(path.clone())).unwrap();
        assert_eq!(PersistentConfig::load_from(Some(path)).unwrap(), config);
    }

    #[test]
    fn test_config_path_must_be_json() {
        assert!(validate_config_path(Path::new("config.json")).is_ok());
        assert!(validate_config_path(Path::new("config.toml")).is_err());
        assert!(validate_config_path(Path::new("config")).is_err());
    }
}
