use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::style::DEFAULT_STYLE;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Style name used when none is given on the command line
    pub style: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        // Use ~/.config instead of platform-specific directory
        let home_dir = dirs::home_dir()
            .ok_or_else(|| color_eyre::eyre::eyre!("Could not find home directory"))?;

        let app_dir = home_dir.join(".config").join("httpretty");

        // Create directory if it doesn't exist
        if !app_dir.exists() {
            fs::create_dir_all(&app_dir)?;
        }

        Ok(app_dir.join("config.toml"))
    }

    /// Load config from file, or return default if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(&config_path, toml_string)?;
        Ok(())
    }

    /// The configured style, or the built-in default
    pub fn style(&self) -> &str {
        self.output.style.as_deref().unwrap_or(DEFAULT_STYLE)
    }

    /// Remember `style` as the default and save
    pub fn set_style(&mut self, style: String) -> Result<()> {
        self.output.style = Some(style);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style() {
        assert_eq!(Config::default().style(), "default");
    }

    #[test]
    fn test_parse_style() {
        let config = Config::parse("[output]\nstyle = \"monokai\"\n").unwrap();
        assert_eq!(config.style(), "monokai");
    }

    #[test]
    fn test_parse_empty_file() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_rejects_wrong_type() {
        assert!(Config::parse("[output]\nstyle = 3\n").is_err());
    }
}
