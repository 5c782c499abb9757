use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub datasets: DatasetsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatasetsConfig {
    pub zones_url: String,
    pub occupations_url: String,
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dataset_urls() {
        let config: Config = toml::from_str(
            "[datasets]\n\
             zones_url = \"https://example.com/zones.zip\"\n\
             occupations_url = \"https://example.com/occupations.zip\"\n",
        )
        .unwrap();
        assert_eq!(config.datasets.zones_url, "https://example.com/zones.zip");
        assert_eq!(
            config.datasets.occupations_url,
            "https://example.com/occupations.zip"
        );
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = Config::load_from_file(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/config.toml"));
    }
}
