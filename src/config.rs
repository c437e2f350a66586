use crate::types::Config;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.json";

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Config stored in the platform config directory
    pub fn new() -> Result<Self> {
        let project_dirs = ProjectDirs::from("", "", "exam-buddy")
            .context("Failed to determine config directory")?;

        let config_dir = project_dirs.config_dir().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        }

        Ok(ConfigManager {
            config_path: config_dir.join(CONFIG_FILE),
        })
    }

    /// Config stored at an explicit path
    pub fn at_path<P: AsRef<Path>>(path: P) -> Self {
        ConfigManager {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn load_config(&self) -> Result<Config> {
        if !self.config_path.exists() {
            let config = Config::default();
            self.save_config(&config)?;
            return Ok(config);
        }

        let content =
            fs::read_to_string(&self.config_path).context("Failed to read config file")?;

        let config: Config = serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse config file: {}. Using defaults.", e);
            Config::default()
        });

        Ok(config.validated())
    }

    pub fn save_config(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }

        let content = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(&self.config_path, content).context("Failed to write config file")?;

        Ok(())
    }
}
