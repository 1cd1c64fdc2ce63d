use super::Config;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::Path;

impl Config {
    /// Load `~/.aligntool/config.toml`, writing defaults on first run.
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let aligntool_dir = home.join(".aligntool");
        let config_path = aligntool_dir.join("config.toml");

        if !aligntool_dir.exists() {
            fs::create_dir_all(&aligntool_dir).context("Failed to create .aligntool directory")?;
        }

        if config_path.exists() {
            load_from_path(&config_path)
        } else {
            let mut config = Self {
                config_path,
                ..Self::default()
            };
            config.save()?;
            config.apply_env_overrides();
            config.validate()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}

/// Read, apply env overrides to, and validate the config at `path`.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let mut config: Config = toml::from_str(&contents).context("Failed to parse config file")?;
    config.config_path = path.to_path_buf();
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}
