use std::{fs, path::Path};

use tracing::{debug, info, instrument};

use super::{Config, ConfigPaths};
use crate::{ReelguardError, Result};

impl Config {
    /// Loads the configuration from the default location.
    ///
    /// A missing file is not an error; defaults are returned instead.
    ///
    /// # Errors
    /// Returns error if the config directory cannot be determined or the file
    /// exists but cannot be read or parsed.
    pub fn load() -> Result<Config> {
        let path = ConfigPaths::main_config()?;
        Self::load_from(&path)
    }

    /// Loads the configuration from an explicit path.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed, or if a
    /// value fails validation.
    #[instrument]
    pub fn load_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            info!("No config file found, using defaults");
            return Ok(Config::default());
        }

        let content =
            fs::read_to_string(path).map_err(|e| ReelguardError::io_at(e, path))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ReelguardError::toml_parse(e, Some(path)))?;
        config.validate()?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    /// Returns error if the TOML is malformed or a value fails validation.
    pub fn from_toml_str(content: &str) -> Result<Config> {
        let config: Config =
            toml::from_str(content).map_err(|e| ReelguardError::toml_parse(e, None))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.registry.video_tab.trim().is_empty() {
            return Err(ReelguardError::InvalidConfigField {
                field: "registry.video_tab".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        let presets = [
            ("unregister", &self.registry.disposal.unregister),
            ("superseded", &self.registry.disposal.superseded),
            ("teardown", &self.registry.disposal.teardown),
        ];
        for (name, preset) in presets {
            if preset.max_attempts == 0 {
                return Err(ReelguardError::InvalidConfigField {
                    field: format!("registry.disposal.{name}.max_attempts"),
                    reason: "at least one attempt is required".to_string(),
                });
            }
        }

        if self.persistence.state_file.trim().is_empty() {
            return Err(ReelguardError::InvalidConfigField {
                field: "persistence.state_file".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
