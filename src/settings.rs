use std::path::Path;

fn default_addr() -> String {
    "0.0.0.0:8080".to_string()
}

/// Settings for the service itself, read from a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct Settings {
    #[serde(default = "default_addr")]
    pub addr: String,

    #[serde(default)]
    pub env_file: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            env_file: None,
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Like [`Settings::load`], but a missing file means defaults.
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            log::debug!("Settings file {} not found, using defaults", path);
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_settings() {
        let settings: Settings =
            toml::from_str("addr = \"127.0.0.1:9000\"\nenv_file = \"deploy/.env\"\n").unwrap();
        assert_eq!(settings.addr, "127.0.0.1:9000");
        assert_eq!(settings.env_file.as_deref(), Some("deploy/.env"));
    }

    #[test]
    fn empty_file_uses_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.addr, "0.0.0.0:8080");
    }

    #[test]
    fn missing_file_uses_defaults() {
        let settings = Settings::load_or_default("/nonexistent/pma_config/settings.toml").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let _guard = crate::env::lock_process_env();
        let path = std::env::temp_dir().join(format!(
            "pma_config_settings_{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "addr = [").unwrap();
        assert!(Settings::load_or_default(path.to_str().unwrap()).is_err());
        std::fs::remove_file(&path).ok();
    }
}
