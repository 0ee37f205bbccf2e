use crate::error::ChatPulseError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const CONFIG_PATH_ENV: &str = "CHATPULSE_CONFIG";
pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FILE_ENV: &str = "CHATPULSE_LOG_FILE";

fn default_port() -> u16 {
    8000
}
fn default_web_host() -> String {
    "0.0.0.0".into()
}
fn default_data_dir() -> String {
    ".".into()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram_bot_token: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_web_host")]
    pub web_host: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default)]
    pub log_to_file: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            telegram_bot_token: String::new(),
            port: default_port(),
            web_host: default_web_host(),
            data_dir: default_data_dir(),
            log_to_file: false,
        }
    }
}

impl Config {
    pub fn resolve_config_path() -> Result<Option<PathBuf>, ChatPulseError> {
        if let Ok(custom) = std::env::var(CONFIG_PATH_ENV) {
            if std::path::Path::new(&custom).exists() {
                return Ok(Some(PathBuf::from(custom)));
            }
            return Err(ChatPulseError::Config(format!(
                "{CONFIG_PATH_ENV} points to non-existent file: {custom}"
            )));
        }

        for candidate in ["./chatpulse.config.yaml", "./chatpulse.config.yml"] {
            if std::path::Path::new(candidate).exists() {
                return Ok(Some(PathBuf::from(candidate)));
            }
        }
        Ok(None)
    }

    /// Load the optional YAML file, then let the process environment override it.
    pub fn load() -> Result<Self, ChatPulseError> {
        let mut config = match Self::resolve_config_path()? {
            Some(path) => {
                let path_str = path.to_string_lossy().to_string();
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    ChatPulseError::Config(format!("Failed to read {path_str}: {e}"))
                })?;
                serde_yaml::from_str::<Config>(&content).map_err(|e| {
                    ChatPulseError::Config(format!("Failed to parse {path_str}: {e}"))
                })?
            }
            None => Config::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.post_deserialize();
        Ok(config)
    }

    /// Apply `TELEGRAM_BOT_TOKEN`, `PORT` and `CHATPULSE_LOG_FILE` from `lookup`.
    /// Blank values are treated as unset.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ChatPulseError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(TOKEN_ENV) {
            self.telegram_bot_token = token;
        }
        if let Some(port) = get(PORT_ENV) {
            self.port = port.trim().parse::<u16>().map_err(|_| {
                ChatPulseError::Config(format!("{PORT_ENV} must be a valid port, got '{port}'"))
            })?;
        }
        if let Some(flag) = get(LOG_FILE_ENV) {
            self.log_to_file = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        Ok(())
    }

    pub(crate) fn post_deserialize(&mut self) {
        self.telegram_bot_token = self.telegram_bot_token.trim().to_string();
        if self.web_host.trim().is_empty() {
            self.web_host = default_web_host();
        }
        if self.data_dir.trim().is_empty() {
            self.data_dir = default_data_dir();
        }
        if self.port == 0 {
            self.port = default_port();
        }
    }

    pub fn has_telegram_token(&self) -> bool {
        !self.telegram_bot_token.is_empty()
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(crate::db::DATABASE_FILE_NAME)
    }
}
