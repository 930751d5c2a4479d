//! Gateway configuration from environment variables
//!
//! | Variable | Default |
//! |----------|---------|
//! | `LOSS_GATEWAY_PORT` (falls back to `PORT`) | 18610 |
//! | `LOSS_GATEWAY_BIND` | 0.0.0.0 |
//! | `LOSS_GATEWAY_UI_DIR` | ui/dist |

use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 18610;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_UI_DIR: &str = "ui/dist";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid port {0:?}: expected 1-65535")]
    InvalidPort(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub bind: String,
    pub port: u16,
    pub ui_dir: PathBuf,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            ui_dir: PathBuf::from(DEFAULT_UI_DIR),
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup so tests never touch the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup("LOSS_GATEWAY_PORT").or_else(|| lookup("PORT")) {
            config.port = match port.trim().parse::<u16>() {
                Ok(p) if p > 0 => p,
                _ => return Err(ConfigError::InvalidPort(port)),
            };
        }
        if let Some(bind) = lookup("LOSS_GATEWAY_BIND") {
            config.bind = bind;
        }
        if let Some(dir) = lookup("LOSS_GATEWAY_UI_DIR") {
            config.ui_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
