use crate::error::RendezvousError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Origins allowed by CORS. `"*"` allows any origin.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    /// Period of the empty-room sweep.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,
}

fn default_bind_address() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:5173".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

fn default_sweep_interval_secs() -> u64 {
    30
}

fn default_command_buffer() -> usize {
    256
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            allowed_origins: default_allowed_origins(),
            sweep_interval_secs: default_sweep_interval_secs(),
            command_buffer: default_command_buffer(),
        }
    }
}

impl ServerConfig {
    /// Reads the TOML file when given, falls back to defaults otherwise, then
    /// applies `PORT` and `FRONTEND_ORIGIN` from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, RendezvousError> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| {
                    RendezvousError::ConfigIo {
                        path: path.to_path_buf(),
                        source,
                    }
                })?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };

        config.apply_overrides(
            std::env::var("PORT").ok(),
            std::env::var("FRONTEND_ORIGIN").ok(),
        );
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, RendezvousError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn apply_overrides(&mut self, port: Option<String>, frontend_origin: Option<String>) {
        if let Some(port) = port.filter(|p| !p.trim().is_empty()) {
            let host = self
                .bind_address
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            self.bind_address = format!("{}:{}", host, port.trim());
        }

        if let Some(origin) = frontend_origin.filter(|o| !o.trim().is_empty()) {
            let origin = origin.trim().to_string();
            if !self.allowed_origins.contains(&origin) {
                self.allowed_origins.insert(0, origin);
            }
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}
