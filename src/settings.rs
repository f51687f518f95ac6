use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct Storage {
    #[serde(default)]
    pub backend: StorageBackend,
    pub postgres: Option<Postgres>,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    #[serde(default = "default_listen")]
    pub listen: String,
}

#[derive(Debug, Deserialize)]
pub struct Services {
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub services: Services,
}

impl Default for Server {
    fn default() -> Self {
        Server {
            listen: default_listen(),
        }
    }
}

impl Default for Services {
    fn default() -> Self {
        Services {
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_channel_capacity() -> usize {
    512
}

impl Settings {
    /// Reads `path` (optional) and then `CAMPUS_RIDES__*` environment variables,
    /// e.g. `CAMPUS_RIDES__STORAGE__POSTGRES__URL`.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("CAMPUS_RIDES").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = Settings::load("does-not-exist.toml").unwrap();

        assert_eq!(settings.server.listen, "0.0.0.0:8000");
        assert_eq!(settings.services.channel_capacity, 512);
        assert_eq!(settings.storage.backend, StorageBackend::Postgres);
        assert!(settings.storage.postgres.is_none());
    }
}
