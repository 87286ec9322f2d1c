use std::net::SocketAddr;
use std::path::PathBuf;

use common::config::Validate;
use common::games::snake::SnakeSettings;
use common::scores::DEFAULT_LEADERBOARD_SIZE;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "snake_arcade_server.yaml";

const MAX_LEADERBOARD_SIZE: usize = 100;

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    pub static_files_path: PathBuf,
    pub scores_file: PathBuf,
    /// Oldest low scores are dropped beyond this many entries.
    pub max_stored_scores: Option<usize>,
    pub leaderboard_size: usize,
    pub game: SnakeSettings,
}

impl ServerConfig {
    pub fn clamp_leaderboard_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.leaderboard_size)
            .clamp(1, MAX_LEADERBOARD_SIZE)
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.listen_address.parse::<SocketAddr>().is_err() {
            return Err(format!(
                "listen_address '{}' is not a valid socket address",
                self.listen_address
            ));
        }
        if self.scores_file.as_os_str().is_empty() {
            return Err("scores_file must not be empty".to_string());
        }
        if self.max_stored_scores == Some(0) {
            return Err("max_stored_scores must be greater than 0 if provided".to_string());
        }
        if self.leaderboard_size == 0 || self.leaderboard_size > MAX_LEADERBOARD_SIZE {
            return Err(format!("leaderboard_size must be between 1 and {}", MAX_LEADERBOARD_SIZE));
        }
        self.game.validate()?;
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0:5000".to_string(),
            static_files_path: PathBuf::from("ui"),
            scores_file: PathBuf::from("scores.json"),
            max_stored_scores: Some(1000),
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
            game: SnakeSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::config::{
        ConfigContentProvider, ConfigManager, ConfigSerializer, FileContentConfigProvider,
        StaticContentConfigProvider, YamlConfigSerializer,
    };

    #[test]
    fn test_default_config_is_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_config_can_be_serialized_and_deserialized_string() {
        let default_config = ServerConfig::default();
        let serializer = YamlConfigSerializer::new();
        let serialized_string = serializer.serialize(&default_config).unwrap();
        let deserialized_config: ServerConfig = serializer.deserialize(&serialized_string).unwrap();
        assert_eq!(default_config, deserialized_config);
    }

    #[test]
    fn test_default_config_can_be_serialized_and_deserialized_manager() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("snake_arcade_server.yaml");
        let config = ServerConfig {
            leaderboard_size: 25,
            ..ServerConfig::default()
        };

        let manager: ConfigManager<_, ServerConfig> = ConfigManager::from_yaml_file(&file_path);
        assert!(manager.set_config(&config).is_ok());

        let reloaded: ConfigManager<_, ServerConfig> = ConfigManager::from_yaml_file(&file_path);
        assert_eq!(reloaded.get_config().unwrap(), config);
        assert!(FileContentConfigProvider::new(&file_path)
            .get_config_content()
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_config_file_does_not_exist_returns_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let manager: ConfigManager<_, ServerConfig> =
            ConfigManager::from_yaml_file(dir.path().join("missing.yaml"));
        assert_eq!(manager.get_config().unwrap(), ServerConfig::default());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let content = r#"
            listen_address: "127.0.0.1:8080"
            game:
              tick_interval_ms: 100
        "#;
        let provider = StaticContentConfigProvider::new(Some(content.to_string()));
        let manager: ConfigManager<_, ServerConfig> =
            ConfigManager::new(provider, YamlConfigSerializer::new());

        let config = manager.get_config().unwrap();
        assert_eq!(config.listen_address, "127.0.0.1:8080");
        assert_eq!(config.game.tick_interval_ms, 100);
        assert_eq!(config.game.grid_size, 20);
        assert_eq!(config.leaderboard_size, DEFAULT_LEADERBOARD_SIZE);
    }

    #[test]
    fn test_invalid_config_cant_be_read() {
        let invalid_config_content = r#"
            listen_address: "not an address"
            game:
              grid_size: 1
        "#;
        let provider = StaticContentConfigProvider::new(Some(invalid_config_content.to_string()));
        let manager: ConfigManager<_, ServerConfig> =
            ConfigManager::new(provider, YamlConfigSerializer::new());
        assert!(manager.get_config().is_err());
    }

    #[test]
    fn test_invalid_game_settings_are_rejected() {
        let mut config = ServerConfig::default();
        config.game.grid_size = 1;
        assert!(config.validate().is_err());

        let config = ServerConfig {
            max_stored_scores: Some(0),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_leaderboard_limit_is_clamped() {
        let config = ServerConfig::default();
        assert_eq!(config.clamp_leaderboard_limit(None), DEFAULT_LEADERBOARD_SIZE);
        assert_eq!(config.clamp_leaderboard_limit(Some(0)), 1);
        assert_eq!(config.clamp_leaderboard_limit(Some(5000)), MAX_LEADERBOARD_SIZE);
    }
}
