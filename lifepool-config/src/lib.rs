use std::fs;
use std::path::Path;
use thiserror::Error;

// Re-export types
pub use self::types::{
    AgentSettings, BehaviorSettings, CombatSettings, Config, EatingSettings, EnergyPointSettings,
    ReproductionSettings, ScanPolicy, SenderType, SerializerType, SpatialSettings, SpeedModel,
    TransportConfig, WorldSettings,
};
mod types;

// Config error handling
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// Config loader implementation
pub struct ConfigLoader;

impl ConfigLoader {
    /// Read a config file. `.toml` files are parsed as TOML, everything else as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let file_content = fs::read_to_string(path)?;

        let is_toml = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("toml"));

        let config: Config = if is_toml {
            toml::from_str(&file_content)?
        } else {
            serde_json::from_str(&file_content)?
        };

        Ok(config)
    }

    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        fn invalid(msg: &str) -> Result<(), ConfigError> {
            Err(ConfigError::ValidationError(msg.to_string()))
        }

        if config.framerate == 0 {
            return invalid("Framerate must be greater than 0");
        }

        let world = &config.world;
        if world.width <= 0.0 || world.height <= 0.0 {
            return invalid("World dimensions must be positive");
        }
        if world.population_cap == 0 {
            return invalid("Population cap must be greater than 0");
        }
        if world.scrub_interval_secs <= 0.0 {
            return invalid("Scrub interval must be positive");
        }

        let agent = &config.agent;
        if agent.initial_energy <= 0.0 {
            return invalid("Initial energy must be positive");
        }
        if agent.base_speed < 0.0 || agent.predator_speed_multiplier < 0.0 {
            return invalid("Speeds cannot be negative");
        }

        let combat = &config.combat;
        if combat.size_ratio_min > combat.size_ratio_max {
            return invalid("combat.size_ratio_min exceeds combat.size_ratio_max");
        }
        if combat.size_loss_min > combat.size_loss_max {
            return invalid("combat.size_loss_min exceeds combat.size_loss_max");
        }

        let points = &config.energy_points;
        if points.min_split == 0 || points.min_split > points.max_split {
            return invalid("energy_points split range must be non-empty and start above 0");
        }
        if points.lifespan == 0 {
            return invalid("Energy point lifespan must be greater than 0");
        }

        let behavior = &config.behavior;
        if behavior.follow_offset_min > behavior.follow_offset_max {
            return invalid("behavior.follow_offset_min exceeds behavior.follow_offset_max");
        }

        match config.spatial.policy {
            ScanPolicy::Bounded { limit } if limit == 0 => {
                return invalid("Bounded scan limit must be greater than 0");
            }
            ScanPolicy::Grid { cell_size } if cell_size <= 0.0 => {
                return invalid("Grid cell size must be positive");
            }
            _ => {}
        }

        if config.transport.output_frequency == 0 {
            return invalid("Output frequency must be greater than 0");
        }
        if config.transport.sender == SenderType::File && config.transport.output_path.is_none() {
            return invalid("File sender requires transport.output_path");
        }

        Ok(())
    }
}

/// Load and validate a config file in one step
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let config = ConfigLoader::from_file(path)?;
    ConfigLoader::validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn json_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn empty_object_yields_defaults() {
        let file = json_file("{}");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.framerate, 60);
        assert_eq!(config.world.population_cap, 300);
        assert_eq!(config.agent.speed_model, SpeedModel::Fixed);
        assert_eq!(config.combat.size_ratio_min, 0.8);
        assert_eq!(config.eating.predator_threshold, 1.1);
        assert_eq!(config.spatial.policy, ScanPolicy::Bounded { limit: 60 });
        assert_eq!(config.transport.sender, SenderType::Null);
    }

    #[test]
    fn partial_sections_keep_field_defaults() {
        let file = json_file(
            r#"{
              "framerate": 30,
              "rng_seed": 7,
              "world": { "width": 800.0, "population_cap": 50 },
              "spatial": { "policy": { "kind": "grid", "cell_size": 40.0 } },
              "transport": { "serializer": "binary", "sender": "stdio" }
            }"#,
        );
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.framerate, 30);
        assert_eq!(config.rng_seed, Some(7));
        assert_eq!(config.world.width, 800.0);
        assert_eq!(config.world.height, 720.0);
        assert_eq!(config.world.population_cap, 50);
        assert_eq!(config.spatial.policy, ScanPolicy::Grid { cell_size: 40.0 });
        assert_eq!(config.transport.serializer, SerializerType::Binary);
        assert_eq!(config.transport.sender, SenderType::Stdio);
    }

    #[test]
    fn toml_files_are_detected_by_extension() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("pool.toml");
        file.write_str(
            r#"
framerate = 120

[agent]
speed_model = "trait"
base_speed = 1.5

[energy_points]
min_split = 2
max_split = 4
"#,
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.framerate, 120);
        assert_eq!(config.agent.speed_model, SpeedModel::Trait);
        assert_eq!(config.agent.base_speed, 1.5);
        assert_eq!(config.energy_points.min_split, 2);
        assert_eq!(config.energy_points.lifespan, 300);
    }

    #[test]
    fn load_invalid_framerate() {
        let file = json_file(r#"{ "framerate": 0 }"#);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let mut config = Config::default();
        config.combat.size_loss_min = 0.6;
        assert!(ConfigLoader::validate(&config).is_err());

        let mut config = Config::default();
        config.energy_points.min_split = 7;
        assert!(ConfigLoader::validate(&config).is_err());

        let mut config = Config::default();
        config.spatial.policy = ScanPolicy::Bounded { limit: 0 };
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn file_sender_needs_a_path() {
        let mut config = Config::default();
        config.transport.sender = SenderType::File;
        assert!(ConfigLoader::validate(&config).is_err());

        config.transport.output_path = Some("frames.jsonl".to_string());
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let file = json_file("{ framerate: ");
        assert!(matches!(
            ConfigLoader::from_file(file.path()),
            Err(ConfigError::JsonParseError(_))
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = assert_fs::TempDir::new().unwrap();
        let missing = dir.child("nope.json");
        assert!(matches!(
            ConfigLoader::from_file(missing.path()),
            Err(ConfigError::FileReadError(_))
        ));
    }
}
