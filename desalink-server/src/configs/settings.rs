use std::env;
use std::fs;
use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub migration_path: Option<String>,
    pub clean_start: bool,
    pub url: String,
}

/// Background logger defaults applied at boot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recorder {
    pub interval_ms: u64,
    pub autostart: bool,
}

impl Default for Recorder {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            autostart: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub database: Database,
    #[serde(default)]
    pub recorder: Recorder,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let mut settings: Settings = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::default().separator("__"))
            .build()?
            .try_deserialize()?;

        if settings.recorder.interval_ms == 0 {
            return Err(ConfigError::Message(
                "recorder.interval_ms must be positive".to_string(),
            ));
        }

        settings.database.migration_path = match settings.database.migration_path.take() {
            Some(migrate) if Path::new(&migrate).is_dir() => Some(
                fs::canonicalize(&migrate)
                    .map_err(|e| ConfigError::Message(e.to_string()))?
                    .to_string_lossy()
                    .to_string(),
            ),
            _ => None,
        };

        Ok(settings)
    }
}
