use anyhow::Result;
use serde::Deserialize;
use tracing::debug;

use crate::capture::QualityProfile;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub recording: RecordingConfig,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Directory holding captured recordings
    pub recordings_path: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecordingConfig {
    /// Audio quality preset (`normal` or `high`)
    #[serde(default)]
    pub quality: QualityProfile,

    /// Ask before deleting a recording
    #[serde(default)]
    pub confirm_delete: bool,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Load the named config file, falling back to defaults when absent.
    pub fn load_or_default(path: &str) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                debug!("no config loaded from {} ({}), using defaults", path, e);
                Self::default()
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                recordings_path: "recordings".to_string(),
            },
            recording: RecordingConfig::default(),
        }
    }
}
