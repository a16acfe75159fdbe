use std::fmt;
use std::path::Path;

use serde::Deserialize;

use config::{Config, ConfigError};

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub model_filename: String,
    pub label_filename: Option<String>,
    pub quantized: bool,
    pub threshold: f32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "model {} ({}), labels {}, threshold {}",
            self.model_filename,
            if self.quantized { "quantized" } else { "float" },
            self.label_filename.as_deref().unwrap_or("none"),
            self.threshold
        )
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_filename: "models/detect.tflite".to_string(),
            label_filename: Some("models/labelmap.txt".to_string()),
            quantized: true,
            threshold: 0.6,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("mobiledetect").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Defaults plus environment overrides, for running without a file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(config::Environment::with_prefix("mobiledetect").separator("__"))
            .build()?
            .try_deserialize()
    }
}
