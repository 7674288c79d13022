use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path, time::Duration};

/// Default HTTP timeout applied to provider requests, in milliseconds.
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 3000;

/// Raw scaler configuration handed over by the host.
///
/// Example TOML:
/// ```toml
/// global_http_timeout_ms = 5000
///
/// [trigger_metadata]
/// thresholdValue = "20"
/// cityName = "Berlin"
/// apiKey = "..."
/// host = "https://api.openweathermap.org/data/2.5/weather?q=%s&appid=%s&units=metric"
/// preference = "Temp_max"
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalerConfig {
    /// Trigger metadata exactly as written by the user; validated later.
    pub trigger_metadata: HashMap<String, String>,
    pub global_http_timeout: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
struct ScalerConfigFile {
    #[serde(default = "default_timeout_ms")]
    global_http_timeout_ms: u64,

    #[serde(default)]
    trigger_metadata: HashMap<String, String>,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}

impl Default for ScalerConfig {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS))
    }
}

impl ScalerConfig {
    pub fn new(global_http_timeout: Duration) -> Self {
        Self { trigger_metadata: HashMap::new(), global_http_timeout }
    }

    /// Builder-style helper for setting a single metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.trigger_metadata.insert(key.into(), value.into());
        self
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.trigger_metadata.get(key).map(String::as_str)
    }

    /// Parse a config from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: ScalerConfigFile =
            toml::from_str(contents).context("Failed to parse scaler configuration TOML")?;

        Ok(Self {
            trigger_metadata: file.trigger_metadata,
            global_http_timeout: Duration::from_millis(file.global_http_timeout_ms),
        })
    }

    /// Load config from a TOML file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Serialize back to TOML, e.g. for diagnostics.
    pub fn to_toml_string(&self) -> Result<String> {
        let file = ScalerConfigFile {
            global_http_timeout_ms: u64::try_from(self.global_http_timeout.as_millis())
                .unwrap_or(u64::MAX),
            trigger_metadata: self.trigger_metadata.clone(),
        };

        toml::to_string_pretty(&file).context("Failed to serialize scaler configuration to TOML")
    }
}
