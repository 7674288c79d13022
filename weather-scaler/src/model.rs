use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::metadata::Preference;

/// Name of the external metric advertised to the autoscaler.
pub const WEATHER_METRIC_NAME: &str = "weather";

/// Label selector supplied by the host alongside a metric request.
pub type LabelSelector = BTreeMap<String, String>;

/// Temperatures decoded from one provider response, in the provider's units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct WeatherReading {
    #[serde(default)]
    pub temp_min: f64,
    #[serde(default)]
    pub temp_max: f64,
    #[serde(default)]
    pub temp: f64,
}

#[derive(Debug, Default, Deserialize)]
struct WeatherPayload {
    #[serde(default)]
    main: WeatherReading,
}

impl WeatherReading {
    /// Strict decode of `{"main": {"temp_min": .., "temp_max": .., "temp": ..}}`.
    ///
    /// Unknown fields are ignored, missing temperature fields are 0.0.
    pub fn from_json(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice::<WeatherPayload>(body).map(|payload| payload.main)
    }

    /// Best-effort decode: a body that does not parse yields an all-zero reading.
    pub fn from_json_lenient(body: &[u8]) -> Self {
        match Self::from_json(body) {
            Ok(reading) => reading,
            Err(err) => {
                tracing::warn!(error = %err, "weather payload did not decode, using zero temperatures");
                Self::default()
            }
        }
    }

    pub fn select(&self, preference: Preference) -> f64 {
        match preference {
            Preference::TempMin => self.temp_min,
            Preference::TempMax => self.temp_max,
            Preference::Temp => self.temp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricSourceType {
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricTargetType {
    Value,
    AverageValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricIdentifier {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricTarget {
    #[serde(rename = "type")]
    pub target_type: MetricTargetType,
    pub average_value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalMetricSource {
    pub metric: MetricIdentifier,
    pub target: MetricTarget,
}

/// One metric the autoscaler should track for this scaler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSpec {
    #[serde(rename = "type")]
    pub source_type: MetricSourceType,
    pub external: ExternalMetricSource,
}

impl MetricSpec {
    /// External metric with an average-value target.
    pub fn external_average_value(name: impl Into<String>, average_value: i64) -> Self {
        Self {
            source_type: MetricSourceType::External,
            external: ExternalMetricSource {
                metric: MetricIdentifier { name: name.into() },
                target: MetricTarget { target_type: MetricTargetType::AverageValue, average_value },
            },
        }
    }

    pub fn metric_name(&self) -> &str {
        &self.external.metric.name
    }
}

/// A single point-in-time metric value handed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSample {
    pub metric_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metric_labels: LabelSelector,
    pub value: i64,
    pub timestamp: DateTime<Utc>,
}
