use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::{Instrument, Span, debug, error, warn};

use crate::{
    config::ScalerConfig,
    error::ScalerError,
    metadata::{WeatherMetadata, parse_weather_metadata},
    model::{LabelSelector, MetricSample, MetricSpec, WEATHER_METRIC_NAME, WeatherReading},
};

use super::Scaler;

/// Scales on one temperature field of a weather provider's current conditions.
#[derive(Debug, Clone)]
pub struct WeatherScaler {
    metadata: WeatherMetadata,
    http: Client,
    span: Span,
}

impl WeatherScaler {
    /// Validate the trigger metadata and build a client with the global timeout.
    pub fn new(config: &ScalerConfig) -> Result<Self, ScalerError> {
        let mut builder = Client::builder();
        // Zero means no timeout.
        if !config.global_http_timeout.is_zero() {
            builder = builder.timeout(config.global_http_timeout);
        }
        let http = builder.build().map_err(ScalerError::HttpClient)?;

        Self::with_http_client(config, http)
    }

    /// Like [`WeatherScaler::new`] but reuses an existing pooled client.
    pub fn with_http_client(config: &ScalerConfig, http: Client) -> Result<Self, ScalerError> {
        let metadata = parse_weather_metadata(config)?;
        let span = tracing::info_span!(
            "weather_scaler",
            city = %metadata.city_name(),
            preference = %metadata.preference(),
        );

        Ok(Self { metadata, http, span })
    }

    /// Replace the span all events of this scaler are recorded under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn metadata(&self) -> &WeatherMetadata {
        &self.metadata
    }

    /// One GET against the resolved host; returns the raw body.
    async fn fetch_json(&self) -> Result<Vec<u8>, ScalerError> {
        let res = self
            .http
            .get(self.metadata.host().clone())
            .send()
            .await
            .map_err(ScalerError::FetchFailed)?;

        let status = res.status();
        // `bytes` consumes the response, releasing the connection either way.
        let body = res.bytes().await.map_err(ScalerError::ReadFailed)?;

        // Error bodies still go to the lenient decoder and read as zero.
        if !status.is_success() {
            warn!(
                %status,
                body = %truncate_body(&String::from_utf8_lossy(&body)),
                "weather provider returned a non-success status"
            );
        }

        Ok(body.to_vec())
    }

    /// Fetch current weather and return the preferred temperature, truncated.
    pub async fn fetch_temperature(&self) -> Result<i64, ScalerError> {
        async {
            let body = self.fetch_json().await.inspect_err(|err| {
                error!(error = %err, "failed to fetch weather data");
            })?;

            let reading = WeatherReading::from_json_lenient(&body);
            let temperature = reading.select(self.metadata.preference()) as i64;

            debug!(temperature, ?reading, "fetched weather");
            Ok(temperature)
        }
        .instrument(self.span.clone())
        .await
    }

    /// The `weather` external metric, targeting the threshold as an average value.
    pub fn build_metric_spec(&self) -> MetricSpec {
        MetricSpec::external_average_value(WEATHER_METRIC_NAME, self.metadata.threshold_value())
    }
}

#[async_trait]
impl Scaler for WeatherScaler {
    async fn is_active(&self) -> Result<bool, ScalerError> {
        let temperature = self.fetch_temperature().await?;
        Ok(temperature > self.metadata.threshold_value())
    }

    fn get_metric_spec_for_scaling(&self) -> Vec<MetricSpec> {
        vec![self.build_metric_spec()]
    }

    async fn get_metrics(
        &self,
        metric_name: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<MetricSample>, ScalerError> {
        let value = self.fetch_temperature().await?;

        Ok(vec![MetricSample {
            metric_name: metric_name.to_string(),
            metric_labels: selector.clone(),
            value,
            timestamp: Utc::now(),
        }])
    }

    async fn close(&self) -> Result<(), ScalerError> {
        Ok(())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
