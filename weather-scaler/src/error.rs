use thiserror::Error;

/// Errors produced while building a weather scaler or polling the provider.
#[derive(Debug, Error)]
pub enum ScalerError {
    #[error("Error parsing threshold value '{value}': {source}")]
    InvalidThreshold {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("No city name given")]
    MissingCityName,

    #[error("No API key given")]
    MissingApiKey,

    #[error("No host URI given")]
    MissingHost,

    #[error("Invalid URL '{url}': {reason}")]
    InvalidHostUrl { url: String, reason: String },

    #[error("No preference given")]
    MissingPreference,

    #[error("Unknown preference '{0}'. Supported preferences: Temp_min, Temp_max, Temp.")]
    InvalidPreference(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Failed to send request to weather provider: {0}")]
    FetchFailed(#[source] reqwest::Error),

    #[error("Failed to read weather provider response body: {0}")]
    ReadFailed(#[source] reqwest::Error),
}

impl ScalerError {
    /// Construction-time failure; the scaler is never created.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ScalerError::InvalidThreshold { .. }
                | ScalerError::MissingCityName
                | ScalerError::MissingApiKey
                | ScalerError::MissingHost
                | ScalerError::InvalidHostUrl { .. }
                | ScalerError::MissingPreference
                | ScalerError::InvalidPreference(_)
                | ScalerError::HttpClient(_)
        )
    }

    /// Per-poll failure; the host may retry on its next cycle.
    pub fn is_transport(&self) -> bool {
        matches!(self, ScalerError::FetchFailed(_) | ScalerError::ReadFailed(_))
    }
}
