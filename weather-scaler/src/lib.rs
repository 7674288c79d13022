//! Weather-driven external metric scaler.
//!
//! This crate defines:
//! - Trigger metadata validation (city, API key, host template, preference, threshold)
//! - Fetching and decoding current weather from the provider
//! - The `Scaler` contract a host autoscaling controller polls, and its weather implementation
//!
//! Logging goes through `tracing`; installing a subscriber is left to the host.

pub mod config;
pub mod error;
pub mod metadata;
pub mod model;
pub mod scaler;

pub use config::ScalerConfig;
pub use error::ScalerError;
pub use metadata::{Preference, WeatherMetadata, parse_weather_metadata};
pub use model::{LabelSelector, MetricSample, MetricSpec, WeatherReading};
pub use scaler::{Scaler, weather::WeatherScaler};
