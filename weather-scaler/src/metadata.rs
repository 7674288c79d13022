use reqwest::Url;
use std::fmt;

use crate::{config::ScalerConfig, error::ScalerError};

pub const THRESHOLD_VALUE_KEY: &str = "thresholdValue";
pub const CITY_NAME_KEY: &str = "cityName";
pub const API_KEY_KEY: &str = "apiKey";
pub const HOST_KEY: &str = "host";
pub const PREFERENCE_KEY: &str = "preference";

/// Which temperature field of the provider response drives the metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preference {
    TempMin,
    TempMax,
    Temp,
}

impl Preference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preference::TempMin => "Temp_min",
            Preference::TempMax => "Temp_max",
            Preference::Temp => "Temp",
        }
    }

    pub const fn all() -> &'static [Preference] {
        &[Preference::TempMin, Preference::TempMax, Preference::Temp]
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Preference {
    type Error = ScalerError;

    // Exact match; "temp_max" is not "Temp_max".
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Preference::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == value)
            .ok_or_else(|| ScalerError::InvalidPreference(value.to_string()))
    }
}

/// Validated, immutable trigger metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherMetadata {
    threshold_value: i64,
    city_name: String,
    api_key: String,
    host: Url,
    preference: Preference,
}

impl WeatherMetadata {
    pub fn threshold_value(&self) -> i64 {
        self.threshold_value
    }

    pub fn city_name(&self) -> &str {
        &self.city_name
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Fully resolved provider URL (city and key already substituted).
    pub fn host(&self) -> &Url {
        &self.host
    }

    pub fn preference(&self) -> Preference {
        self.preference
    }
}

/// Validate raw trigger metadata.
///
/// Checks run in a fixed order so that a config missing several fields
/// always reports the same one: threshold, city, key, host, preference.
pub fn parse_weather_metadata(config: &ScalerConfig) -> Result<WeatherMetadata, ScalerError> {
    let threshold_value = match config.metadata(THRESHOLD_VALUE_KEY) {
        Some(val) if !val.is_empty() => val
            .parse::<i64>()
            .map_err(|source| ScalerError::InvalidThreshold { value: val.to_string(), source })?,
        _ => 0,
    };

    let city_name = required(config, CITY_NAME_KEY).ok_or(ScalerError::MissingCityName)?;
    let api_key = required(config, API_KEY_KEY).ok_or(ScalerError::MissingApiKey)?;

    let template = config.metadata(HOST_KEY).ok_or(ScalerError::MissingHost)?;
    let host = resolve_host(template, city_name, api_key)?;

    let preference = required(config, PREFERENCE_KEY).ok_or(ScalerError::MissingPreference)?;
    let preference = Preference::try_from(preference)?;

    Ok(WeatherMetadata {
        threshold_value,
        city_name: city_name.to_string(),
        api_key: api_key.to_string(),
        host,
        preference,
    })
}

fn required<'a>(config: &'a ScalerConfig, key: &str) -> Option<&'a str> {
    config.metadata(key).filter(|v| !v.is_empty())
}

/// Substitute city and key into the host template and validate the result.
pub fn resolve_host(template: &str, city_name: &str, api_key: &str) -> Result<Url, ScalerError> {
    let resolved = fill_template(template, &[city_name, api_key]).ok_or_else(|| {
        ScalerError::InvalidHostUrl {
            url: template.to_string(),
            reason: "host must contain exactly two '%s' placeholders (city name, API key)"
                .to_string(),
        }
    })?;

    let url = Url::parse(&resolved).map_err(|e| ScalerError::InvalidHostUrl {
        url: resolved.clone(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(ScalerError::InvalidHostUrl {
            url: resolved,
            reason: "not an absolute URL".to_string(),
        });
    }

    Ok(url)
}

/// Replace `%s` slots left to right; `%%` is a literal percent sign.
///
/// Returns `None` when the number of slots differs from the number of values
/// or the template holds any other `%` verb.
fn fill_template(template: &str, values: &[&str]) -> Option<String> {
    let mut out = String::with_capacity(template.len());
    let mut values = values.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        match chars.peek() {
            Some('s') => {
                chars.next();
                out.push_str(values.next()?);
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => return None,
        }
    }

    values.next().is_none().then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ScalerConfig {
        ScalerConfig::default()
            .with_metadata(THRESHOLD_VALUE_KEY, "7")
            .with_metadata(CITY_NAME_KEY, "Berlin")
            .with_metadata(API_KEY_KEY, "k1")
            .with_metadata(HOST_KEY, "http://x/%s/%s")
            .with_metadata(PREFERENCE_KEY, "Temp_max")
    }

    fn without(key: &str) -> ScalerConfig {
        let mut cfg = valid_config();
        cfg.trigger_metadata.remove(key);
        cfg
    }

    #[test]
    fn parses_valid_metadata() {
        let meta = parse_weather_metadata(&valid_config()).expect("valid config");

        assert_eq!(meta.threshold_value(), 7);
        assert_eq!(meta.city_name(), "Berlin");
        assert_eq!(meta.api_key(), "k1");
        assert_eq!(meta.host().as_str(), "http://x/Berlin/k1");
        assert_eq!(meta.preference(), Preference::TempMax);
    }

    #[test]
    fn threshold_defaults_to_zero() {
        let meta = parse_weather_metadata(&without(THRESHOLD_VALUE_KEY)).expect("valid");
        assert_eq!(meta.threshold_value(), 0);

        let cfg = valid_config().with_metadata(THRESHOLD_VALUE_KEY, "");
        assert_eq!(parse_weather_metadata(&cfg).expect("valid").threshold_value(), 0);
    }

    #[test]
    fn invalid_threshold() {
        let cfg = valid_config().with_metadata(THRESHOLD_VALUE_KEY, "not-a-number");
        let err = parse_weather_metadata(&cfg).unwrap_err();
        assert!(matches!(err, ScalerError::InvalidThreshold { .. }));
    }

    #[test]
    fn each_missing_required_field_has_its_own_error() {
        assert!(matches!(
            parse_weather_metadata(&without(CITY_NAME_KEY)),
            Err(ScalerError::MissingCityName)
        ));
        assert!(matches!(
            parse_weather_metadata(&without(API_KEY_KEY)),
            Err(ScalerError::MissingApiKey)
        ));
        assert!(matches!(parse_weather_metadata(&without(HOST_KEY)), Err(ScalerError::MissingHost)));
        assert!(matches!(
            parse_weather_metadata(&without(PREFERENCE_KEY)),
            Err(ScalerError::MissingPreference)
        ));
    }

    #[test]
    fn empty_city_and_key_are_missing() {
        let cfg = valid_config().with_metadata(CITY_NAME_KEY, "");
        assert!(matches!(parse_weather_metadata(&cfg), Err(ScalerError::MissingCityName)));

        let cfg = valid_config().with_metadata(API_KEY_KEY, "");
        assert!(matches!(parse_weather_metadata(&cfg), Err(ScalerError::MissingApiKey)));
    }

    #[test]
    fn checks_run_in_order() {
        let cfg = ScalerConfig::default().with_metadata(THRESHOLD_VALUE_KEY, "x");
        assert!(matches!(parse_weather_metadata(&cfg), Err(ScalerError::InvalidThreshold { .. })));

        let cfg = ScalerConfig::default();
        assert!(matches!(parse_weather_metadata(&cfg), Err(ScalerError::MissingCityName)));
    }

    #[test]
    fn unknown_preference_is_rejected_at_construction() {
        let cfg = valid_config().with_metadata(PREFERENCE_KEY, "temp_max");
        let err = parse_weather_metadata(&cfg).unwrap_err();
        assert!(matches!(err, ScalerError::InvalidPreference(ref p) if p == "temp_max"));
    }

    #[test]
    fn malformed_host_is_invalid() {
        let cfg = valid_config().with_metadata(HOST_KEY, "not a url %s %s");
        assert!(matches!(parse_weather_metadata(&cfg), Err(ScalerError::InvalidHostUrl { .. })));

        let cfg = valid_config().with_metadata(HOST_KEY, "http://x/%s");
        assert!(matches!(parse_weather_metadata(&cfg), Err(ScalerError::InvalidHostUrl { .. })));
    }

    #[test]
    fn template_substitution() {
        let url = resolve_host("http://x/%s/%s", "Berlin", "k1").expect("valid url");
        assert_eq!(url.as_str(), "http://x/Berlin/k1");

        let url = resolve_host(
            "https://api.openweathermap.org/data/2.5/weather?q=%s&appid=%s&units=metric",
            "Paris",
            "abc",
        )
        .expect("valid url");
        assert_eq!(url.query(), Some("q=Paris&appid=abc&units=metric"));
    }

    #[test]
    fn literal_percent_in_template() {
        assert_eq!(fill_template("a%%b%s%s", &["1", "2"]).as_deref(), Some("a%b12"));
        assert_eq!(fill_template("%s", &["1", "2"]), None);
        assert_eq!(fill_template("%s%s%s", &["1", "2"]), None);
        assert_eq!(fill_template("http://x/%s/%s/%d", &["B", "k"]), None);
        assert_eq!(fill_template("http://x/%s/%s%", &["B", "k"]), None);
    }

    #[test]
    fn unknown_verb_in_host_is_invalid() {
        let err = resolve_host("http://x/%s/%s/%d", "B", "k").unwrap_err();
        assert!(matches!(err, ScalerError::InvalidHostUrl { .. }));
    }

    #[test]
    fn preference_as_str_roundtrip() {
        for p in Preference::all() {
            assert_eq!(Preference::try_from(p.as_str()).expect("known preference"), *p);
        }
    }
}
