//! Core data types for weather lookups

use serde::{Deserialize, Serialize};

/// Timestamp type (Unix epoch seconds)
pub type Timestamp = i64;

/// User id recorded when no account is associated with the request
pub const ANONYMOUS_USER: i64 = 0;

/// One flattened current-weather observation for a city.
///
/// A record is only ever built from a well-formed upstream response whose
/// `name` field is present and non-empty; every other upstream field may be
/// absent. Records are appended to the log sink once and never read back,
/// updated, or deleted by this service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherRecord {
    /// Resolved city name as reported by the upstream API
    pub city: String,

    /// ISO country code
    pub country: Option<String>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// Temperature in the configured unit system
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,

    pub humidity: Option<f64>,
    pub pressure: Option<f64>,

    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,

    /// Human-readable condition description, empty when absent upstream
    pub condition: String,
    pub condition_code: Option<i64>,
    pub icon: Option<String>,

    /// Visibility in meters
    pub visibility: Option<i64>,

    /// Upstream observation time (`dt`), local time when absent upstream
    pub observation_time: Timestamp,

    /// Local processing time
    pub recorded_at: Timestamp,

    /// Requesting account id, [`ANONYMOUS_USER`] when unauthenticated
    pub requesting_user_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WeatherRecord {
        WeatherRecord {
            city: "Madrid".to_string(),
            country: Some("ES".to_string()),
            latitude: Some(40.4165),
            longitude: Some(-3.7026),
            temperature: Some(21.4),
            feels_like: Some(20.9),
            humidity: Some(52.0),
            pressure: Some(1017.0),
            wind_speed: Some(3.6),
            wind_direction: Some(220.0),
            condition: "clear sky".to_string(),
            condition_code: Some(800),
            icon: Some("01d".to_string()),
            visibility: Some(10000),
            observation_time: 1_700_000_000,
            recorded_at: 1_700_000_060,
            requesting_user_id: ANONYMOUS_USER,
        }
    }

    #[test]
    fn record_serde_roundtrip() {
        let record = sample();
        let json = serde_json::to_string(&record).unwrap();
        let back: WeatherRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn absent_fields_serialize_as_null() {
        let mut record = sample();
        record.country = None;
        record.visibility = None;

        let value: serde_json::Value =
            serde_json::to_value(&record).unwrap();
        assert!(value.get("country").unwrap().is_null());
        assert!(value.get("visibility").unwrap().is_null());
        assert_eq!(value.get("city").unwrap(), "Madrid");
    }
}
