//! Wire shape of the upstream current-weather payload.
//!
//! Only `name` is required; every other field null-coalesces into the flat
//! record.

use serde::Deserialize;
use wxlook_core::WeatherRecord;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Coord {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MainBlock {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Wind {
    pub speed: Option<f64>,
    pub deg: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Sys {
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConditionEntry {
    pub description: Option<String>,
    pub id: Option<i64>,
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentConditions {
    pub name: String,
    #[serde(default)]
    pub sys: Sys,
    #[serde(default)]
    pub coord: Coord,
    #[serde(default)]
    pub main: MainBlock,
    #[serde(default)]
    pub wind: Wind,
    #[serde(default)]
    pub weather: Vec<ConditionEntry>,
    #[serde(default)]
    pub visibility: Option<i64>,
    #[serde(default)]
    pub dt: Option<i64>,
}

impl CurrentConditions {
    /// Flatten into a record. `now` supplies both `recorded_at` and the
    /// `observation_time` fallback when the payload carries no `dt`.
    pub(crate) fn into_record(self, user_id: i64, now: i64) -> WeatherRecord {
        let (condition, condition_code, icon) = match self.weather.into_iter().next() {
            Some(w) => (w.description.unwrap_or_default(), w.id, w.icon),
            None => (String::new(), None, None),
        };

        WeatherRecord {
            city: self.name,
            country: self.sys.country,
            latitude: self.coord.lat,
            longitude: self.coord.lon,
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            humidity: self.main.humidity,
            pressure: self.main.pressure,
            wind_speed: self.wind.speed,
            wind_direction: self.wind.deg,
            condition,
            condition_code,
            icon,
            visibility: self.visibility,
            observation_time: self.dt.unwrap_or(now),
            recorded_at: now,
            requesting_user_id: user_id,
        }
    }
}
