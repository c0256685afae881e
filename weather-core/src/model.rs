use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::units;

/// A single observation, or a single slot of a forecast.
///
/// Every measurement is optional: `Some(0.0)` is a real reading, `None` means
/// the provider did not report it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub data_time: Option<DateTime<Utc>>,
    /// When the API call was made. Forecast slots never carry one.
    pub request_time: Option<DateTime<Utc>>,
    pub temperature_kelvin: Option<f64>,
    pub temperature_celsius: Option<f64>,
    pub temperature_fahrenheit: Option<f64>,
    /// Relative humidity in percent.
    pub humidity: Option<i16>,
    /// Rain in millimetres.
    pub rain: Option<f64>,
    /// Snow in millimetres.
    pub snow: Option<f64>,
    /// Pressure in hPa.
    pub pressure: Option<i16>,
    /// Wind speed in metres per second.
    pub wind_speed: Option<f64>,
    /// Wind direction in degrees, 0 = north, 90 = east.
    pub wind_degrees: Option<i16>,
    /// Cloud cover in percent, clamped to `[-1, 101]`.
    pub cloudiness: Option<i8>,
    /// Raw payload this record was parsed from.
    pub json: Option<String>,
}

impl Weather {
    /// Sets Celsius as given and derives Kelvin and Fahrenheit from it.
    pub fn set_temperatures_from_celsius(&mut self, celsius: f64) {
        self.temperature_celsius = Some(celsius);
        self.temperature_kelvin = Some(units::celsius_to_kelvin(celsius));
        self.temperature_fahrenheit = Some(units::celsius_to_fahrenheit(celsius));
    }

    /// Sets Kelvin as given and derives Celsius and Fahrenheit from it.
    pub fn set_temperatures_from_kelvin(&mut self, kelvin: f64) {
        let celsius = units::kelvin_to_celsius(kelvin);
        self.temperature_kelvin = Some(kelvin);
        self.temperature_celsius = Some(celsius);
        self.temperature_fahrenheit = Some(units::celsius_to_fahrenheit(celsius));
    }

    /// Sets Fahrenheit as given and derives Celsius and Kelvin from it.
    pub fn set_temperatures_from_fahrenheit(&mut self, fahrenheit: f64) {
        let celsius = units::fahrenheit_to_celsius(fahrenheit);
        self.temperature_fahrenheit = Some(fahrenheit);
        self.temperature_celsius = Some(celsius);
        self.temperature_kelvin = Some(units::celsius_to_kelvin(celsius));
    }

    pub fn with_request_time(mut self, request_time: DateTime<Utc>) -> Self {
        self.request_time = Some(request_time);
        self
    }

    /// Lightweight view holding only the timestamps.
    pub fn meta(&self) -> WeatherMeta {
        WeatherMeta {
            data_time: self.data_time,
            request_time: self.request_time,
        }
    }
}

/// Result of one forecast request. `data` keeps the provider's order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub request_time: Option<DateTime<Utc>>,
    pub json: Option<String>,
    pub data: Vec<Weather>,
}

impl Forecast {
    pub fn with_request_time(mut self, request_time: DateTime<Utc>) -> Self {
        self.request_time = Some(request_time);
        self
    }

    pub fn meta(&self) -> ForecastMeta {
        ForecastMeta {
            request_time: self.request_time,
        }
    }
}

/// Timestamps of a stored [`Weather`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherMeta {
    pub data_time: Option<DateTime<Utc>>,
    pub request_time: Option<DateTime<Utc>>,
}

/// Timestamp of a stored [`Forecast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastMeta {
    pub request_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A place, identified by any combination of the fields below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Provider specific numeric id (OpenWeatherMap city id).
    pub id: Option<u32>,
    pub coordinates: Option<Coordinates>,
    pub name: Option<String>,
    pub postcode: Option<String>,
    /// ISO 3166 alpha-2 country code.
    pub country_code: Option<String>,
}

impl Location {
    pub fn from_id(id: u32) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn from_coordinates(latitude: f64, longitude: f64) -> Self {
        Self {
            coordinates: Some(Coordinates {
                latitude,
                longitude,
            }),
            ..Self::default()
        }
    }

    pub fn from_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.coordinates.is_none()
            && self.name.is_none()
            && self.postcode.is_none()
            && self.country_code.is_none()
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if let Some(name) = &self.name {
            parts.push(name.clone());
        }
        if let Some(postcode) = &self.postcode {
            parts.push(postcode.clone());
        }
        if let Some(country) = &self.country_code {
            parts.push(country.clone());
        }
        if let Some(c) = &self.coordinates {
            parts.push(format!("{}/{}", c.latitude, c.longitude));
        }
        if let Some(id) = self.id {
            parts.push(format!("id {id}"));
        }
        if parts.is_empty() {
            f.write_str("<unknown>")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn celsius_derives_other_scales() {
        let mut w = Weather::default();
        w.set_temperatures_from_celsius(19.0);
        assert_eq!(w.temperature_kelvin, Some(292.15));
        let f = w.temperature_fahrenheit.unwrap();
        assert!((f - 66.2).abs() < 1e-9);
    }

    #[test]
    fn kelvin_derivation_suppresses_float_noise() {
        let mut w = Weather::default();
        w.set_temperatures_from_kelvin(292.15);
        assert_eq!(w.temperature_celsius, Some(19.0));
        assert_eq!(w.temperature_kelvin, Some(292.15));
    }

    #[test]
    fn fahrenheit_derives_other_scales() {
        let mut w = Weather::default();
        w.set_temperatures_from_fahrenheit(50.0);
        assert_eq!(w.temperature_celsius, Some(10.0));
        assert_eq!(w.temperature_kelvin, Some(283.15));
    }

    #[test]
    fn location_display_and_emptiness() {
        assert!(Location::default().is_empty());
        assert_eq!(Location::default().to_string(), "<unknown>");

        let mut loc = Location::from_name("Berlin");
        loc.country_code = Some("DE".into());
        assert!(!loc.is_empty());
        assert_eq!(loc.to_string(), "Berlin, DE");
    }

    #[test]
    fn meta_keeps_timestamps_only() {
        let now = Utc::now();
        let w = Weather {
            temperature_celsius: Some(1.0),
            ..Weather::default()
        }
        .with_request_time(now);
        assert_eq!(w.meta().request_time, Some(now));
        assert_eq!(w.meta().data_time, None);
    }
}
