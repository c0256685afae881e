//! Weatherstack (`api.weatherstack.com`).
//!
//! Values come in the unit system echoed back in `request.unit`, not in a
//! fixed one.

use chrono::{DateTime, Duration, Utc};

use crate::{
    error::{ParseError, ParseResult},
    json::{self, Object},
    model::{Forecast, Location, Weather},
    precipitation, units,
};

use super::{Endpoints, WeatherParser, build_url, free_text_query};

const BASE_URL: &str = "http://api.weatherstack.com";
const FORECAST_DAYS: u8 = 7;

#[derive(Debug, Clone, Copy, Default)]
pub struct Weatherstack;

/// Unit systems selectable with the `units` request parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum UnitSystem {
    /// °C, km/h, mm.
    #[default]
    Metric,
    /// K, km/h, mm.
    Scientific,
    /// °F, mph, inches.
    Fahrenheit,
}

impl UnitSystem {
    fn from_request(root: &Object) -> Self {
        match json::object(root, "request").and_then(|r| json::string(r, "unit")) {
            Some("s") => UnitSystem::Scientific,
            Some("f") => UnitSystem::Fahrenheit,
            _ => UnitSystem::Metric,
        }
    }

    fn set_temperature(self, value: f64, weather: &mut Weather) {
        match self {
            UnitSystem::Metric => weather.set_temperatures_from_celsius(value),
            UnitSystem::Scientific => weather.set_temperatures_from_kelvin(value),
            UnitSystem::Fahrenheit => weather.set_temperatures_from_fahrenheit(value),
        }
    }

    fn wind_speed(self, value: f64) -> f64 {
        match self {
            UnitSystem::Fahrenheit => units::mph_to_mps(value),
            _ => units::kph_to_mps(value),
        }
    }

    fn precipitation(self, value: f64) -> f64 {
        match self {
            UnitSystem::Fahrenheit => value * 25.4,
            _ => value,
        }
    }

    fn pressure(self, value: f64) -> f64 {
        match self {
            UnitSystem::Fahrenheit => value * 33.8639,
            _ => value,
        }
    }
}

impl Weatherstack {
    /// Fills `weather` from the `current` object or an hourly forecast item.
    fn parse_conditions(item: &Object, unit: UnitSystem, weather: &mut Weather) {
        if let Some(t) = json::number(item, "temperature") {
            unit.set_temperature(t, weather);
        }
        weather.wind_speed = json::number(item, "wind_speed").map(|s| unit.wind_speed(s));
        weather.wind_degrees = json::small_int(item, "wind_degree");
        weather.pressure = json::number(item, "pressure")
            .map(|p| unit.pressure(p).round())
            .and_then(|p| i16::try_from(p as i64).ok());
        weather.humidity = json::small_int(item, "humidity");
        weather.cloudiness = json::rounded(item, "cloudcover").map(units::clamp_cloudiness);
        if let Some(amount) = json::number(item, "precip") {
            precipitation::resolve_opt(
                unit.precipitation(amount),
                weather.temperature_celsius,
                weather,
            );
        }
    }

    /// Appends one forecast day: its hourly items when present, two synthesized
    /// points (minimum at the start of the day, maximum 12 h later) otherwise.
    fn parse_forecast_day(
        day: &Object,
        unit: UnitSystem,
        data: &mut Vec<Weather>,
    ) -> ParseResult<()> {
        let start = json::timestamp(day, "date_epoch")
            .ok_or(ParseError::MissingRequiredField("date_epoch"))?;

        if let Some(hours) = json::array(day, "hourly").filter(|h| !h.is_empty()) {
            for value in hours {
                let hour = value.as_object().ok_or(ParseError::MissingAnchor("hourly"))?;
                let time = json::string(hour, "time")
                    .and_then(parse_time_offset)
                    .and_then(|offset| start.checked_add_signed(offset))
                    .ok_or(ParseError::MissingRequiredField("time"))?;
                let mut weather = Weather {
                    data_time: Some(time),
                    ..Weather::default()
                };
                Self::parse_conditions(hour, unit, &mut weather);
                data.push(weather);
            }
            return Ok(());
        }

        let mut shared = Weather::default();
        if let Some(amount) = json::number(day, "totalprecip") {
            let mut average = Weather::default();
            if let Some(avg) = json::number(day, "avgtemp") {
                unit.set_temperature(avg, &mut average);
            }
            precipitation::resolve_opt(
                unit.precipitation(amount),
                average.temperature_celsius,
                &mut shared,
            );
        }

        let noon = start
            .checked_add_signed(Duration::hours(12))
            .ok_or(ParseError::MissingRequiredField("date_epoch"))?;
        data.push(synthesized(day, "mintemp", start, unit, &shared));
        data.push(synthesized(day, "maxtemp", noon, unit, &shared));
        Ok(())
    }
}

fn synthesized(
    day: &Object,
    temperature_key: &str,
    time: DateTime<Utc>,
    unit: UnitSystem,
    shared: &Weather,
) -> Weather {
    let mut weather = Weather {
        data_time: Some(time),
        ..shared.clone()
    };
    if let Some(t) = json::number(day, temperature_key) {
        unit.set_temperature(t, &mut weather);
    }
    weather
}

/// Hourly items are labelled `"0"`, `"300"`, ..., `"2100"`: hours and minutes
/// since midnight written as one number.
fn parse_time_offset(time: &str) -> Option<Duration> {
    let value: i64 = time.trim().parse().ok()?;
    let (hours, minutes) = (value / 100, value % 100);
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }
    Some(Duration::hours(hours) + Duration::minutes(minutes))
}

/// Weatherstack reports failures as `{"success": false, "error": {"info": ...}}`.
fn check_error(root: &Object) -> ParseResult<()> {
    let failed = root.get("success").and_then(|v| v.as_bool()) == Some(false);
    let error = json::object(root, "error");
    if !failed && error.is_none() {
        return Ok(());
    }
    let info = error
        .and_then(|e| json::string(e, "info"))
        .unwrap_or("request was not successful");
    Err(ParseError::ProviderError(info.to_owned()))
}

impl WeatherParser for Weatherstack {
    fn parse_current_weather(&self, json: &str) -> ParseResult<Weather> {
        let doc = json::parse_document(json)?;
        let mut weather = Weather {
            json: Some(json.to_owned()),
            ..Weather::default()
        };
        let root = json::root_object(&doc)?;
        check_error(root)?;
        let current = json::required_object(root, "current")?;
        let unit = UnitSystem::from_request(root);
        Self::parse_conditions(current, unit, &mut weather);
        weather.data_time =
            json::object(root, "location").and_then(|l| json::timestamp(l, "localtime_epoch"));
        Ok(weather)
    }

    fn parse_forecast(&self, json: &str) -> ParseResult<Forecast> {
        let doc = json::parse_document(json)?;
        let mut forecast = Forecast {
            json: Some(json.to_owned()),
            ..Forecast::default()
        };
        let root = json::root_object(&doc)?;
        check_error(root)?;
        let days = json::required_object(root, "forecast")?;
        let unit = UnitSystem::from_request(root);

        // Days are walked in the order the provider sent them.
        for value in days.values() {
            let day = value.as_object().ok_or(ParseError::MissingAnchor("forecast day"))?;
            Self::parse_forecast_day(day, unit, &mut forecast.data)?;
        }

        if forecast.data.is_empty() {
            return Err(ParseError::MissingAnchor("forecast"));
        }
        Ok(forecast)
    }
}

impl Endpoints for Weatherstack {
    fn current_url(&self, location: &Location, api_key: &str) -> Option<String> {
        build_url(
            &format!("{BASE_URL}/current"),
            &[
                ("access_key", api_key.to_owned()),
                ("query", free_text_query(location)?),
                ("units", "m".to_owned()),
            ],
        )
    }

    fn forecast_url(&self, location: &Location, api_key: &str) -> Option<String> {
        build_url(
            &format!("{BASE_URL}/forecast"),
            &[
                ("access_key", api_key.to_owned()),
                ("query", free_text_query(location)?),
                ("units", "m".to_owned()),
                ("forecast_days", FORECAST_DAYS.to_string()),
                ("hourly", "1".to_owned()),
            ],
        )
    }
}
