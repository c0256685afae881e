//! Apixu (`api.apixu.com/v1`), whose responses carry both metric and
//! imperial values side by side.

use chrono::Duration;

use crate::{
    error::{ParseError, ParseResult},
    json::{self, Object},
    model::{Forecast, Location, Weather},
    precipitation, units,
};

use super::{Endpoints, WeatherParser, build_url, free_text_query};

const BASE_URL: &str = "https://api.apixu.com/v1";
const FORECAST_DAYS: u8 = 7;

#[derive(Debug, Clone, Copy, Default)]
pub struct Apixu;

impl Apixu {
    /// Fills `weather` from the `current` object or an hourly forecast item.
    /// Current weather is stamped by `last_updated_epoch`, hours by `time_epoch`.
    fn parse_conditions(item: &Object, time_key: &str, weather: &mut Weather) {
        weather.data_time = json::timestamp(item, time_key);
        set_temperatures(item, "temp_c", "temp_f", weather);
        weather.wind_speed = json::number(item, "wind_kph").map(units::kph_to_mps);
        weather.wind_degrees = json::small_int(item, "wind_degree");
        weather.pressure = json::small_int(item, "pressure_mb");
        weather.humidity = json::small_int(item, "humidity");
        weather.cloudiness = json::rounded(item, "cloud").map(units::clamp_cloudiness);
        if let Some(amount) = json::number(item, "precip_mm") {
            precipitation::resolve_opt(amount, weather.temperature_celsius, weather);
        }
    }

    /// Appends one forecast day: its hours if the day has them, two synthesized
    /// points (minimum at the start of the day, maximum 12 h later) otherwise.
    fn parse_forecast_day(day: &Object, data: &mut Vec<Weather>) -> ParseResult<()> {
        let start = json::timestamp(day, "date_epoch")
            .ok_or(ParseError::MissingRequiredField("date_epoch"))?;

        if let Some(hours) = json::array(day, "hour").filter(|h| !h.is_empty()) {
            for value in hours {
                let hour = value.as_object().ok_or(ParseError::MissingAnchor("hour"))?;
                if json::integer(hour, "time_epoch").is_none() {
                    return Err(ParseError::MissingRequiredField("time_epoch"));
                }
                let mut weather = Weather::default();
                Self::parse_conditions(hour, "time_epoch", &mut weather);
                data.push(weather);
            }
            return Ok(());
        }

        let summary = json::required_object(day, "day")?;

        let mut shared = Weather {
            humidity: json::small_int(summary, "avghumidity"),
            wind_speed: json::number(summary, "maxwind_kph").map(units::kph_to_mps),
            ..Weather::default()
        };
        if let Some(amount) = json::number(summary, "totalprecip_mm") {
            precipitation::resolve_opt(amount, average_celsius(summary), &mut shared);
        }

        let mut min = Weather {
            data_time: Some(start),
            ..shared.clone()
        };
        set_temperatures(summary, "mintemp_c", "mintemp_f", &mut min);
        let noon = start
            .checked_add_signed(Duration::hours(12))
            .ok_or(ParseError::MissingRequiredField("date_epoch"))?;
        let mut max = Weather {
            data_time: Some(noon),
            ..shared
        };
        set_temperatures(summary, "maxtemp_c", "maxtemp_f", &mut max);

        data.push(min);
        data.push(max);
        Ok(())
    }
}

/// Apixu sends Celsius and Fahrenheit; both are taken as given and Kelvin is
/// derived from Celsius.
fn set_temperatures(item: &Object, celsius_key: &str, fahrenheit_key: &str, weather: &mut Weather) {
    match (
        json::number(item, celsius_key),
        json::number(item, fahrenheit_key),
    ) {
        (Some(c), Some(f)) => {
            weather.temperature_celsius = Some(c);
            weather.temperature_fahrenheit = Some(f);
            weather.temperature_kelvin = Some(units::celsius_to_kelvin(c));
        }
        (Some(c), None) => weather.set_temperatures_from_celsius(c),
        (None, Some(f)) => weather.set_temperatures_from_fahrenheit(f),
        (None, None) => {}
    }
}

fn average_celsius(summary: &Object) -> Option<f64> {
    json::number(summary, "avgtemp_c").or_else(|| {
        let min = json::number(summary, "mintemp_c")?;
        let max = json::number(summary, "maxtemp_c")?;
        Some((min + max) / 2.0)
    })
}

/// Apixu reports failures as `{"error": {"code": ..., "message": ...}}`.
fn check_error(root: &Object) -> ParseResult<()> {
    match json::object(root, "error") {
        Some(error) => Err(ParseError::ProviderError(
            json::string(error, "message")
                .unwrap_or("unknown error")
                .to_owned(),
        )),
        None => Ok(()),
    }
}

impl WeatherParser for Apixu {
    fn parse_current_weather(&self, json: &str) -> ParseResult<Weather> {
        let doc = json::parse_document(json)?;
        let mut weather = Weather {
            json: Some(json.to_owned()),
            ..Weather::default()
        };
        let root = json::root_object(&doc)?;
        check_error(root)?;
        let current = json::required_object(root, "current")?;
        Self::parse_conditions(current, "last_updated_epoch", &mut weather);
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
        let days = json::required_object(root, "forecast")
            .and_then(|f| json::required_array(f, "forecastday"))?;

        for value in days {
            let day = value
                .as_object()
                .ok_or(ParseError::MissingAnchor("forecastday"))?;
            Self::parse_forecast_day(day, &mut forecast.data)?;
        }

        if forecast.data.is_empty() {
            return Err(ParseError::MissingAnchor("forecastday"));
        }
        Ok(forecast)
    }
}

impl Endpoints for Apixu {
    fn current_url(&self, location: &Location, api_key: &str) -> Option<String> {
        build_url(
            &format!("{BASE_URL}/current.json"),
            &[
                ("key", api_key.to_owned()),
                ("q", free_text_query(location)?),
            ],
        )
    }

    fn forecast_url(&self, location: &Location, api_key: &str) -> Option<String> {
        build_url(
            &format!("{BASE_URL}/forecast.json"),
            &[
                ("key", api_key.to_owned()),
                ("q", free_text_query(location)?),
                ("days", FORECAST_DAYS.to_string()),
            ],
        )
    }
}
