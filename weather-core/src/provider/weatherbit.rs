//! Weatherbit (`api.weatherbit.io/v2.0`), metric units.

use crate::{
    error::{ParseError, ParseResult},
    json::{self, Object},
    model::{Forecast, Location, Weather},
    precipitation, units,
};

use super::{Endpoints, WeatherParser, build_url};

const BASE_URL: &str = "https://api.weatherbit.io/v2.0";

#[derive(Debug, Clone, Copy, Default)]
pub struct Weatherbit;

impl Weatherbit {
    /// Fills `weather` from one element of the `data` array.
    fn parse_item(item: &Object, weather: &mut Weather) {
        weather.data_time = json::timestamp(item, "ts");
        if let Some(celsius) = json::number(item, "temp") {
            weather.set_temperatures_from_celsius(celsius);
        }
        weather.humidity = json::small_int(item, "rh");
        weather.pressure = json::small_int(item, "pres");
        weather.wind_speed = json::number(item, "wind_spd");
        weather.wind_degrees = json::small_int(item, "wind_dir");
        weather.cloudiness = json::rounded(item, "clouds").map(units::clamp_cloudiness);

        // `precip` is the liquid equivalent of everything that fell, `snow`
        // the snowfall alone.
        match (json::number(item, "precip"), json::number(item, "snow")) {
            (_, Some(snow)) if snow > 0.0 => {
                weather.rain = Some(0.0);
                weather.snow = Some(snow);
            }
            (Some(amount), _) => {
                precipitation::resolve_opt(amount, weather.temperature_celsius, weather)
            }
            (None, Some(snow)) => weather.snow = Some(snow),
            (None, None) => {}
        }
    }

    fn location_params(location: &Location, api_key: &str) -> Option<Vec<(&'static str, String)>> {
        let mut params = if let Some(id) = location.id {
            vec![("city_id", id.to_string())]
        } else if let Some(c) = &location.coordinates {
            vec![("lat", c.latitude.to_string()), ("lon", c.longitude.to_string())]
        } else if let Some(name) = &location.name {
            vec![("city", name.clone())]
        } else if let Some(postcode) = &location.postcode {
            vec![("postal_code", postcode.clone())]
        } else {
            return None;
        };
        if location.coordinates.is_none() {
            if let Some(cc) = &location.country_code {
                params.push(("country", cc.clone()));
            }
        }
        params.push(("key", api_key.to_owned()));
        Some(params)
    }
}

/// Weatherbit reports failures as `{"error": "..."}`.
fn check_error(root: &Object) -> ParseResult<()> {
    match json::string(root, "error") {
        Some(message) => Err(ParseError::ProviderError(message.to_owned())),
        None => Ok(()),
    }
}

impl WeatherParser for Weatherbit {
    fn parse_current_weather(&self, json: &str) -> ParseResult<Weather> {
        let doc = json::parse_document(json)?;
        let mut weather = Weather {
            json: Some(json.to_owned()),
            ..Weather::default()
        };
        let root = json::root_object(&doc)?;
        check_error(root)?;
        let data = json::required_array(root, "data")?;
        let count = json::integer(root, "count").ok_or(ParseError::MissingRequiredField("count"))?;
        json::check_count(count, data.len())?;

        let item = data
            .first()
            .and_then(|v| v.as_object())
            .ok_or(ParseError::MissingAnchor("data"))?;
        Self::parse_item(item, &mut weather);
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
        let data = json::required_array(root, "data")?;

        for value in data {
            let item = value.as_object().ok_or(ParseError::MissingAnchor("data item"))?;
            if json::integer(item, "ts").is_none() {
                return Err(ParseError::MissingRequiredField("ts"));
            }
            let mut weather = Weather::default();
            Self::parse_item(item, &mut weather);
            forecast.data.push(weather);
        }

        if let Some(count) = json::integer(root, "count") {
            json::check_count(count, forecast.data.len())?;
        }
        if forecast.data.is_empty() {
            return Err(ParseError::MissingAnchor("data"));
        }
        Ok(forecast)
    }
}

impl Endpoints for Weatherbit {
    fn current_url(&self, location: &Location, api_key: &str) -> Option<String> {
        build_url(
            &format!("{BASE_URL}/current"),
            &Self::location_params(location, api_key)?,
        )
    }

    fn forecast_url(&self, location: &Location, api_key: &str) -> Option<String> {
        build_url(
            &format!("{BASE_URL}/forecast/daily"),
            &Self::location_params(location, api_key)?,
        )
    }
}
