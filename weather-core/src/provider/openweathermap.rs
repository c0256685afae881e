//! OpenWeatherMap (`api.openweathermap.org/data/2.5`).
//!
//! Requests use the default unit system, so temperatures arrive in Kelvin and
//! wind speed in m/s.

use serde_json::Value;

use crate::{
    error::{ParseError, ParseResult},
    json::{self, Object},
    model::{Coordinates, Forecast, Location, Weather},
};

use super::{Endpoints, WeatherParser, build_url};

const BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenWeatherMap;

impl OpenWeatherMap {
    /// Fills `weather` from one OWM weather item, which is the document root
    /// for current weather and an element of `list` otherwise.
    fn parse_item(item: &Object, weather: &mut Weather) -> ParseResult<()> {
        let main = json::required_object(item, "main")?;
        if let Some(kelvin) = json::number(main, "temp") {
            weather.set_temperatures_from_kelvin(kelvin);
        }
        weather.pressure = json::small_int(main, "pressure");
        weather.humidity = json::small_int(main, "humidity");

        if let Some(wind) = json::object(item, "wind") {
            weather.wind_speed = json::number(wind, "speed");
            weather.wind_degrees = json::small_int(wind, "deg");
        }
        if let Some(clouds) = json::object(item, "clouds") {
            weather.cloudiness = json::integer(clouds, "all").map(crate::units::clamp_cloudiness);
        }
        weather.rain = precipitation(item, "rain");
        weather.snow = precipitation(item, "snow");
        weather.data_time = json::timestamp(item, "dt");
        Ok(())
    }

    fn parse_location(item: &Object) -> Location {
        let mut location = Location {
            id: json::integer(item, "id").and_then(|id| u32::try_from(id).ok()),
            name: json::string(item, "name").map(str::to_owned),
            ..Location::default()
        };
        if let Some(coord) = json::object(item, "coord") {
            if let (Some(latitude), Some(longitude)) =
                (json::number(coord, "lat"), json::number(coord, "lon"))
            {
                location.coordinates = Some(Coordinates {
                    latitude,
                    longitude,
                });
            }
        }
        location.country_code = json::object(item, "sys")
            .and_then(|sys| json::string(sys, "country"))
            .map(str::to_owned);
        location
    }

    fn location_params(location: &Location, api_key: &str) -> Option<Vec<(&'static str, String)>> {
        let mut params = if let Some(id) = location.id {
            vec![("id", id.to_string())]
        } else if let Some(c) = &location.coordinates {
            vec![("lat", c.latitude.to_string()), ("lon", c.longitude.to_string())]
        } else if let Some(name) = &location.name {
            let q = match &location.country_code {
                Some(cc) => format!("{name},{cc}"),
                None => name.clone(),
            };
            vec![("q", q)]
        } else if let Some(postcode) = &location.postcode {
            let zip = match &location.country_code {
                Some(cc) => format!("{postcode},{cc}"),
                None => postcode.clone(),
            };
            vec![("zip", zip)]
        } else {
            return None;
        };
        params.push(("appid", api_key.to_owned()));
        Some(params)
    }
}

/// `rain`/`snow` objects carry the volume of the last 3 h (or 1 h). An object
/// without either key means no precipitation, so it yields zero.
fn precipitation(item: &Object, key: &str) -> Option<f64> {
    let obj = json::object(item, key)?;
    Some(
        json::number(obj, "3h")
            .or_else(|| json::number(obj, "1h"))
            .unwrap_or(0.0),
    )
}

impl WeatherParser for OpenWeatherMap {
    fn parse_current_weather(&self, json: &str) -> ParseResult<Weather> {
        let doc = json::parse_document(json)?;
        let mut weather = Weather {
            json: Some(json.to_owned()),
            ..Weather::default()
        };
        let root = json::root_object(&doc)?;
        Self::parse_item(root, &mut weather)?;
        Ok(weather)
    }

    fn parse_forecast(&self, json: &str) -> ParseResult<Forecast> {
        let doc = json::parse_document(json)?;
        let mut forecast = Forecast {
            json: Some(json.to_owned()),
            ..Forecast::default()
        };
        let root = json::root_object(&doc)?;
        let list = json::required_array(root, "list")?;
        let declared = json::integer(root, "cnt").ok_or(ParseError::MissingRequiredField("cnt"))?;

        for value in list {
            let item = value.as_object().ok_or(ParseError::MissingAnchor("list item"))?;
            if json::timestamp(item, "dt").is_none() {
                return Err(ParseError::MissingRequiredField("dt"));
            }
            let mut weather = Weather::default();
            Self::parse_item(item, &mut weather)?;
            forecast.data.push(weather);
        }

        json::check_count(declared, forecast.data.len())?;
        if forecast.data.is_empty() {
            return Err(ParseError::MissingAnchor("list"));
        }
        Ok(forecast)
    }

    fn parse_locations(&self, json: &str) -> ParseResult<Vec<(Location, Weather)>> {
        let doc = json::parse_document(json)?;
        let root = json::root_object(&doc)?;
        let count = json::integer(root, "count").ok_or(ParseError::MissingRequiredField("count"))?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let list = json::required_array(root, "list")?;
        let mut result = Vec::with_capacity(list.len());
        for value in list {
            let item = value.as_object().ok_or(ParseError::MissingAnchor("list item"))?;
            let location = Self::parse_location(item);
            let mut weather = Weather {
                json: Some(Value::Object(item.clone()).to_string()),
                ..Weather::default()
            };
            let has_weather = Self::parse_item(item, &mut weather).is_ok();
            if location.is_empty() && !has_weather {
                return Err(ParseError::MissingAnchor("location or weather"));
            }
            result.push((location, weather));
        }

        json::check_count(count, result.len())?;
        Ok(result)
    }
}

impl Endpoints for OpenWeatherMap {
    fn current_url(&self, location: &Location, api_key: &str) -> Option<String> {
        build_url(
            &format!("{BASE_URL}/weather"),
            &Self::location_params(location, api_key)?,
        )
    }

    fn forecast_url(&self, location: &Location, api_key: &str) -> Option<String> {
        build_url(
            &format!("{BASE_URL}/forecast"),
            &Self::location_params(location, api_key)?,
        )
    }

    /// `find` only searches around coordinates.
    fn locations_url(&self, location: &Location, api_key: &str) -> Option<String> {
        let c = location.coordinates?;
        build_url(
            &format!("{BASE_URL}/find"),
            &[
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
                ("appid", api_key.to_owned()),
            ],
        )
    }
}
