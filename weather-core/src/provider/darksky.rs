//! DarkSky (`api.darksky.net`), queried with `units=si`.

use crate::{
    error::{ParseError, ParseResult},
    json::{self, Object},
    model::{Forecast, Location, Weather},
    units,
};

use super::{Endpoints, WeatherParser, build_url};

const BASE_URL: &str = "https://api.darksky.net/forecast";

#[derive(Debug, Clone, Copy, Default)]
pub struct DarkSky;

impl DarkSky {
    /// Fills `weather` from a DarkSky data point (`currently` or an element
    /// of `hourly.data`).
    fn parse_data_point(point: &Object, weather: &mut Weather) -> ParseResult<()> {
        weather.data_time = json::timestamp(point, "time");
        if let Some(celsius) = json::number(point, "temperature") {
            weather.set_temperatures_from_celsius(celsius);
        }
        weather.humidity = json::number(point, "humidity")
            .map(|h| units::clamp_humidity(units::fraction_to_percent(h)));
        weather.pressure = json::small_int(point, "pressure");
        weather.wind_speed = json::number(point, "windSpeed");
        weather.wind_degrees = json::small_int(point, "windBearing");
        weather.cloudiness = json::number(point, "cloudCover")
            .map(|c| units::clamp_cloudiness(units::fraction_to_percent(c)));

        if let Some(intensity) = json::number(point, "precipIntensity") {
            match json::string(point, "precipType") {
                Some("rain") => {
                    weather.rain = Some(intensity);
                    weather.snow = Some(0.0);
                }
                Some("snow") => {
                    weather.rain = Some(0.0);
                    weather.snow = Some(intensity);
                }
                Some("sleet") => {
                    weather.rain = Some(intensity);
                    weather.snow = Some(intensity);
                }
                Some(_) | None if intensity == 0.0 => {
                    weather.rain = Some(0.0);
                    weather.snow = Some(0.0);
                }
                _ => return Err(ParseError::AmbiguousPrecipitation(intensity)),
            }
        }
        Ok(())
    }

    fn coordinates_path(location: &Location, api_key: &str) -> Option<String> {
        let c = location.coordinates?;
        Some(format!("{BASE_URL}/{api_key}/{},{}", c.latitude, c.longitude))
    }
}

impl WeatherParser for DarkSky {
    fn parse_current_weather(&self, json: &str) -> ParseResult<Weather> {
        let doc = json::parse_document(json)?;
        let mut weather = Weather {
            json: Some(json.to_owned()),
            ..Weather::default()
        };
        let root = json::root_object(&doc)?;
        let currently = json::required_object(root, "currently")?;
        Self::parse_data_point(currently, &mut weather)?;
        Ok(weather)
    }

    fn parse_forecast(&self, json: &str) -> ParseResult<Forecast> {
        let doc = json::parse_document(json)?;
        let mut forecast = Forecast {
            json: Some(json.to_owned()),
            ..Forecast::default()
        };
        let root = json::root_object(&doc)?;
        let hourly = json::required_object(root, "hourly")?;
        let data = json::required_array(hourly, "data")?;

        for value in data {
            let point = value
                .as_object()
                .ok_or(ParseError::MissingAnchor("hourly data point"))?;
            if json::timestamp(point, "time").is_none() {
                return Err(ParseError::MissingRequiredField("time"));
            }
            let mut weather = Weather::default();
            Self::parse_data_point(point, &mut weather)?;
            forecast.data.push(weather);
        }

        if forecast.data.is_empty() {
            return Err(ParseError::MissingAnchor("hourly.data"));
        }
        Ok(forecast)
    }
}

impl Endpoints for DarkSky {
    /// DarkSky only accepts coordinates.
    fn current_url(&self, location: &Location, api_key: &str) -> Option<String> {
        build_url(
            &Self::coordinates_path(location, api_key)?,
            &[
                ("units", "si".to_owned()),
                ("exclude", "minutely,hourly,daily,alerts,flags".to_owned()),
            ],
        )
    }

    fn forecast_url(&self, location: &Location, api_key: &str) -> Option<String> {
        build_url(
            &Self::coordinates_path(location, api_key)?,
            &[
                ("units", "si".to_owned()),
                ("exclude", "currently,minutely,daily,alerts,flags".to_owned()),
                ("extend", "hourly".to_owned()),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn parses_snow() {
        let json = r#"{"currently":{"time":1000,"temperature":-4.0,"humidity":0.92,"precipIntensity":0.7,"precipType":"snow","pressure":1009}}"#;
        let w = DarkSky.parse_current_weather(json).unwrap();
        assert_eq!(w.snow, Some(0.7));
        assert_eq!(w.rain, Some(0.0));
        assert_eq!(w.humidity, Some(92));
        assert_eq!(w.pressure, Some(1009));
        assert_eq!(w.temperature_celsius, Some(-4.0));
        assert_eq!(w.temperature_kelvin, Some(269.15));
        assert_eq!(w.data_time, DateTime::from_timestamp(1000, 0));
    }

    #[test]
    fn sleet_counts_as_both() {
        let json = r#"{"currently":{"precipIntensity":0.3,"precipType":"sleet"}}"#;
        let w = DarkSky.parse_current_weather(json).unwrap();
        assert_eq!((w.rain, w.snow), (Some(0.3), Some(0.3)));
    }

    #[test]
    fn untyped_precipitation() {
        let zero = r#"{"currently":{"time":1,"precipIntensity":0}}"#;
        let w = DarkSky.parse_current_weather(zero).unwrap();
        assert_eq!((w.rain, w.snow), (Some(0.0), Some(0.0)));

        let nonzero = r#"{"currently":{"time":1,"precipIntensity":0.2}}"#;
        assert!(matches!(
            DarkSky.parse_current_weather(nonzero),
            Err(ParseError::AmbiguousPrecipitation(_))
        ));
    }

    #[test]
    fn cloud_cover_is_clamped() {
        let json = r#"{"currently":{"cloudCover":1.05,"windSpeed":3.2,"windBearing":270}}"#;
        let w = DarkSky.parse_current_weather(json).unwrap();
        assert_eq!(w.cloudiness, Some(101));
        assert_eq!(w.wind_speed, Some(3.2));
        assert_eq!(w.wind_degrees, Some(270));
    }

    #[test]
    fn missing_currently_is_fatal() {
        assert!(matches!(
            DarkSky.parse_current_weather(r#"{"hourly":{}}"#),
            Err(ParseError::MissingAnchor("currently"))
        ));
    }

    #[test]
    fn parses_hourly_forecast() {
        let json = r#"{"hourly":{"data":[
            {"time":3600,"temperature":1.5,"precipIntensity":0.1,"precipType":"rain"},
            {"time":7200,"temperature":-0.5,"precipIntensity":0}
        ]}}"#;
        let f = DarkSky.parse_forecast(json).unwrap();
        assert_eq!(f.data.len(), 2);
        assert_eq!(f.data[0].rain, Some(0.1));
        assert_eq!(f.data[1].data_time, DateTime::from_timestamp(7200, 0));
        assert_eq!(f.data[1].snow, Some(0.0));
    }

    #[test]
    fn forecast_failures() {
        assert!(DarkSky.parse_forecast(r#"{"hourly":{"data":[]}}"#).is_err());
        assert!(DarkSky.parse_forecast(r#"{"daily":{"data":[]}}"#).is_err());
        let ambiguous = r#"{"hourly":{"data":[{"time":1},{"time":2,"precipIntensity":1.0}]}}"#;
        assert!(DarkSky.parse_forecast(ambiguous).is_err());
    }

    #[test]
    fn hourly_point_without_time_fails() {
        let json = r#"{"hourly":{"data":[{"time":3600,"temperature":2.0},{"temperature":1.0}]}}"#;
        assert!(matches!(
            DarkSky.parse_forecast(json),
            Err(ParseError::MissingRequiredField("time"))
        ));
    }

    #[test]
    fn urls_need_coordinates() {
        let loc = Location::from_coordinates(51.5, -0.12);
        let url = DarkSky.current_url(&loc, "KEY").unwrap();
        assert!(url.starts_with("https://api.darksky.net/forecast/KEY/51.5,-0.12?units=si"));
        assert!(DarkSky.forecast_url(&Location::from_name("London"), "KEY").is_none());
    }
}
