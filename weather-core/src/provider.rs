use crate::{
    error::{ParseError, ParseResult},
    model::{Forecast, Location, Weather},
};
use std::{convert::TryFrom, fmt::Debug, str::FromStr};
use tracing::warn;

pub mod apixu;
pub mod darksky;
pub mod openweathermap;
pub mod weatherbit;
pub mod weatherstack;

pub use apixu::Apixu;
pub use darksky::DarkSky;
pub use openweathermap::OpenWeatherMap;
pub use weatherbit::Weatherbit;
pub use weatherstack::Weatherstack;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderId {
    OpenWeatherMap,
    DarkSky,
    Apixu,
    Weatherbit,
    Weatherstack,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeatherMap => "openweathermap",
            ProviderId::DarkSky => "darksky",
            ProviderId::Apixu => "apixu",
            ProviderId::Weatherbit => "weatherbit",
            ProviderId::Weatherstack => "weatherstack",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[
            ProviderId::OpenWeatherMap,
            ProviderId::DarkSky,
            ProviderId::Apixu,
            ProviderId::Weatherbit,
            ProviderId::Weatherstack,
        ]
    }

    /// The parser for this provider's payloads.
    pub fn parser(&self) -> &'static dyn WeatherParser {
        match self {
            ProviderId::OpenWeatherMap => &OpenWeatherMap,
            ProviderId::DarkSky => &DarkSky,
            ProviderId::Apixu => &Apixu,
            ProviderId::Weatherbit => &Weatherbit,
            ProviderId::Weatherstack => &Weatherstack,
        }
    }

    /// The request builder for this provider's endpoints.
    pub fn endpoints(&self) -> &'static dyn Endpoints {
        match self {
            ProviderId::OpenWeatherMap => &OpenWeatherMap,
            ProviderId::DarkSky => &DarkSky,
            ProviderId::Apixu => &Apixu,
            ProviderId::Weatherbit => &Weatherbit,
            ProviderId::Weatherstack => &Weatherstack,
        }
    }

    /// Parses a current weather payload, logging the reason on failure.
    pub fn parse_current_weather(&self, json: &str) -> ParseResult<Weather> {
        self.parser()
            .parse_current_weather(json)
            .inspect_err(|e| warn!(provider = %self, error = %e, "failed to parse current weather"))
    }

    /// Parses a forecast payload, logging the reason on failure.
    pub fn parse_forecast(&self, json: &str) -> ParseResult<Forecast> {
        self.parser()
            .parse_forecast(json)
            .inspect_err(|e| warn!(provider = %self, error = %e, "failed to parse forecast"))
    }

    /// Parses a location search payload, logging the reason on failure.
    pub fn parse_locations(&self, json: &str) -> ParseResult<Vec<(Location, Weather)>> {
        self.parser()
            .parse_locations(json)
            .inspect_err(|e| warn!(provider = %self, error = %e, "failed to parse locations"))
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweathermap" | "owm" => Ok(ProviderId::OpenWeatherMap),
            "darksky" => Ok(ProviderId::DarkSky),
            "apixu" => Ok(ProviderId::Apixu),
            "weatherbit" => Ok(ProviderId::Weatherbit),
            "weatherstack" => Ok(ProviderId::Weatherstack),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: \
                 openweathermap, darksky, apixu, weatherbit, weatherstack."
            )),
        }
    }
}

impl FromStr for ProviderId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderId::try_from(s)
    }
}

/// Turns one provider's JSON responses into canonical records.
pub trait WeatherParser: Send + Sync + Debug {
    fn parse_current_weather(&self, json: &str) -> ParseResult<Weather>;

    fn parse_forecast(&self, json: &str) -> ParseResult<Forecast>;

    /// Location search results, each with that location's current weather.
    fn parse_locations(&self, _json: &str) -> ParseResult<Vec<(Location, Weather)>> {
        Err(ParseError::Unsupported("location search"))
    }
}

/// Builds request URLs for one provider.
///
/// `None` means the provider cannot express the given location.
pub trait Endpoints: Send + Sync + Debug {
    fn current_url(&self, location: &Location, api_key: &str) -> Option<String>;

    fn forecast_url(&self, location: &Location, api_key: &str) -> Option<String>;

    fn locations_url(&self, _location: &Location, _api_key: &str) -> Option<String> {
        None
    }
}

/// Builds `base?params`, percent-encoding the values.
pub(crate) fn build_url(base: &str, params: &[(&str, String)]) -> Option<String> {
    reqwest::Url::parse_with_params(base, params)
        .ok()
        .map(String::from)
}

/// Free text query used by providers with a single `q`-style parameter:
/// coordinates first, then name (with country), then postcode.
pub(crate) fn free_text_query(location: &Location) -> Option<String> {
    if let Some(c) = &location.coordinates {
        return Some(format!("{},{}", c.latitude, c.longitude));
    }
    if let Some(name) = &location.name {
        return Some(match &location.country_code {
            Some(cc) => format!("{name},{cc}"),
            None => name.clone(),
        });
    }
    location.postcode.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn provider_id_is_case_insensitive_and_knows_aliases() {
        assert_eq!(
            "DarkSky".parse::<ProviderId>().unwrap(),
            ProviderId::DarkSky
        );
        assert_eq!(
            ProviderId::try_from("OWM").unwrap(),
            ProviderId::OpenWeatherMap
        );
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn malformed_json_fails_for_every_provider() {
        for id in ProviderId::all() {
            let err = id.parse_current_weather("{ this is not json").unwrap_err();
            assert!(matches!(err, ParseError::Malformed(_)), "{id}: {err}");
            assert!(id.parse_forecast("{ this is not json").is_err());
        }
    }

    #[test]
    fn only_openweathermap_lists_locations() {
        for id in ProviderId::all() {
            let result = id.parse_locations(r#"{"count": 0}"#);
            if *id == ProviderId::OpenWeatherMap {
                assert_eq!(result.unwrap().len(), 0);
            } else {
                assert!(matches!(result, Err(ParseError::Unsupported(_))));
            }
        }
    }

    #[test]
    fn free_text_query_precedence() {
        let mut loc = Location::from_name("Dresden");
        loc.country_code = Some("DE".into());
        loc.postcode = Some("01067".into());
        assert_eq!(free_text_query(&loc).as_deref(), Some("Dresden,DE"));

        loc.coordinates = Location::from_coordinates(51.05, 13.74).coordinates;
        assert_eq!(free_text_query(&loc).as_deref(), Some("51.05,13.74"));

        let postcode_only = Location {
            postcode: Some("01067".into()),
            ..Location::default()
        };
        assert_eq!(free_text_query(&postcode_only).as_deref(), Some("01067"));
        assert_eq!(free_text_query(&Location::default()), None);
    }

    #[test]
    fn build_url_encodes_values() {
        let url = build_url("https://example.com/a", &[("q", "São Paulo".into())]).unwrap();
        assert_eq!(url, "https://example.com/a?q=S%C3%A3o+Paulo");
    }
}
