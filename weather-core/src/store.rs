//! Persistence contracts for canonical records, plus an in-memory backend.
//!
//! Relational and file backends live outside this crate; they implement
//! [`Store`] and [`Source`] the same way [`MemoryStore`] does.

use std::sync::RwLock;

use thiserror::Error;
use tracing::debug;

use crate::{
    model::{Forecast, ForecastMeta, Location, Weather, WeatherMeta},
    provider::ProviderId,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("location must identify a place")]
    EmptyLocation,

    #[error("store lock was poisoned")]
    Poisoned,

    #[error("storage backend failed: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Write side: keeps what the parsers produced.
pub trait Store {
    fn save_current_weather(
        &self,
        provider: ProviderId,
        location: &Location,
        weather: &Weather,
    ) -> StoreResult<()>;

    fn save_forecast(
        &self,
        provider: ProviderId,
        location: &Location,
        forecast: &Forecast,
    ) -> StoreResult<()>;
}

/// Read side: hands stored records back, either whole or as timestamps only.
pub trait Source {
    fn get_current_weather(
        &self,
        provider: ProviderId,
        location: &Location,
    ) -> StoreResult<Vec<Weather>>;

    fn get_forecasts(&self, provider: ProviderId, location: &Location)
    -> StoreResult<Vec<Forecast>>;

    fn get_meta_current_weather(
        &self,
        provider: ProviderId,
        location: &Location,
    ) -> StoreResult<Vec<WeatherMeta>> {
        Ok(self
            .get_current_weather(provider, location)?
            .iter()
            .map(Weather::meta)
            .collect())
    }

    fn get_meta_forecasts(
        &self,
        provider: ProviderId,
        location: &Location,
    ) -> StoreResult<Vec<ForecastMeta>> {
        Ok(self
            .get_forecasts(provider, location)?
            .iter()
            .map(Forecast::meta)
            .collect())
    }
}

#[derive(Debug)]
struct Entry<T> {
    provider: ProviderId,
    location: Location,
    record: T,
}

#[derive(Debug, Default)]
struct Tables {
    weather: Vec<Entry<Weather>>,
    forecasts: Vec<Entry<Forecast>>,
}

/// Keeps records in insertion order, guarded by a lock so one instance can be
/// shared between threads.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored current weather record, with its provider and location.
    pub fn all_current_weather(&self) -> StoreResult<Vec<(ProviderId, Location, Weather)>> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables
            .weather
            .iter()
            .map(|e| (e.provider, e.location.clone(), e.record.clone()))
            .collect())
    }

    /// Every stored forecast, with its provider and location.
    pub fn all_forecasts(&self) -> StoreResult<Vec<(ProviderId, Location, Forecast)>> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables
            .forecasts
            .iter()
            .map(|e| (e.provider, e.location.clone(), e.record.clone()))
            .collect())
    }
}

fn select<T: Clone>(entries: &[Entry<T>], provider: ProviderId, location: &Location) -> Vec<T> {
    entries
        .iter()
        .filter(|e| e.provider == provider && e.location == *location)
        .map(|e| e.record.clone())
        .collect()
}

impl Store for MemoryStore {
    fn save_current_weather(
        &self,
        provider: ProviderId,
        location: &Location,
        weather: &Weather,
    ) -> StoreResult<()> {
        if location.is_empty() {
            return Err(StoreError::EmptyLocation);
        }
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned)?;
        tables.weather.push(Entry {
            provider,
            location: location.clone(),
            record: weather.clone(),
        });
        debug!(%provider, %location, "stored current weather");
        Ok(())
    }

    fn save_forecast(
        &self,
        provider: ProviderId,
        location: &Location,
        forecast: &Forecast,
    ) -> StoreResult<()> {
        if location.is_empty() {
            return Err(StoreError::EmptyLocation);
        }
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned)?;
        tables.forecasts.push(Entry {
            provider,
            location: location.clone(),
            record: forecast.clone(),
        });
        debug!(%provider, %location, points = forecast.data.len(), "stored forecast");
        Ok(())
    }
}

impl Source for MemoryStore {
    fn get_current_weather(
        &self,
        provider: ProviderId,
        location: &Location,
    ) -> StoreResult<Vec<Weather>> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        Ok(select(&tables.weather, provider, location))
    }

    fn get_forecasts(
        &self,
        provider: ProviderId,
        location: &Location,
    ) -> StoreResult<Vec<Forecast>> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        Ok(select(&tables.forecasts, provider, location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn weather_at(ts: i64) -> Weather {
        Weather {
            data_time: DateTime::from_timestamp(ts, 0),
            temperature_celsius: Some(1.0),
            ..Weather::default()
        }
        .with_request_time(Utc::now())
    }

    #[test]
    fn saves_and_reads_back_per_provider_and_location() {
        let store = MemoryStore::new();
        let berlin = Location::from_name("Berlin");
        let paris = Location::from_name("Paris");

        store
            .save_current_weather(ProviderId::Apixu, &berlin, &weather_at(1))
            .unwrap();
        store
            .save_current_weather(ProviderId::Apixu, &berlin, &weather_at(2))
            .unwrap();
        store
            .save_current_weather(ProviderId::DarkSky, &berlin, &weather_at(3))
            .unwrap();
        store
            .save_current_weather(ProviderId::Apixu, &paris, &weather_at(4))
            .unwrap();

        let stored = store.get_current_weather(ProviderId::Apixu, &berlin).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].data_time, DateTime::from_timestamp(2, 0));

        let meta = store
            .get_meta_current_weather(ProviderId::Apixu, &paris)
            .unwrap();
        assert_eq!(meta.len(), 1);
        assert_eq!(meta[0].data_time, DateTime::from_timestamp(4, 0));
        assert!(meta[0].request_time.is_some());
        assert_eq!(store.all_current_weather().unwrap().len(), 4);
    }

    #[test]
    fn forecasts_round_trip_with_meta() {
        let store = MemoryStore::new();
        let loc = Location::from_id(42);
        let forecast = Forecast {
            data: vec![weather_at(1), weather_at(2)],
            ..Forecast::default()
        }
        .with_request_time(Utc::now());

        store
            .save_forecast(ProviderId::Weatherbit, &loc, &forecast)
            .unwrap();
        let stored = store.get_forecasts(ProviderId::Weatherbit, &loc).unwrap();
        assert_eq!(stored, vec![forecast.clone()]);

        let meta = store.get_meta_forecasts(ProviderId::Weatherbit, &loc).unwrap();
        assert_eq!(meta, vec![forecast.meta()]);
        assert!(store
            .get_forecasts(ProviderId::Weatherstack, &loc)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn rejects_unidentified_location() {
        let store = MemoryStore::new();
        let err = store
            .save_current_weather(ProviderId::Apixu, &Location::default(), &Weather::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::EmptyLocation));
    }
}
