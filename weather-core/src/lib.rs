//! Core library for the `weather` collector.
//!
//! This crate defines:
//! - The canonical model (`Weather`, `Forecast`, `Location`)
//! - One parser per weather provider, normalizing its JSON into that model
//! - Storage contracts, CSV export and HTTP transport around the parsers
//! - Configuration & credentials handling
//!
//! Parsing is synchronous and keeps no state between calls.

pub mod config;
pub mod csv;
pub mod error;
pub(crate) mod json;
pub mod model;
pub mod precipitation;
pub mod provider;
pub mod store;
pub mod transport;
pub mod units;

pub use config::{Config, ProviderConfig};
pub use csv::CsvWriter;
pub use error::{ParseError, ParseResult};
pub use model::{Coordinates, Forecast, ForecastMeta, Location, Weather, WeatherMeta};
pub use provider::{Endpoints, ProviderId, WeatherParser};
pub use store::{MemoryStore, Source, Store, StoreError};
pub use transport::{HttpTransport, Transport, TransportError};
