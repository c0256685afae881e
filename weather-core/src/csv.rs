//! Semicolon separated export of canonical records.

use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{
    model::{Forecast, Location, Weather},
    provider::ProviderId,
};

const HEADER: &str = "provider;location;dataTime;requestTime;temperatureK;temperatureC;\
temperatureF;humidity;rain;snow;pressure;windSpeed;windDegrees;cloudiness";

/// Writes one row per weather record; absent values become empty cells.
#[derive(Debug)]
pub struct CsvWriter<W: Write> {
    out: W,
    header_written: bool,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            header_written: false,
        }
    }

    fn header(&mut self) -> std::io::Result<()> {
        if !self.header_written {
            writeln!(self.out, "{HEADER}")?;
            self.header_written = true;
        }
        Ok(())
    }

    pub fn write_weather(
        &mut self,
        provider: ProviderId,
        location: &Location,
        weather: &Weather,
    ) -> std::io::Result<()> {
        self.header()?;
        let row = [
            provider.as_str().to_owned(),
            escape(&location.to_string()),
            time(weather.data_time),
            time(weather.request_time),
            cell(weather.temperature_kelvin),
            cell(weather.temperature_celsius),
            cell(weather.temperature_fahrenheit),
            cell(weather.humidity),
            cell(weather.rain),
            cell(weather.snow),
            cell(weather.pressure),
            cell(weather.wind_speed),
            cell(weather.wind_degrees),
            cell(weather.cloudiness),
        ];
        writeln!(self.out, "{}", row.join(";"))
    }

    /// One row per forecast slot, each stamped with the forecast's request time.
    pub fn write_forecast(
        &mut self,
        provider: ProviderId,
        location: &Location,
        forecast: &Forecast,
    ) -> std::io::Result<()> {
        self.header()?;
        for slot in &forecast.data {
            let weather = Weather {
                request_time: forecast.request_time,
                ..slot.clone()
            };
            self.write_weather(provider, location, &weather)?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> std::io::Result<W> {
        self.header()?;
        self.out.flush()?;
        Ok(self.out)
    }
}

fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn time(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

fn escape(value: &str) -> String {
    if value.contains([';', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}
