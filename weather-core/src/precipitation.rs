//! Attribution of a combined precipitation amount to rain or snow.

use crate::model::Weather;

/// Splits a single precipitation `amount` into rain or snow using the air
/// temperature: at or above freezing it is rain, below it is snow.
///
/// An unknown temperature (`NaN`) is treated as rain. That is a guess, not a
/// measurement.
pub fn resolve(amount: f64, temperature_celsius: f64, weather: &mut Weather) {
    if temperature_celsius < 0.0 {
        weather.rain = Some(0.0);
        weather.snow = Some(amount);
    } else {
        weather.rain = Some(amount);
        weather.snow = Some(0.0);
    }
}

/// Same as [`resolve`], for callers that may not have a temperature at all.
pub fn resolve_opt(amount: f64, temperature_celsius: Option<f64>, weather: &mut Weather) {
    resolve(amount, temperature_celsius.unwrap_or(f64::NAN), weather);
}
