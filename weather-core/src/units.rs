//! Unit conversions shared by the provider parsers.
//!
//! Derived values are passed through [`round_if_close`] so that conversion noise
//! like `18.999999999999977` is stored as `19.0`.

/// Offset between the Kelvin and Celsius scales.
pub const KELVIN_OFFSET: f64 = 273.15;

const ROUNDING_THRESHOLD: f64 = 0.005;

/// Rounds `value` to the nearest integer if it is within 0.005 of it,
/// otherwise returns it unchanged.
pub fn round_if_close(value: f64) -> f64 {
    let rounded = value.round();
    if (value - rounded).abs() < ROUNDING_THRESHOLD {
        rounded
    } else {
        value
    }
}

pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    round_if_close(celsius + KELVIN_OFFSET)
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    round_if_close(celsius * 1.8 + 32.0)
}

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    round_if_close(kelvin - KELVIN_OFFSET)
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    round_if_close((fahrenheit - 32.0) / 1.8)
}

/// Kilometres per hour to metres per second.
pub fn kph_to_mps(kph: f64) -> f64 {
    kph / 3.6
}

/// Miles per hour to metres per second.
pub fn mph_to_mps(mph: f64) -> f64 {
    mph * 1.609344 / 3.6
}

/// Converts a fraction in `[0, 1]` (e.g. `0.92`) to a whole percentage.
pub fn fraction_to_percent(fraction: f64) -> i64 {
    (fraction * 100.0).round() as i64
}

/// Clamps a cloud cover percentage into `[-1, 101]` so it always fits the
/// signed byte the canonical model stores.
pub fn clamp_cloudiness(percent: i64) -> i8 {
    percent.clamp(-1, 101) as i8
}

/// Clamps a humidity percentage into the `i16` the canonical model stores.
pub fn clamp_humidity(percent: i64) -> i16 {
    percent.clamp(i16::MIN as i64, i16::MAX as i64) as i16
}
