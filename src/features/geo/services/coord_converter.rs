//! Conversion between hand-typed coordinate notations and decimal lat/lon.
//!
//! Three notations are understood:
//! - Decimal Degrees: `49.2827,-123.1207`
//! - Degrees Minutes Seconds: `49 16 58 N 123 7 14 W`
//! - Degrees Decimal Minutes: `49 16.962 N 123 7.233 W`
//!
//! DMS and DDM input is case-insensitive and split on the letter `N`; the
//! westing is always stored as a negative longitude.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::core::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum CoordinateFormat {
    #[default]
    #[serde(rename = "Decimal Degrees")]
    DecimalDegrees,
    #[serde(rename = "Degrees Minutes Seconds")]
    DegreesMinutesSeconds,
    #[serde(rename = "Degrees Decimal Minutes")]
    DegreesDecimalMinutes,
}

impl CoordinateFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinateFormat::DecimalDegrees => "Decimal Degrees",
            CoordinateFormat::DegreesMinutesSeconds => "Degrees Minutes Seconds",
            CoordinateFormat::DegreesDecimalMinutes => "Degrees Decimal Minutes",
        }
    }

    /// HTML input pattern for this notation
    pub fn pattern(&self) -> &'static str {
        match self {
            CoordinateFormat::DecimalDegrees => r"\d{1,2}\.\d+,-\d{1,3}\.\d+",
            CoordinateFormat::DegreesMinutesSeconds => {
                r"\d{2} \d{1,2} \d{1,2} [Nn] \d{2,3} \d{1,2} \d{1,2} [Ww]"
            }
            CoordinateFormat::DegreesDecimalMinutes => {
                r"\d{2} \d{1,2}\.\d+ [Nn] \d{2,3} \d{1,2}\.\d+ [Ww]"
            }
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            CoordinateFormat::DecimalDegrees => "XX.XXX,-XXX.XXX",
            CoordinateFormat::DegreesMinutesSeconds => "XX XX XX N XXX XX XX W",
            CoordinateFormat::DegreesDecimalMinutes => "XX XX.XXX N XXX XX.XXX W",
        }
    }

    pub fn help(&self) -> String {
        format!("Format: {}", self.placeholder())
    }
}

impl fmt::Display for CoordinateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordinateFormat {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Decimal Degrees" => Ok(CoordinateFormat::DecimalDegrees),
            "Degrees Minutes Seconds" => Ok(CoordinateFormat::DegreesMinutesSeconds),
            "Degrees Decimal Minutes" => Ok(CoordinateFormat::DegreesDecimalMinutes),
            other => Err(CoordinateError::UnknownFormat(other.to_string())),
        }
    }
}

/// Messages are shown to the user unchanged
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("Unknown coordinate type: {0}")]
    UnknownFormat(String),

    #[error("Invalid Decimal Degrees: {0}")]
    InvalidDecimalDegrees(String),

    #[error("Invalid coordinate: {0}")]
    InvalidNumber(String),

    #[error("Invalid DMS northing: {0}")]
    InvalidDmsNorthing(String),

    #[error("Invalid DMS west: {0}")]
    InvalidDmsWesting(String),

    #[error("Invalid Degree Decimal Min northing: {0}")]
    InvalidDdmNorthing(String),

    #[error("Invalid Degree Decimal Min west: {0}")]
    InvalidDdmWesting(String),

    #[error("Longitude must be between -180, 180 degrees (value: {0})")]
    LongitudeOutOfRange(f64),

    #[error("Latitude must be between -90, 90 degrees (value: {0})")]
    LatitudeOutOfRange(f64),
}

impl From<CoordinateError> for AppError {
    fn from(err: CoordinateError) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// The same point written in every supported notation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CoordinateStrings {
    #[serde(rename = "Decimal Degrees")]
    pub decimal_degrees: String,
    #[serde(rename = "Degrees Decimal Minutes")]
    pub degrees_decimal_minutes: String,
    #[serde(rename = "Degrees Minutes Seconds")]
    pub degrees_minutes_seconds: String,
}

impl CoordinateStrings {
    pub fn get(&self, format: CoordinateFormat) -> &str {
        match format {
            CoordinateFormat::DecimalDegrees => &self.decimal_degrees,
            CoordinateFormat::DegreesDecimalMinutes => &self.degrees_decimal_minutes,
            CoordinateFormat::DegreesMinutesSeconds => &self.degrees_minutes_seconds,
        }
    }
}

/// Parse `text` in the given notation into a validated lat/lon pair
pub fn convert_to_latlon(format: CoordinateFormat, text: &str) -> Result<LatLon, CoordinateError> {
    let (latitude, longitude) = match format {
        CoordinateFormat::DecimalDegrees => parse_decimal_degrees(text)?,
        CoordinateFormat::DegreesMinutesSeconds => {
            let (north, west) = split_north_west(text);
            let lat = dms_to_degree(&north)
                .ok_or_else(|| CoordinateError::InvalidDmsNorthing(north.clone()))?;
            let lon = dms_to_degree(&west)
                .ok_or_else(|| CoordinateError::InvalidDmsWesting(west.clone()))?;
            (lat, -lon)
        }
        CoordinateFormat::DegreesDecimalMinutes => {
            let (north, west) = split_north_west(text);
            let lat = decimal_min_to_degree(&north)
                .ok_or_else(|| CoordinateError::InvalidDdmNorthing(north.clone()))?;
            let lon = decimal_min_to_degree(&west)
                .ok_or_else(|| CoordinateError::InvalidDdmWesting(west.clone()))?;
            (lat, -lon)
        }
    };

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(CoordinateError::LongitudeOutOfRange(longitude));
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(CoordinateError::LatitudeOutOfRange(latitude));
    }

    Ok(LatLon {
        lat: latitude,
        lon: longitude,
    })
}

/// Write a lat/lon pair in all three notations
pub fn convert_from_latlon(latitude: f64, longitude: f64) -> CoordinateStrings {
    let northing = if latitude >= 0.0 { 'N' } else { 'S' };
    let easting = if longitude >= 0.0 { 'E' } else { 'W' };

    let lat = DegreeParts::from_degrees(latitude);
    let lon = DegreeParts::from_degrees(longitude);

    CoordinateStrings {
        decimal_degrees: format!("{},{}", latitude, longitude),
        degrees_decimal_minutes: format!(
            "{} {} {} {} {} {}",
            lat.ddm_degrees, lat.decimal_minutes, northing, lon.ddm_degrees, lon.decimal_minutes,
            easting
        ),
        degrees_minutes_seconds: format!(
            "{} {} {} {} {} {} {} {}",
            lat.dms_degrees,
            lat.minutes,
            lat.seconds,
            northing,
            lon.dms_degrees,
            lon.minutes,
            lon.seconds,
            easting
        ),
    }
}

fn parse_decimal_degrees(text: &str) -> Result<(f64, f64), CoordinateError> {
    let text = text.trim();
    let parts: Vec<&str> = text.split(',').collect();
    if parts.len() != 2 {
        return Err(CoordinateError::InvalidDecimalDegrees(text.to_string()));
    }

    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|_| CoordinateError::InvalidNumber(text.to_string()))
    };

    Ok((parse(parts[0])?, parse(parts[1])?))
}

/// Lowercase, split on `n`, drop the `w` from the second half
fn split_north_west(text: &str) -> (String, String) {
    let lowered = text.trim().to_lowercase();
    let mut halves = lowered.splitn(2, 'n');
    let north = halves.next().unwrap_or_default().trim().to_string();
    let west = halves
        .next()
        .unwrap_or_default()
        .replace('w', "")
        .trim()
        .to_string();
    (north, west)
}

fn dms_to_degree(part: &str) -> Option<f64> {
    let tokens: Vec<&str> = part.split_whitespace().collect();
    let [d, m, s] = tokens.as_slice() else {
        return None;
    };
    let degrees = d.parse::<i32>().ok()?;
    let minutes = m.parse::<i32>().ok()?;
    let seconds = s.parse::<i32>().ok()?;
    Some(f64::from(degrees) + f64::from(minutes) / 60.0 + f64::from(seconds) / 3600.0)
}

fn decimal_min_to_degree(part: &str) -> Option<f64> {
    let tokens: Vec<&str> = part.split_whitespace().collect();
    let [d, m] = tokens.as_slice() else {
        return None;
    };
    let degrees = d.parse::<i32>().ok()?;
    let minutes = m.parse::<f64>().ok()?;
    if !minutes.is_finite() {
        return None;
    }
    Some(f64::from(degrees) + minutes / 60.0)
}

/// Unsigned degree/minute/second split; the hemisphere letter carries the sign
struct DegreeParts {
    dms_degrees: i64,
    minutes: i64,
    seconds: i64,
    ddm_degrees: i64,
    decimal_minutes: f64,
}

impl DegreeParts {
    fn from_degrees(value: f64) -> Self {
        let value = value.abs();
        let whole = value.trunc();
        let fraction = value - whole;

        let total_minutes = fraction * 60.0;
        let mut minutes = total_minutes.trunc() as i64;
        let mut seconds = ((total_minutes - total_minutes.trunc()) * 60.0).round() as i64;
        let mut dms_degrees = whole as i64;
        if seconds >= 60 {
            seconds -= 60;
            minutes += 1;
        }
        if minutes >= 60 {
            minutes -= 60;
            dms_degrees += 1;
        }

        let mut ddm_degrees = whole as i64;
        let mut decimal_minutes = round_to(total_minutes, 6);
        if decimal_minutes >= 60.0 {
            decimal_minutes = 0.0;
            ddm_degrees += 1;
        }

        Self {
            dms_degrees,
            minutes,
            seconds,
            ddm_degrees,
            decimal_minutes,
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
