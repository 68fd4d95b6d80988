//! Sky positions and angular radii.

use std::fmt;
use std::str::FromStr;

use qtty::{Arcminutes, Degree, Degrees};

use crate::error::QueryError;

/// ICRS direction in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyPosition {
    ra: Degrees,
    dec: Degrees,
}

impl SkyPosition {
    /// Build a position, validating `0 <= ra < 360` and `-90 <= dec <= 90`.
    pub fn new(ra: Degrees, dec: Degrees) -> Result<Self, QueryError> {
        if !ra.value().is_finite() || !(0.0..360.0).contains(&ra.value()) {
            return Err(QueryError::invalid_query(format!(
                "right ascension {} deg is outside [0, 360)",
                ra.value()
            )));
        }
        if !dec.value().is_finite() || !(-90.0..=90.0).contains(&dec.value()) {
            return Err(QueryError::invalid_query(format!(
                "declination {} deg is outside [-90, 90]",
                dec.value()
            )));
        }
        Ok(Self { ra, dec })
    }

    pub fn from_degrees(ra: f64, dec: f64) -> Result<Self, QueryError> {
        Self::new(Degrees::new(ra), Degrees::new(dec))
    }

    pub fn ra(&self) -> Degrees {
        self.ra
    }

    pub fn dec(&self) -> Degrees {
        self.dec
    }
}

impl fmt::Display for SkyPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ra.value(), self.dec.value())
    }
}

impl FromStr for SkyPosition {
    type Err = QueryError;

    /// Parse `"ra dec"` (or `"ra, dec"`) in decimal degrees.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();

        let [ra, dec] = parts.as_slice() else {
            return Err(QueryError::parse(format!(
                "expected 'ra dec' in decimal degrees, got '{}'",
                s
            )));
        };

        let ra: f64 = ra
            .parse()
            .map_err(|_| QueryError::parse(format!("invalid right ascension '{}'", ra)))?;
        let dec: f64 = dec
            .parse()
            .map_err(|_| QueryError::parse(format!("invalid declination '{}'", dec)))?;
        Self::from_degrees(ra, dec)
    }
}

/// Search radius given in arcminutes, converted to degrees for ADQL.
pub fn arcmin_to_degrees(radius: f64) -> Degrees {
    Arcminutes::new(radius).to::<Degree>()
}
