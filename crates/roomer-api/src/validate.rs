//! Boundary validation helpers
//!
//! Field-level checks shared by the handlers. Each helper returns the
//! client-facing message for its failure so handlers stay declarative.

use lazy_static::lazy_static;
use regex::Regex;
use roomer_core::{RoomerError, Result};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[a-zA-Z0-9.-]+@[a-zA-Z0-9]+\.[a-zA-Z]+$").unwrap();
}

/// Validate the email format.
pub fn email(value: &str) -> Result<()> {
    if !EMAIL_RE.is_match(value) {
        return Err(RoomerError::InvalidFormat(
            "Email: incorrect format".to_string(),
        ));
    }
    Ok(())
}

/// Reject blank (empty or whitespace-only) strings.
pub fn non_blank(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RoomerError::InvalidFormat(message.to_string()));
    }
    Ok(())
}

/// Reject non-positive prices.
pub fn positive_price(value: f64, message: &str) -> Result<()> {
    if !(value > 0.0) {
        return Err(RoomerError::InvalidFormat(message.to_string()));
    }
    Ok(())
}

/// Validate a latitude/longitude pair: exactly two finite numbers.
pub fn coordinates(value: &[f64]) -> Result<[f64; 2]> {
    if value.len() == 2 && value.iter().all(|c| c.is_finite()) {
        Ok([value[0], value[1]])
    } else {
        Err(RoomerError::InvalidFormat(
            "Wrong parameters lat/lng".to_string(),
        ))
    }
}
