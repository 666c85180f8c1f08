//! Mass input validation for the UI edge.
//!
//! The simulation core accepts any positive radius; bounds on user-typed
//! masses are enforced here, before a request is built.

use crate::config::{MAX_BALL_RADIUS, MIN_BALL_RADIUS};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MassError {
    #[error("mass {0:?} is not an integer")]
    NotANumber(String),
    #[error("mass should be an integer {min} <= x <= {max}, got {value}")]
    OutOfRange { value: i32, min: i32, max: i32 },
}

/// Parse a user-typed mass, accepting only integers in
/// `MIN_BALL_RADIUS..=MAX_BALL_RADIUS`.
pub fn parse_mass(input: &str) -> Result<i32, MassError> {
    let value: i32 = input
        .trim()
        .parse()
        .map_err(|_| MassError::NotANumber(input.to_string()))?;
    check_mass(value)
}

pub fn check_mass(value: i32) -> Result<i32, MassError> {
    if !(MIN_BALL_RADIUS..=MAX_BALL_RADIUS).contains(&value) {
        return Err(MassError::OutOfRange {
            value,
            min: MIN_BALL_RADIUS,
            max: MAX_BALL_RADIUS,
        });
    }
    Ok(value)
}
