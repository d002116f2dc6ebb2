//! init — policies for seeding the particle ensemble at t = 0.
//!
//! Purpose
//! -------
//! Describe how the first column of the particle ensemble is populated: either
//! by the model's initial-state sampler or by a fixed value shared by every
//! particle. The policy is resolved once during settings normalization.
//!
//! Invariants & assumptions
//! ------------------------
//! - `InitialState::Fixed(v)` always carries a finite `v`.
//! - `InitialState::FromModel` defers entirely to the model; the engine checks
//!   only the length of the returned array.
//!
//! Conventions
//! -----------
//! - String names accepted by [`FromStr`] are case-insensitive: `"model"` and
//!   `"fixed"`. Parsing `"fixed"` yields `Fixed(0.0)`; callers override the
//!   value via [`InitialState::fixed`].
use crate::filter::{
    core::validation::validate_initial_value,
    errors::{FilterError, FilterResult},
};
use std::str::FromStr;

/// Initialization policy for the particle ensemble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InitialState {
    /// Draw `N` initial states from the model's initial-state sampler.
    FromModel,
    /// Set every particle to the same fixed value.
    Fixed(f64),
}

impl InitialState {
    /// Draw initial states from the model.
    pub const fn from_model() -> Self {
        InitialState::FromModel
    }

    /// Start every particle at `value`.
    ///
    /// # Errors
    /// Returns [`FilterError::InvalidInitialValue`] if `value` is not finite.
    pub fn fixed(value: f64) -> FilterResult<Self> {
        Ok(InitialState::Fixed(validate_initial_value(value)?))
    }
}

impl FromStr for InitialState {
    type Err = FilterError;

    /// Parse an initial-state policy name (case-insensitive).
    ///
    /// Accepts `"model"` and `"fixed"`; any other value returns
    /// `FilterError::InvalidInitialPolicy`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "model" => Ok(InitialState::FromModel),
            "fixed" => Ok(InitialState::Fixed(0.0)),
            _ => Err(FilterError::InvalidInitialPolicy {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'model' or 'fixed'.",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_requires_finite_value() {
        assert_eq!(InitialState::fixed(1.5), Ok(InitialState::Fixed(1.5)));
        assert_eq!(
            InitialState::fixed(f64::INFINITY),
            Err(FilterError::InvalidInitialValue { value: f64::INFINITY })
        );
    }

    #[test]
    fn parses_policy_names_case_insensitively() {
        assert_eq!("Model".parse::<InitialState>(), Ok(InitialState::FromModel));
        assert_eq!("FIXED".parse::<InitialState>(), Ok(InitialState::Fixed(0.0)));
        assert!(matches!(
            "prior".parse::<InitialState>(),
            Err(FilterError::InvalidInitialPolicy { .. })
        ));
    }
}
