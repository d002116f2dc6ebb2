//! models — the ABC particle filter engine and the model interface it drives.
//!
//! Purpose
//! -------
//! Sequence the building blocks from `filter::core` into a complete filter
//! run against a user-supplied state-space model.
//!
//! Key behaviors
//! -------------
//! - [`StateSpaceModel`] names the three simulation capabilities the filter
//!   needs (initial draw, transition, observation proxies) plus the horizon.
//! - [`AbcParticleFilter`] owns validated [`FilterOptions`] and runs the time
//!   loop, returning a [`FilterOutput`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Models are trusted only as far as the engine checks them: output lengths
//!   and proxy finiteness are verified at every step.
//! - A run is single-threaded and owns all of its arrays.
//!
//! Downstream usage
//! ----------------
//! - Implement [`StateSpaceModel`] for the model at a fixed parameter value,
//!   build an [`AbcParticleFilter`] from [`FilterSettings`] or
//!   [`FilterOptions`], and call `run(&model, observations)`.
//! - For repeated evaluation over parameter vectors use
//!   `optimization::objective::AbcObjective`.
//!
//! [`FilterOptions`]: crate::filter::core::FilterOptions
//! [`FilterSettings`]: crate::filter::core::FilterSettings
//! [`FilterOutput`]: crate::filter::core::FilterOutput

pub mod abc_filter;
pub mod traits;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::abc_filter::AbcParticleFilter;
pub use self::traits::{ObservationProxies, StateSpaceModel};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::abc_filter::AbcParticleFilter;
    pub use super::traits::{ObservationProxies, StateSpaceModel};
}
