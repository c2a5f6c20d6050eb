//! # Trajectory partition module
//!
//! Trajectory partition takes the raw trajectory from the planner and the
//! current state of the vehicle, and each cycle produces the trajectory the
//! vehicle should follow next, together with the gear to follow it in.
//!
//! Processing on each cycle:
//!  1. The raw trajectory is validated and interpolated.
//!  1. If the trajectory differs from the last one it is partitioned into
//!     segments of constant gear, and tracking starts again.
//!  1. The vehicle is located on the current segment, moving on to the next
//!     segment once the end of the current one is reached.
//!  1. If the gear needs to change a stationary gear shift trajectory is
//!     placed before the next segment.
//!  1. The output is rebased so it starts at zero time and distance.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod gear_shift;
pub mod interp;
pub mod locate;
mod params;
pub mod partition;
pub mod rebase;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

use crate::vehicle::VehicleParamsError;
use util::params::LoadError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during trajectory partition.
#[derive(Debug, thiserror::Error)]
pub enum TrajPartError {
    #[error("Could not load the parameters: {0}")]
    ParamLoadError(LoadError),

    #[error("Invalid configuration: {0}")]
    ConfigurationError(ConfigError),

    #[error("Invalid input trajectory: {0}")]
    InvalidInput(InputError),

    #[error("Localisation failure: {0}")]
    LocalisationFailure(LocError),
}

/// Errors in the module or vehicle parameters.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    Params(ParamsError),

    #[error("{0}")]
    Vehicle(VehicleParamsError),
}

/// Reasons an input trajectory is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("Expected at least 2 points, found {0}")]
    TooFewPoints(usize),

    #[error("Point {0} contains a non-finite value")]
    NonFinitePoint(usize),

    #[error("Distance or time decreases at point {0}")]
    NonMonotonic(usize),

    #[error("Vehicle position or heading is not finite")]
    NonFiniteVehicleState,

    #[error("Cycle time is not finite")]
    NonFiniteTime,
}

/// Reasons the vehicle could not be located on the trajectory.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocError {
    #[error("There are no trajectory segments to search")]
    NoPartitions,

    #[error(
        "The closest trajectory point is {distance_m:.3} m away, beyond the fail-safe ceiling of \
        {ceiling_m:.3} m"
    )]
    BeyondCeiling { distance_m: f64, ceiling_m: f64 },
}
