//! # Trajectory partition library.
//!
//! This library allows other crates in the workspace, and the benchmarks, to access items defined
//! inside the partition crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Trajectory module - points, trajectories, segments and gears
pub mod traj;

/// Geometry module - oriented boxes and overlap checks
pub mod geom;

/// Vehicle module - vehicle geometry, state and footprint
pub mod vehicle;

/// Trajectory partition module - splits the planned trajectory by gear and tracks the vehicle
/// along it
pub mod traj_part;

/// Replay module - runs recorded cycles through trajectory partition
pub mod replay;
