//! # Trajectory interpolation
//!
//! Raw planner trajectories can be sparse. Each interval between raw points is
//! split into `interpolated_pieces_num` equal pieces so that the closest-point
//! searches work on a bounded step size.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::InputError;
use crate::traj::Trajectory;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Check that a raw trajectory can be interpolated and partitioned.
///
/// The trajectory must have at least 2 points, all values must be finite and
/// both `s_m` and `relative_time_s` must be non-decreasing.
pub fn validate(raw: &Trajectory) -> Result<(), InputError> {
    if raw.get_num_points() < 2 {
        return Err(InputError::TooFewPoints(raw.get_num_points()));
    }

    if let Some(i) = raw.points.iter().position(|p| !p.is_finite()) {
        return Err(InputError::NonFinitePoint(i));
    }

    if let Some(i) = raw
        .points
        .windows(2)
        .position(|w| w[1].s_m < w[0].s_m || w[1].relative_time_s < w[0].relative_time_s)
    {
        return Err(InputError::NonMonotonic(i + 1));
    }

    Ok(())
}

/// Interpolate the raw trajectory.
///
/// Every raw point is kept, and `pieces_num - 1` points are linearly
/// interpolated between each pair of raw points. The output therefore has
/// `(n - 1) * pieces_num + 1` points and the same endpoints as the input.
pub fn interpolate(raw: &Trajectory, pieces_num: usize) -> Result<Trajectory, InputError> {
    validate(raw)?;

    let pieces_num = pieces_num.max(1);
    let mut interp = Trajectory {
        points: Vec::with_capacity((raw.get_num_points() - 1) * pieces_num + 1),
    };

    for pair in raw.points.windows(2) {
        interp.points.push(pair[0]);

        for j in 1..pieces_num {
            let ratio = j as f64 / pieces_num as f64;
            interp.points.push(pair[0].interpolate(&pair[1], ratio));
        }
    }

    // Safe to index here, validated above
    interp.points.push(raw.points[raw.get_num_points() - 1]);

    Ok(interp)
}
