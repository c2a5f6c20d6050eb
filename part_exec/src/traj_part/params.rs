//! Trajectory partition parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Upper limit on `interpolated_pieces_num`.
pub const MAX_INTERPOLATED_PIECES: usize = 1000;

/// Upper limit on the number of points in a generated gear shift segment.
pub const MAX_GEAR_SHIFT_POINTS: usize = 10_000;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for trajectory partitioning
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Params {

    /// Number of pieces each interval of the raw trajectory is split into
    /// during interpolation.
    pub interpolated_pieces_num: usize,

    /// Consecutive points closer together than this have no direction of
    /// travel, and so never start a new segment.
    pub stationary_step_m: f64,

    /// Maximum distance between the vehicle and a trajectory point for the
    /// point to be considered during tracking. Also bounds the window of
    /// points searched either side of the previously tracked point.
    pub distance_search_range_m: f64,

    /// Maximum heading difference between the vehicle and a trajectory point
    /// while acquiring the trajectory.
    pub heading_search_range_rad: f64,

    /// Maximum heading difference between the vehicle and a trajectory point
    /// once the trajectory is being tracked, and when checking for the end
    /// of a segment. Must not exceed `heading_search_range_rad`.
    pub heading_track_range_rad: f64,

    /// The tracked point must be at least this close to the end of the
    /// segment for the end to be considered reached.
    pub distance_to_midpoint_m: f64,

    /// The fail-safe search is rejected if the closest point on the whole
    /// trajectory is further than this from the vehicle.
    pub failsafe_distance_ceiling_m: f64,

    /// Duration of the stationary segment generated for a gear shift.
    pub gear_shift_max_t_s: f64,

    /// Time step between points of the gear shift segment.
    pub gear_shift_unit_t_s: f64,

    /// Time the vehicle is held at a gear change boundary before tracking
    /// resumes on the new segment.
    pub gear_shift_period_duration_s: f64
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("Interpolated pieces num must be at least 1")]
    ZeroInterpolatedPieces,

    #[error("Interpolated pieces num must be at most {}, found {0}", MAX_INTERPOLATED_PIECES)]
    TooManyInterpolatedPieces(usize),

    #[error(
        "Gear shift segment would have {0:.0} points, at most {} are allowed",
        MAX_GEAR_SHIFT_POINTS
    )]
    TooManyGearShiftPoints(f64),

    #[error("Parameter `{0}` must be positive and finite, found {1}")]
    NotPositive(&'static str, f64),

    #[error(
        "Heading track range ({track}) must not exceed heading search range ({search})"
    )]
    TrackRangeExceedsSearchRange { track: f64, search: f64 },

    #[error(
        "Fail-safe distance ceiling ({ceiling}) must not be less than the distance search range \
        ({search})"
    )]
    CeilingBelowSearchRange { ceiling: f64, search: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check the parameters are consistent.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.interpolated_pieces_num == 0 {
            return Err(ParamsError::ZeroInterpolatedPieces);
        }

        if self.interpolated_pieces_num > MAX_INTERPOLATED_PIECES {
            return Err(ParamsError::TooManyInterpolatedPieces(
                self.interpolated_pieces_num,
            ));
        }

        for (name, value) in [
            ("distance_search_range_m", self.distance_search_range_m),
            ("heading_search_range_rad", self.heading_search_range_rad),
            ("heading_track_range_rad", self.heading_track_range_rad),
            ("distance_to_midpoint_m", self.distance_to_midpoint_m),
            ("failsafe_distance_ceiling_m", self.failsafe_distance_ceiling_m),
            ("gear_shift_max_t_s", self.gear_shift_max_t_s),
            ("gear_shift_unit_t_s", self.gear_shift_unit_t_s),
        ]
        .iter()
        {
            if !(value.is_finite() && *value > 0.0) {
                return Err(ParamsError::NotPositive(*name, *value));
            }
        }

        let gear_shift_points = (self.gear_shift_max_t_s / self.gear_shift_unit_t_s).ceil();
        if gear_shift_points > MAX_GEAR_SHIFT_POINTS as f64 {
            return Err(ParamsError::TooManyGearShiftPoints(gear_shift_points));
        }

        // Zero is allowed for these, a zero period holds the vehicle for a
        // single cycle
        if !(self.stationary_step_m.is_finite() && self.stationary_step_m >= 0.0) {
            return Err(ParamsError::NotPositive(
                "stationary_step_m",
                self.stationary_step_m,
            ));
        }
        if !(self.gear_shift_period_duration_s.is_finite()
            && self.gear_shift_period_duration_s >= 0.0)
        {
            return Err(ParamsError::NotPositive(
                "gear_shift_period_duration_s",
                self.gear_shift_period_duration_s,
            ));
        }

        if self.heading_track_range_rad > self.heading_search_range_rad {
            return Err(ParamsError::TrackRangeExceedsSearchRange {
                track: self.heading_track_range_rad,
                search: self.heading_search_range_rad,
            });
        }

        if self.failsafe_distance_ceiling_m < self.distance_search_range_m {
            return Err(ParamsError::CeilingBelowSearchRange {
                ceiling: self.failsafe_distance_ceiling_m,
                search: self.distance_search_range_m,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn params() -> Params {
        util::params::from_str(include_str!("../../../params/traj_part.toml")).unwrap()
    }

    #[test]
    fn test_shipped_params_valid() {
        let p = params();
        assert!(p.validate().is_ok());
        assert_eq!(p.interpolated_pieces_num, 50);
    }

    #[test]
    fn test_validate() {
        let mut p = params();
        p.interpolated_pieces_num = 0;
        assert!(matches!(
            p.validate(),
            Err(ParamsError::ZeroInterpolatedPieces)
        ));

        let mut p = params();
        p.interpolated_pieces_num = MAX_INTERPOLATED_PIECES + 1;
        assert!(matches!(
            p.validate(),
            Err(ParamsError::TooManyInterpolatedPieces(1001))
        ));

        let mut p = params();
        p.gear_shift_unit_t_s = 1e-9;
        assert!(matches!(
            p.validate(),
            Err(ParamsError::TooManyGearShiftPoints(_))
        ));

        // Exactly at the limit is accepted
        let mut p = params();
        p.gear_shift_max_t_s = 2500.0;
        p.gear_shift_unit_t_s = 0.25;
        assert!(p.validate().is_ok());

        let mut p = params();
        p.gear_shift_unit_t_s = -0.1;
        assert!(matches!(
            p.validate(),
            Err(ParamsError::NotPositive("gear_shift_unit_t_s", _))
        ));

        let mut p = params();
        p.heading_track_range_rad = p.heading_search_range_rad + 0.1;
        assert!(matches!(
            p.validate(),
            Err(ParamsError::TrackRangeExceedsSearchRange { .. })
        ));

        let mut p = params();
        p.failsafe_distance_ceiling_m = 1.0;
        assert!(matches!(
            p.validate(),
            Err(ParamsError::CeilingBelowSearchRange { .. })
        ));

        let mut p = params();
        p.gear_shift_period_duration_s = 0.0;
        assert!(p.validate().is_ok());
    }
}
