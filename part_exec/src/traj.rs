//! # Trajectory
//!
//! This module defines the trajectory types consumed and produced by the
//! partition system.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use util::maths::{lerp, lerp_angle, normalise_angle};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single sample on a trajectory.
///
/// Points are produced by the planner and only ever copied or interpolated,
/// never modified in place, with the exception of the time and distance
/// rebasing done on the output trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathMotionPoint {
    /// Position in the planning frame
    pub position_m: Vector2<f64>,

    /// Heading of the vehicle body (angle to the +ve x axis)
    pub heading_rad: f64,

    /// Path curvature
    pub curv_m: f64,

    /// Rate of change of curvature with distance
    #[serde(default)]
    pub dcurv_m: f64,

    /// Distance along the trajectory
    pub s_m: f64,

    /// Speed along the path. Reverse motion may be given as a negative speed.
    pub speed_ms: f64,

    /// Acceleration along the path
    pub accel_mss: f64,

    /// Time since the start of the trajectory
    pub relative_time_s: f64,
}

/// An ordered sequence of points, with non-decreasing `s_m` and
/// `relative_time_s`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub points: Vec<PathMotionPoint>,
}

/// A run of trajectory sharing one gear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub traj: Trajectory,
    pub gear: Gear,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The drive state of the vehicle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gear {
    Drive,
    Reverse,

    /// Idle, park or neutral. No direction of travel.
    Neutral,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PathMotionPoint {
    /// Create a stationary point at the given pose.
    pub fn new(position_m: Vector2<f64>, heading_rad: f64) -> Self {
        Self {
            position_m,
            heading_rad,
            curv_m: 0.0,
            dcurv_m: 0.0,
            s_m: 0.0,
            speed_ms: 0.0,
            accel_mss: 0.0,
            relative_time_s: 0.0,
        }
    }

    /// Linearly interpolate between two points, with `ratio` in [0, 1].
    ///
    /// The heading is interpolated along the shortest arc.
    pub fn interpolate(&self, other: &Self, ratio: f64) -> Self {
        Self {
            position_m: self.position_m + (other.position_m - self.position_m) * ratio,
            heading_rad: lerp_angle(self.heading_rad, other.heading_rad, ratio),
            curv_m: lerp(self.curv_m, other.curv_m, ratio),
            dcurv_m: lerp(self.dcurv_m, other.dcurv_m, ratio),
            s_m: lerp(self.s_m, other.s_m, ratio),
            speed_ms: lerp(self.speed_ms, other.speed_ms, ratio),
            accel_mss: lerp(self.accel_mss, other.accel_mss, ratio),
            relative_time_s: lerp(self.relative_time_s, other.relative_time_s, ratio),
        }
    }

    /// Returns true if every field of the point is finite.
    pub fn is_finite(&self) -> bool {
        self.position_m.iter().all(|v| v.is_finite())
            && self.heading_rad.is_finite()
            && self.curv_m.is_finite()
            && self.dcurv_m.is_finite()
            && self.s_m.is_finite()
            && self.speed_ms.is_finite()
            && self.accel_mss.is_finite()
            && self.relative_time_s.is_finite()
    }
}

impl Trajectory {
    /// Create a new empty trajectory
    pub fn new_empty() -> Self {
        Self { points: Vec::new() }
    }

    /// Get the number of points in the trajectory
    pub fn get_num_points(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PathMotionPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PathMotionPoint> {
        self.points.last()
    }
}

impl From<Vec<PathMotionPoint>> for Trajectory {
    fn from(points: Vec<PathMotionPoint>) -> Self {
        Self { points }
    }
}

impl Segment {
    pub fn new(traj: Trajectory, gear: Gear) -> Self {
        Self { traj, gear }
    }
}

impl Gear {
    /// The direction the vehicle travels in when in this gear with the given
    /// body heading.
    ///
    /// Neutral has no direction of travel, the body heading is used.
    pub fn moving_direction(&self, heading_rad: f64) -> f64 {
        match self {
            Gear::Reverse => normalise_angle(heading_rad + std::f64::consts::PI),
            Gear::Drive | Gear::Neutral => heading_rad,
        }
    }
}
