//! # Vehicle module
//!
//! Provides the vehicle's static geometry and current state, and derives the
//! ego frame (pose and footprint) used when locating the vehicle on a
//! trajectory.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::{geom::Box2d, traj::Gear};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Static vehicle geometry.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
pub struct VehicleParams {
    /// Length of the vehicle body
    pub length_m: f64,

    /// Width of the vehicle body
    pub width_m: f64,

    /// Distance from the rear edge of the body to the rear axle centre, which
    /// is the reference point of the vehicle pose.
    pub back_edge_to_center_m: f64,
}

/// The current state of the vehicle, as reported by localisation and the
/// chassis.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Position of the rear axle centre in the planning frame
    pub position_m: Vector2<f64>,

    /// Heading of the vehicle body (angle to the +ve x axis)
    pub heading_rad: f64,

    /// Current gear reported by the chassis
    pub gear: Gear,
}

/// The pose and footprint of the vehicle for this cycle.
#[derive(Debug, Copy, Clone, Serialize)]
pub struct EgoFrame {
    pub position_m: Vector2<f64>,

    pub heading_rad: f64,

    /// The direction the vehicle is moving in given its current gear
    pub moving_direction_rad: f64,

    /// Footprint of the vehicle body
    pub bbox: Box2d,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum VehicleParamsError {
    #[error("Vehicle length and width must be positive, found {0} x {1}")]
    InvalidDimensions(f64, f64),

    #[error("Rear axle offset must lie within the vehicle length, found {0}")]
    InvalidAxleOffset(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VehicleParams {
    /// Check that the geometry describes a physical vehicle.
    pub fn validate(&self) -> Result<(), VehicleParamsError> {
        if !(self.length_m > 0.0 && self.width_m > 0.0)
            || !self.length_m.is_finite()
            || !self.width_m.is_finite()
        {
            return Err(VehicleParamsError::InvalidDimensions(
                self.length_m,
                self.width_m,
            ));
        }

        if !(0.0..=self.length_m).contains(&self.back_edge_to_center_m) {
            return Err(VehicleParamsError::InvalidAxleOffset(
                self.back_edge_to_center_m,
            ));
        }

        Ok(())
    }

    /// Distance from the rear axle centre forwards to the centre of the body.
    pub fn shift_distance_m(&self) -> f64 {
        0.5 * self.length_m - self.back_edge_to_center_m
    }

    /// The footprint of the vehicle when its rear axle is at the given pose.
    pub fn footprint(&self, position_m: Vector2<f64>, heading_rad: f64) -> Box2d {
        let mut bbox = Box2d::new(position_m, heading_rad, self.length_m, self.width_m);
        bbox.shift(self.shift_distance_m() * bbox.length_axis());
        bbox
    }
}

impl VehicleState {
    pub fn is_finite(&self) -> bool {
        self.position_m.iter().all(|v| v.is_finite()) && self.heading_rad.is_finite()
    }
}

impl EgoFrame {
    /// Build the ego frame from the current vehicle state and geometry.
    pub fn new(state: &VehicleState, params: &VehicleParams) -> Self {
        Self {
            position_m: state.position_m,
            heading_rad: state.heading_rad,
            moving_direction_rad: state.gear.moving_direction(state.heading_rad),
            bbox: params.footprint(state.position_m, state.heading_rad),
        }
    }
}
