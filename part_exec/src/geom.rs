//! # Geometry
//!
//! Oriented bounding boxes used to compare the vehicle footprint with the
//! footprint it would have at a trajectory point.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A rectangle in the plane, rotated by `heading_rad` about its centre.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Box2d {
    pub centre_m: Vector2<f64>,

    /// Angle of the length axis to the +ve x axis
    pub heading_rad: f64,

    pub length_m: f64,
    pub width_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Box2d {
    pub fn new(centre_m: Vector2<f64>, heading_rad: f64, length_m: f64, width_m: f64) -> Self {
        Self {
            centre_m,
            heading_rad,
            length_m,
            width_m,
        }
    }

    /// Unit vector along the length of the box
    pub fn length_axis(&self) -> Vector2<f64> {
        Vector2::new(self.heading_rad.cos(), self.heading_rad.sin())
    }

    /// Unit vector along the width of the box
    pub fn width_axis(&self) -> Vector2<f64> {
        Vector2::new(-self.heading_rad.sin(), self.heading_rad.cos())
    }

    /// Move the box by the given vector.
    pub fn shift(&mut self, delta_m: Vector2<f64>) {
        self.centre_m += delta_m;
    }

    /// The four corners of the box, anticlockwise from the front left.
    pub fn corners(&self) -> [Vector2<f64>; 4] {
        let half_len = self.length_axis() * (0.5 * self.length_m);
        let half_wid = self.width_axis() * (0.5 * self.width_m);

        [
            self.centre_m + half_len + half_wid,
            self.centre_m - half_len + half_wid,
            self.centre_m - half_len - half_wid,
            self.centre_m + half_len - half_wid,
        ]
    }

    /// Returns true if the two boxes overlap, touching edges included.
    ///
    /// Uses the separating axis test: two convex shapes are disjoint if and
    /// only if there's an axis, here one of the four box edge normals, onto
    /// which their projections don't overlap.
    pub fn has_overlap(&self, other: &Self) -> bool {
        let centre_diff = other.centre_m - self.centre_m;

        [
            self.length_axis(),
            self.width_axis(),
            other.length_axis(),
            other.width_axis(),
        ]
        .iter()
        .all(|axis| {
            let dist = centre_diff.dot(axis).abs();
            dist <= self.projected_radius(axis) + other.projected_radius(axis)
        })
    }

    /// Half the extent of the box when projected onto the given unit axis.
    fn projected_radius(&self, axis: &Vector2<f64>) -> f64 {
        0.5 * self.length_m * self.length_axis().dot(axis).abs()
            + 0.5 * self.width_m * self.width_axis().dot(axis).abs()
    }
}
