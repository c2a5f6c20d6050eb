//! # Gear shift synthesis
//!
//! When tracking moves from one segment to the next the gear has to change
//! before the vehicle can move again. For a configured period the output is a
//! stationary segment, held at the boundary between the two segments and
//! tagged with the new gear, followed by the new segment.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;
use serde::Serialize;

use super::{partition::PartitionList, Params};
use crate::traj::{Gear, PathMotionPoint, Segment, Trajectory};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An in-progress gear shift.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct GearShift {
    /// Index of the segment being left
    pub from_segment: usize,

    /// The gear of the segment being entered
    pub target_gear: Gear,

    /// Cycle time at which the shift started
    pub started_at_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GearShift {
    /// Start a shift out of `from_segment`, if the next segment needs a
    /// different gear.
    pub fn start(parts: &PartitionList, from_segment: usize, time_s: f64) -> Option<Self> {
        let from = parts.get(from_segment)?;
        let to = parts.get(from_segment + 1)?;

        if from.gear == to.gear {
            return None;
        }

        info!(
            "Gear shift from {:?} to {:?} started at {:.3} s",
            from.gear, to.gear, time_s
        );

        Some(Self {
            from_segment,
            target_gear: to.gear,
            started_at_s: time_s,
        })
    }

    /// The shift is complete once more than `period_s` has elapsed since it
    /// started.
    pub fn is_finished(&self, time_s: f64, period_s: f64) -> bool {
        time_s - self.started_at_s > period_s
    }

    /// The point to hold the vehicle at while shifting.
    ///
    /// On the cycle the segment change happens this is the first point of the
    /// next segment, on later cycles the last point of the segment being
    /// left. Both are the shared boundary point.
    pub fn anchor(&self, parts: &PartitionList, flag_change_to_next: bool) -> Option<PathMotionPoint> {
        let point = if flag_change_to_next {
            parts.get(self.from_segment + 1)?.traj.first()
        }
        else {
            parts.get(self.from_segment)?.traj.last()
        };

        point.copied()
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Generate the stationary gear shift segment held at `anchor`.
///
/// Points are spaced `gear_shift_unit_t_s` apart in time starting at zero,
/// with every point before `gear_shift_max_t_s`. All points have zero
/// distance, speed and acceleration, and keep the anchor's pose and
/// curvature.
pub fn generate_idle_segment(anchor: &PathMotionPoint, gear: Gear, params: &Params) -> Segment {
    let points = (0..)
        .map(|i| i as f64 * params.gear_shift_unit_t_s)
        .take_while(|t| *t < params.gear_shift_max_t_s)
        .map(|t| PathMotionPoint {
            position_m: anchor.position_m,
            heading_rad: anchor.heading_rad,
            curv_m: anchor.curv_m,
            dcurv_m: 0.0,
            s_m: 0.0,
            speed_ms: 0.0,
            accel_mss: 0.0,
            relative_time_s: t,
        })
        .collect::<Vec<_>>();

    Segment::new(Trajectory::from(points), gear)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::traj_part::partition::partition;
    use nalgebra::Vector2;

    fn params() -> Params {
        util::params::from_str(include_str!("../../../params/traj_part.toml")).unwrap()
    }

    /// Forwards along +x to (3, 0), then reversing back to (1, 0).
    fn parts() -> PartitionList {
        let xs = [0.0, 1.0, 2.0, 3.0, 2.0, 1.0];
        let points: Vec<PathMotionPoint> = xs
            .iter()
            .enumerate()
            .map(|(i, x)| {
                let mut p = PathMotionPoint::new(Vector2::new(*x, 0.0), 0.0);
                p.s_m = i as f64;
                p.relative_time_s = i as f64;
                p.curv_m = 0.01 * i as f64;
                p
            })
            .collect();

        partition(&Trajectory::from(points), 1e-6).unwrap()
    }

    #[test]
    fn test_start() {
        let parts = parts();

        let shift = GearShift::start(&parts, 0, 4.0).unwrap();
        assert_eq!(shift.target_gear, Gear::Reverse);
        assert_eq!(shift.from_segment, 0);

        // No segment to shift into
        assert!(GearShift::start(&parts, 1, 4.0).is_none());

        assert!(!shift.is_finished(5.0, 2.0));
        assert!(!shift.is_finished(6.0, 2.0));
        assert!(shift.is_finished(6.1, 2.0));
    }

    #[test]
    fn test_anchor() {
        let parts = parts();
        let shift = GearShift::start(&parts, 0, 0.0).unwrap();

        let next_first = shift.anchor(&parts, true).unwrap();
        let prev_last = shift.anchor(&parts, false).unwrap();

        assert_eq!(Some(&next_first), parts.segments()[1].traj.first());
        assert_eq!(Some(&prev_last), parts.segments()[0].traj.last());
        assert_eq!(next_first.position_m, Vector2::new(3.0, 0.0));
    }

    #[test]
    fn test_generate_idle_segment() {
        let p = params();
        let mut anchor = PathMotionPoint::new(Vector2::new(3.0, -1.0), 0.4);
        anchor.curv_m = 0.2;
        anchor.dcurv_m = 0.1;
        anchor.s_m = 12.0;
        anchor.speed_ms = 1.5;
        anchor.relative_time_s = 8.0;

        let idle = generate_idle_segment(&anchor, Gear::Reverse, &p);

        assert_eq!(idle.gear, Gear::Reverse);
        assert_eq!(idle.traj.get_num_points(), 150);

        for (i, pt) in idle.traj.points.iter().enumerate() {
            assert!((pt.relative_time_s - i as f64 * p.gear_shift_unit_t_s).abs() < 1e-12);
            assert!(pt.relative_time_s < p.gear_shift_max_t_s);
            assert_eq!(pt.position_m, anchor.position_m);
            assert_eq!(pt.heading_rad, anchor.heading_rad);
            assert_eq!(pt.curv_m, anchor.curv_m);
            assert_eq!(pt.dcurv_m, 0.0);
            assert_eq!(pt.s_m, 0.0);
            assert_eq!(pt.speed_ms, 0.0);
            assert_eq!(pt.accel_mss, 0.0);
        }

        // A unit step longer than the duration still gives one point
        let mut p = params();
        p.gear_shift_unit_t_s = 10.0;
        assert_eq!(
            generate_idle_segment(&anchor, Gear::Drive, &p).traj.get_num_points(),
            1
        );
    }
}
