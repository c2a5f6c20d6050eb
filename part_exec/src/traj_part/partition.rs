//! # Trajectory partitioning
//!
//! Splits an interpolated trajectory into maximal runs which share a direction
//! of travel. The direction of each step is found by comparing the
//! displacement between consecutive points with the body heading of the
//! second point: within a quarter turn is forwards, otherwise backwards.
//!
//! Neighbouring segments share their boundary point, so the last point of one
//! segment is the first point of the next.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info};
use std::f64::consts::FRAC_PI_2;

use super::InputError;
use crate::traj::{Gear, PathMotionPoint, Segment, Trajectory};
use util::maths::get_ang_dist_2pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The ordered segments covering one whole trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionList {
    segments: Vec<Segment>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PartitionList {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Join the segments back into a single trajectory, dropping the
    /// duplicated boundary points.
    pub fn concatenate(&self) -> Trajectory {
        let mut traj = Trajectory::new_empty();

        for (i, seg) in self.segments.iter().enumerate() {
            let skip = if i == 0 { 0 } else { 1 };
            traj.points.extend(seg.traj.points.iter().skip(skip));
        }

        traj
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Partition the trajectory into segments of constant gear.
///
/// Steps shorter than `stationary_step_m` carry no direction and stay in the
/// current segment. A trajectory made up only of such steps becomes a single
/// `Neutral` segment.
pub fn partition(
    traj: &Trajectory,
    stationary_step_m: f64,
) -> Result<PartitionList, InputError> {
    if traj.get_num_points() < 2 {
        return Err(InputError::TooFewPoints(traj.get_num_points()));
    }

    // The first step with a direction decides the starting gear
    let mut gear = traj
        .points
        .windows(2)
        .find_map(|w| step_gear(&w[0], &w[1], stationary_step_m))
        .unwrap_or(Gear::Neutral);

    let mut segments = Vec::new();
    let mut current = vec![traj.points[0]];

    for pair in traj.points.windows(2) {
        let step = step_gear(&pair[0], &pair[1], stationary_step_m).unwrap_or(gear);

        // Direction flip, close the current run at the shared boundary point
        if step != gear {
            let run = std::mem::replace(&mut current, vec![pair[0]]);
            segments.push(Segment::new(run.into(), gear));
            gear = step;
        }

        current.push(pair[1]);
    }
    segments.push(Segment::new(current.into(), gear));

    info!(
        "Trajectory of {} points partitioned into {} segments",
        traj.get_num_points(),
        segments.len()
    );
    for (i, seg) in segments.iter().enumerate() {
        debug!(
            "    Segment {}: {:?}, {} points",
            i,
            seg.gear,
            seg.traj.get_num_points()
        );
    }

    Ok(PartitionList { segments })
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// The gear needed to move from `from` to `to`, or `None` if the step is too
/// short to have a direction.
fn step_gear(from: &PathMotionPoint, to: &PathMotionPoint, stationary_step_m: f64) -> Option<Gear> {
    let disp = to.position_m - from.position_m;

    if disp.norm() <= stationary_step_m {
        return None;
    }

    let tracking_rad = disp.y.atan2(disp.x);

    if get_ang_dist_2pi(to.heading_rad, tracking_rad).abs() < FRAC_PI_2 {
        Some(Gear::Drive)
    }
    else {
        Some(Gear::Reverse)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Vector2;

    /// A trajectory driving forwards along +x, then reversing along the
    /// direction `reverse_rad + pi` while facing `reverse_rad`.
    fn v_shape(num_fwd: usize, num_rev: usize, reverse_rad: f64) -> Trajectory {
        let mut points = Vec::new();
        for i in 0..num_fwd {
            let mut p = PathMotionPoint::new(Vector2::new(i as f64, 0.0), 0.0);
            p.s_m = i as f64;
            p.relative_time_s = i as f64;
            points.push(p);
        }

        let apex = Vector2::new((num_fwd - 1) as f64, 0.0);
        let dir = Vector2::new(reverse_rad.cos(), reverse_rad.sin());
        for k in 1..=num_rev {
            let mut p = PathMotionPoint::new(apex - dir * k as f64, reverse_rad);
            p.s_m = (num_fwd - 1 + k) as f64;
            p.relative_time_s = p.s_m;
            points.push(p);
        }

        points.into()
    }

    #[test]
    fn test_partition_v_shape() {
        let traj = v_shape(10, 10, 0.5);
        let parts = partition(&traj, 1e-6).unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts.segments()[0].gear, Gear::Drive);
        assert_eq!(parts.segments()[1].gear, Gear::Reverse);

        // The apex is shared
        assert_eq!(parts.segments()[0].traj.get_num_points(), 10);
        assert_eq!(parts.segments()[1].traj.get_num_points(), 11);
        assert_eq!(
            parts.segments()[0].traj.last(),
            parts.segments()[1].traj.first()
        );

        // Round trip
        assert_eq!(parts.concatenate(), traj);
    }

    #[test]
    fn test_partition_multi_manoeuvre() {
        // Forwards, backwards, forwards again
        let mut traj = v_shape(5, 5, 0.3);
        let last = *traj.last().unwrap();
        for k in 1..=5 {
            let mut p = last;
            p.position_m += Vector2::new(0.3f64.cos(), 0.3f64.sin()) * k as f64;
            p.s_m += k as f64;
            p.relative_time_s += k as f64;
            traj.points.push(p);
        }

        let parts = partition(&traj, 1e-6).unwrap();
        let gears: Vec<Gear> = parts.segments().iter().map(|s| s.gear).collect();
        assert_eq!(gears, vec![Gear::Drive, Gear::Reverse, Gear::Drive]);

        // Neighbouring segments never share a gear
        for w in parts.segments().windows(2) {
            assert_ne!(w[0].gear, w[1].gear);
        }

        assert_eq!(parts.concatenate(), traj);
    }

    #[test]
    fn test_partition_stationary() {
        // Stationary steps join the current run
        let mut traj = v_shape(4, 0, 0.0);
        let last = *traj.last().unwrap();
        traj.points.push(last);
        traj.points.push(last);
        let parts = partition(&traj, 1e-6).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts.segments()[0].gear, Gear::Drive);

        // No motion at all is neutral
        let p = PathMotionPoint::new(Vector2::new(1.0, 1.0), 0.2);
        let parts = partition(&Trajectory::from(vec![p, p, p]), 1e-6).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts.segments()[0].gear, Gear::Neutral);

        assert!(matches!(
            partition(&Trajectory::from(vec![p]), 1e-6),
            Err(InputError::TooFewPoints(1))
        ));
    }
}
