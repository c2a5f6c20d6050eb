//! # Vehicle location on the partitioned trajectory
//!
//! The vehicle is normally located with a local search over a window of the
//! current segment around the previously tracked point. When that finds no
//! point within tolerance, for example on the first cycle, after a jump in
//! localisation or when the vehicle has drifted off the trajectory, a
//! fail-safe search over every point of every segment is used instead.
//!
//! Once located, the vehicle has reached the end of its segment when the
//! tracked point is close to the final point, the vehicle footprint overlaps
//! the footprint it would have at the final point, and the heading error to
//! the final point is within the tracking range.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info, trace, warn};
use ordered_float::OrderedFloat;
use serde::Serialize;

use super::{partition::PartitionList, LocError, Params};
use crate::{
    traj::{Gear, PathMotionPoint, Segment},
    vehicle::{EgoFrame, VehicleParams},
};
use util::maths::get_ang_dist_2pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The last known location of the vehicle within the partition list.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingState {
    pub segment_index: usize,
    pub point_index: usize,
    pub phase: TrackingPhase,
}

/// A trajectory point compared against the vehicle.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct PointMatch {
    pub segment_index: usize,
    pub point_index: usize,

    /// Distance from the vehicle to the point
    pub distance_m: f64,

    /// Absolute difference between the direction of travel at the point and
    /// the vehicle's direction of travel
    pub heading_err_rad: f64,
}

/// Distance and heading limits a point must be within to be tracked.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tolerance {
    pub distance_m: f64,
    pub heading_rad: f64,
}

/// The result of locating the vehicle for one cycle.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct LocateOutcome {
    /// The point the vehicle was located at, before any advance to the next
    /// segment.
    pub matched: PointMatch,

    pub method: LocateMethod,

    /// Set if the end of the matched segment was reached
    pub end_reached: Option<EndReached>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How far along acquiring the trajectory the tracker is.
///
/// The local search uses the acquisition heading range while `Acquiring` and
/// the tighter tracking heading range once `Tracking`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum TrackingPhase {
    /// No location yet, the next cycle must use the fail-safe search.
    Unlocalised,

    /// Located by the fail-safe search, or just moved onto a new segment.
    Acquiring,

    /// Located by the local search.
    Tracking,
}

/// How the vehicle was located on a cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum LocateMethod {
    Tracking,
    FailSafe,

    /// Location was not run, the vehicle is held at a segment boundary
    /// while the gear shifts.
    HeldForGearShift,
}

/// What happened when the end of a segment was reached.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum EndReached {
    /// Tracking moved to the start of the next segment.
    NextSegment,

    /// The end of the final segment was reached.
    Destination,
}

/// The reason a point was outside tolerance.
///
/// Distance is checked first, so a point failing both checks is reported as a
/// distance rejection.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Rejection {
    Distance,
    Heading,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for TrackingState {
    fn default() -> Self {
        Self {
            segment_index: 0,
            point_index: 0,
            phase: TrackingPhase::Unlocalised,
        }
    }
}

impl PointMatch {
    /// Compare the given point of a segment with the vehicle.
    pub fn new(
        segment_index: usize,
        point_index: usize,
        point: &PathMotionPoint,
        gear: Gear,
        ego: &EgoFrame,
    ) -> Self {
        Self {
            segment_index,
            point_index,
            distance_m: (point.position_m - ego.position_m).norm(),
            heading_err_rad: heading_error(point, gear, ego),
        }
    }
}

impl Tolerance {
    /// Check a distance and heading error against the tolerance.
    ///
    /// Both limits are strict, a value equal to the limit is rejected.
    pub fn check(&self, distance_m: f64, heading_err_rad: f64) -> Result<(), Rejection> {
        if !(distance_m < self.distance_m) {
            Err(Rejection::Distance)
        }
        else if !(heading_err_rad < self.heading_rad) {
            Err(Rejection::Heading)
        }
        else {
            Ok(())
        }
    }

    /// Tolerance for the local search in the given phase.
    pub fn for_phase(phase: TrackingPhase, params: &Params) -> Self {
        Self {
            distance_m: params.distance_search_range_m,
            heading_rad: match phase {
                TrackingPhase::Tracking => params.heading_track_range_rad,
                TrackingPhase::Unlocalised | TrackingPhase::Acquiring => {
                    params.heading_search_range_rad
                }
            },
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Locate the vehicle, updating the tracking state.
///
/// The local search is tried first, falling back to the fail-safe search if
/// no point is within tolerance. If the end of the segment has been reached
/// tracking moves to the start of the next segment.
pub fn locate(
    parts: &PartitionList,
    tracking: &mut TrackingState,
    ego: &EgoFrame,
    vehicle: &VehicleParams,
    params: &Params,
) -> Result<LocateOutcome, LocError> {
    let local = match tracking.phase {
        TrackingPhase::Unlocalised => None,
        _ => locate_local(parts, tracking, ego, params),
    };

    let (matched, method) = match local {
        Some(m) => (m, LocateMethod::Tracking),
        None => {
            if tracking.phase != TrackingPhase::Unlocalised {
                warn!(
                    "No point within tolerance near segment {} point {}, using fail-safe search",
                    tracking.segment_index, tracking.point_index
                );
            }
            let m = locate_failsafe(parts, ego, params)?;
            info!(
                "Fail-safe search located vehicle at segment {} point {} ({:.3} m)",
                m.segment_index, m.point_index, m.distance_m
            );
            (m, LocateMethod::FailSafe)
        }
    };

    tracking.segment_index = matched.segment_index;
    tracking.point_index = matched.point_index;
    tracking.phase = match method {
        LocateMethod::Tracking => TrackingPhase::Tracking,
        _ => TrackingPhase::Acquiring,
    };

    // Matches always index into the partition list
    let seg = match parts.get(matched.segment_index) {
        Some(s) => s,
        None => return Err(LocError::NoPartitions),
    };

    let end_reached = if check_reach_end(seg, &matched, ego, vehicle, params) {
        if matched.segment_index + 1 < parts.len() {
            tracking.segment_index += 1;
            tracking.point_index = 0;
            tracking.phase = TrackingPhase::Acquiring;
            info!(
                "Reached end of segment {}, changing to segment {} of {}",
                matched.segment_index,
                tracking.segment_index,
                parts.len()
            );
            Some(EndReached::NextSegment)
        }
        else {
            tracking.point_index = seg.traj.get_num_points() - 1;
            info!("Reached end of final segment {}", matched.segment_index);
            Some(EndReached::Destination)
        }
    }
    else {
        None
    };

    debug!(
        "Located by {:?} at segment {} point {}, distance {:.3} m, heading error {:.3} rad",
        method,
        tracking.segment_index,
        tracking.point_index,
        matched.distance_m,
        matched.heading_err_rad
    );

    Ok(LocateOutcome {
        matched,
        method,
        end_reached,
    })
}

/// Search for the closest in-tolerance point in the current segment.
///
/// Only points whose distance along the trajectory from the previously
/// tracked point is within the distance search range are considered. Returns
/// `None` if no point in that window is within tolerance.
pub fn locate_local(
    parts: &PartitionList,
    tracking: &TrackingState,
    ego: &EgoFrame,
    params: &Params,
) -> Option<PointMatch> {
    let seg = parts.get(tracking.segment_index)?;
    let points = &seg.traj.points;
    if points.is_empty() {
        return None;
    }

    let prev = tracking.point_index.min(points.len() - 1);
    let prev_s_m = points[prev].s_m;
    let range_m = params.distance_search_range_m;
    let in_window = |j: &usize| (points[*j].s_m - prev_s_m).abs() <= range_m;

    let start = (0..=prev).rev().take_while(in_window).last().unwrap_or(prev);
    let end = (prev..points.len()).take_while(in_window).last().unwrap_or(prev);

    let tolerance = Tolerance::for_phase(tracking.phase, params);

    closest((start..=end).filter_map(|j| {
        let m = PointMatch::new(tracking.segment_index, j, &points[j], seg.gear, ego);
        match tolerance.check(m.distance_m, m.heading_err_rad) {
            Ok(()) => Some(m),
            Err(r) => {
                trace!("Point {} rejected on {:?}", j, r);
                None
            }
        }
    }))
}

/// Search every point of every segment for the one closest to the vehicle.
///
/// Only points whose direction of travel is within the heading search range
/// of the vehicle's are considered, so that a vehicle reversing back over a
/// forward leg is located on the reverse leg. If no point passes the heading
/// check the closest point by distance alone is used.
///
/// Ties go to the earliest segment and point. Fails if the list is empty or
/// the chosen point is not within the fail-safe ceiling of the vehicle.
pub fn locate_failsafe(
    parts: &PartitionList,
    ego: &EgoFrame,
    params: &Params,
) -> Result<PointMatch, LocError> {
    let ceiling_m = params.failsafe_distance_ceiling_m;
    let candidates = || {
        parts.segments().iter().enumerate().flat_map(move |(i, seg)| {
            seg.traj
                .points
                .iter()
                .enumerate()
                .map(move |(j, p)| PointMatch::new(i, j, p, seg.gear, ego))
        })
    };

    let gated = closest(
        candidates().filter(|m| m.heading_err_rad < params.heading_search_range_rad),
    );

    let best = match gated {
        Some(m) => m,
        None => {
            debug!("No point within the heading search range, using distance only");
            closest(candidates()).ok_or(LocError::NoPartitions)?
        }
    };

    // NaN distances fail this check
    if !(best.distance_m <= ceiling_m) {
        return Err(LocError::BeyondCeiling {
            distance_m: best.distance_m,
            ceiling_m,
        });
    }

    Ok(best)
}

/// Check whether the vehicle, located at `matched`, has reached the end of
/// the segment.
pub fn check_reach_end(
    seg: &Segment,
    matched: &PointMatch,
    ego: &EgoFrame,
    vehicle: &VehicleParams,
    params: &Params,
) -> bool {
    let (end, closest) = match (seg.traj.last(), seg.traj.points.get(matched.point_index)) {
        (Some(e), Some(c)) => (e, c),
        _ => return false,
    };

    if (end.position_m - closest.position_m).norm() >= params.distance_to_midpoint_m {
        return false;
    }

    // The body heading at the point is the same whichever gear the segment is
    // in, only the direction of travel flips
    let stop_box = vehicle.footprint(end.position_m, end.heading_rad);
    if !ego.bbox.has_overlap(&stop_box) {
        trace!("Near segment end but footprints don't overlap");
        return false;
    }

    heading_error(end, seg.gear, ego) < params.heading_track_range_rad
}

/// Absolute difference between the direction of travel at a point and the
/// direction of travel of the vehicle.
pub fn heading_error(point: &PathMotionPoint, gear: Gear, ego: &EgoFrame) -> f64 {
    get_ang_dist_2pi(gear.moving_direction(point.heading_rad), ego.moving_direction_rad).abs()
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// The closest of the candidates, with the first seen winning ties.
fn closest<I>(candidates: I) -> Option<PointMatch>
where
    I: Iterator<Item = PointMatch>,
{
    candidates.min_by_key(|m| OrderedFloat(m.distance_m))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        traj::{Segment, Trajectory},
        traj_part::partition::partition,
        vehicle::VehicleState,
    };
    use nalgebra::Vector2;

    fn params() -> Params {
        util::params::from_str(include_str!("../../../params/traj_part.toml")).unwrap()
    }

    fn vehicle() -> VehicleParams {
        util::params::from_str(include_str!("../../../params/vehicle.toml")).unwrap()
    }

    fn ego(x: f64, y: f64, heading_rad: f64, gear: Gear) -> EgoFrame {
        EgoFrame::new(
            &VehicleState {
                position_m: Vector2::new(x, y),
                heading_rad,
                gear,
            },
            &vehicle(),
        )
    }

    /// Forward along +x from 0 to 10 m, then reversing back along +x towards
    /// 5 m, both at 0.1 m spacing.
    fn parts() -> PartitionList {
        let mut points = Vec::new();
        for i in 0..=100 {
            let mut p = PathMotionPoint::new(Vector2::new(0.1 * i as f64, 0.0), 0.0);
            p.s_m = 0.1 * i as f64;
            points.push(p);
        }
        for i in 1..=50 {
            let mut p = PathMotionPoint::new(Vector2::new(10.0 - 0.1 * i as f64, 0.0), 0.0);
            p.s_m = 10.0 + 0.1 * i as f64;
            points.push(p);
        }

        partition(&Trajectory::from(points), 1e-6).unwrap()
    }

    #[test]
    fn test_tolerance() {
        let tol = Tolerance {
            distance_m: 2.0,
            heading_rad: 0.5,
        };

        assert_eq!(tol.check(1.0, 0.1), Ok(()));
        assert_eq!(tol.check(2.0, 0.1), Err(Rejection::Distance));
        assert_eq!(tol.check(1.0, 0.5), Err(Rejection::Heading));

        // Distance takes precedence when both fail
        assert_eq!(tol.check(2.1, 0.6), Err(Rejection::Distance));

        let p = params();
        assert_eq!(
            Tolerance::for_phase(TrackingPhase::Acquiring, &p).heading_rad,
            p.heading_search_range_rad
        );
        assert_eq!(
            Tolerance::for_phase(TrackingPhase::Tracking, &p).heading_rad,
            p.heading_track_range_rad
        );
    }

    #[test]
    fn test_locate_local() {
        let parts = parts();
        let tracking = TrackingState {
            segment_index: 0,
            point_index: 30,
            phase: TrackingPhase::Tracking,
        };

        // Slightly ahead and off to the side of the last tracked point
        let m = locate_local(&parts, &tracking, &ego(3.52, 0.3, 0.0, Gear::Drive), &params())
            .unwrap();
        assert_eq!(m.segment_index, 0);
        assert_eq!(m.point_index, 35);

        // Close in distance but facing the wrong way
        assert!(
            locate_local(&parts, &tracking, &ego(3.5, 0.0, 1.0, Gear::Drive), &params())
                .is_none()
        );

        // Within the distance range but outside the search window around the
        // tracked point
        let tracking = TrackingState {
            point_index: 0,
            ..tracking
        };
        assert!(
            locate_local(&parts, &tracking, &ego(3.5, 0.0, 0.0, Gear::Drive), &params())
                .is_none()
        );
    }

    #[test]
    fn test_locate_local_phase() {
        let parts = parts();
        let mut tracking = TrackingState {
            segment_index: 0,
            point_index: 30,
            phase: TrackingPhase::Acquiring,
        };

        // Heading error between the tracking and search ranges
        let e = ego(3.0, 0.0, 0.6, Gear::Drive);
        assert!(locate_local(&parts, &tracking, &e, &params()).is_some());

        tracking.phase = TrackingPhase::Tracking;
        assert!(locate_local(&parts, &tracking, &e, &params()).is_none());
    }

    #[test]
    fn test_locate_failsafe() {
        let parts = parts();
        let p = params();

        // Facing neither way along the trajectory, so the heading check
        // passes nothing and the closest point by distance is used. The
        // reversing segment overlaps the forward one, the earliest point wins
        // the tie
        let m = locate_failsafe(&parts, &ego(7.0, 0.5, 2.0, Gear::Drive), &p).unwrap();
        assert_eq!((m.segment_index, m.point_index), (0, 70));
        assert!((m.distance_m - 0.5).abs() < 1e-9);

        // Far away but inside the ceiling
        let m = locate_failsafe(&parts, &ego(12.0, 50.0, 0.0, Gear::Drive), &p).unwrap();
        assert_eq!((m.segment_index, m.point_index), (0, 100));

        assert!(matches!(
            locate_failsafe(&parts, &ego(12.0, 500.0, 0.0, Gear::Drive), &p),
            Err(LocError::BeyondCeiling { .. })
        ));
    }

    #[test]
    fn test_locate_failsafe_heading() {
        let parts = parts();
        let p = params();

        // Same place on both legs, the gear picks the leg
        let m = locate_failsafe(&parts, &ego(7.0, 0.5, 0.0, Gear::Drive), &p).unwrap();
        assert_eq!((m.segment_index, m.point_index), (0, 70));

        let m = locate_failsafe(&parts, &ego(7.0, 0.5, 0.0, Gear::Reverse), &p).unwrap();
        assert_eq!((m.segment_index, m.point_index), (1, 30));
        assert!(m.heading_err_rad < 1e-9);

        // Equally close points on the forward leg come first but are skipped
        let m = locate_failsafe(&parts, &ego(8.0, 0.0, 0.0, Gear::Reverse), &p).unwrap();
        assert_eq!((m.segment_index, m.point_index), (1, 20));
    }

    #[test]
    fn test_locate_failsafe_non_finite() {
        let parts = parts();

        assert!(matches!(
            locate_failsafe(&parts, &ego(f64::NAN, 0.0, 0.0, Gear::Drive), &params()),
            Err(LocError::BeyondCeiling { .. })
        ));
    }

    #[test]
    fn test_check_reach_end() {
        let parts = parts();
        let seg: &Segment = &parts.segments()[0];
        let p = params();
        let v = vehicle();

        let at_end = |x: f64, heading_rad: f64, gear: Gear| {
            let e = ego(x, 0.0, heading_rad, gear);
            let idx = ((x * 10.0).round() as usize).min(100);
            let m = PointMatch::new(0, idx, &seg.traj.points[idx], seg.gear, &e);
            check_reach_end(seg, &m, &e, &v, &p)
        };

        assert!(at_end(10.0, 0.0, Gear::Drive));
        assert!(at_end(9.8, 0.0, Gear::Drive));

        // Too far from the end
        assert!(!at_end(9.0, 0.0, Gear::Drive));

        // Heading error too large
        assert!(!at_end(10.0, 0.6, Gear::Drive));

        // Wrong gear, the direction of travel is opposite
        assert!(!at_end(10.0, 0.0, Gear::Reverse));
    }

    #[test]
    fn test_locate_advances_segment() {
        let parts = parts();
        let mut tracking = TrackingState {
            segment_index: 0,
            point_index: 98,
            phase: TrackingPhase::Tracking,
        };

        let outcome = locate(
            &parts,
            &mut tracking,
            &ego(10.0, 0.0, 0.0, Gear::Drive),
            &vehicle(),
            &params(),
        )
        .unwrap();

        assert_eq!(outcome.method, LocateMethod::Tracking);
        assert_eq!(outcome.end_reached, Some(EndReached::NextSegment));
        assert_eq!(outcome.matched.point_index, 100);
        assert_eq!(tracking.segment_index, 1);
        assert_eq!(tracking.point_index, 0);
        assert_eq!(tracking.phase, TrackingPhase::Acquiring);
    }

    #[test]
    fn test_locate_destination() {
        let parts = parts();
        let mut tracking = TrackingState {
            segment_index: 1,
            point_index: 48,
            phase: TrackingPhase::Tracking,
        };

        let outcome = locate(
            &parts,
            &mut tracking,
            &ego(5.0, 0.0, 0.0, Gear::Reverse),
            &vehicle(),
            &params(),
        )
        .unwrap();

        assert_eq!(outcome.end_reached, Some(EndReached::Destination));
        assert_eq!(tracking.segment_index, 1);
        assert_eq!(tracking.point_index, 50);
    }
}
