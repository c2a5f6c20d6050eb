//! Rebasing of the output trajectory so that it starts at zero time and
//! distance.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::traj::Trajectory;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// The part of the trajectory from `from_index` onwards, with time and
/// distance measured from that point.
///
/// An index past the end is clamped to the last point.
pub fn rebase(traj: &Trajectory, from_index: usize) -> Trajectory {
    let from_index = from_index.min(traj.get_num_points().saturating_sub(1));

    let origin = match traj.points.get(from_index) {
        Some(p) => *p,
        None => return Trajectory::new_empty(),
    };

    traj.points[from_index..]
        .iter()
        .map(|p| {
            let mut p = *p;
            p.relative_time_s -= origin.relative_time_s;
            p.s_m -= origin.s_m;
            p
        })
        .collect::<Vec<_>>()
        .into()
}

/// Append `rest` after the stationary `idle` trajectory, shifting its times
/// by `idle_duration_s`.
///
/// `rest` is expected to be rebased already, its distances are unchanged.
pub fn splice_after_idle(idle: Trajectory, rest: Trajectory, idle_duration_s: f64) -> Trajectory {
    let mut out = idle;
    out.points.reserve(rest.get_num_points());

    out.points.extend(rest.points.into_iter().map(|mut p| {
        p.relative_time_s += idle_duration_s;
        p
    }));

    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::traj::PathMotionPoint;
    use nalgebra::Vector2;

    fn traj() -> Trajectory {
        (0..5)
            .map(|i| {
                let mut p = PathMotionPoint::new(Vector2::new(i as f64, 0.0), 0.0);
                p.s_m = 10.0 + i as f64;
                p.relative_time_s = 20.0 + 2.0 * i as f64;
                p
            })
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_rebase() {
        let out = rebase(&traj(), 2);

        assert_eq!(out.get_num_points(), 3);
        assert_eq!(out.first().unwrap().relative_time_s, 0.0);
        assert_eq!(out.first().unwrap().s_m, 0.0);
        assert_eq!(out.last().unwrap().relative_time_s, 4.0);
        assert_eq!(out.last().unwrap().s_m, 2.0);
        assert_eq!(out.first().unwrap().position_m, Vector2::new(2.0, 0.0));

        // Past the end gives the final point alone
        let out = rebase(&traj(), 9);
        assert_eq!(out.get_num_points(), 1);
        assert_eq!(out.first().unwrap().s_m, 0.0);

        assert!(rebase(&Trajectory::new_empty(), 0).is_empty());
    }

    #[test]
    fn test_splice_after_idle() {
        let idle: Trajectory = (0..3)
            .map(|i| {
                let mut p = PathMotionPoint::new(Vector2::new(0.0, 0.0), 0.0);
                p.relative_time_s = 0.5 * i as f64;
                p
            })
            .collect::<Vec<_>>()
            .into();

        let out = splice_after_idle(idle, rebase(&traj(), 0), 1.5);

        assert_eq!(out.get_num_points(), 8);
        assert_eq!(out.points[3].relative_time_s, 1.5);
        assert_eq!(out.points[3].s_m, 0.0);
        assert_eq!(out.points[7].relative_time_s, 9.5);

        for w in out.points.windows(2) {
            assert!(w[1].relative_time_s >= w[0].relative_time_s);
            assert!(w[1].s_m >= w[0].s_m);
        }
    }
}
