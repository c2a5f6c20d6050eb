//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Linearly interpolate between `a` and `b`, with `ratio` in [0, 1].
pub fn lerp<T>(a: T, b: T, ratio: T) -> T
where
    T: Float
{
    a + (b - a) * ratio
}

/// Interpolate between two angles along the shortest arc.
///
/// The result is normalised into [-pi, pi).
pub fn lerp_angle<T>(a: T, b: T, ratio: T) -> T
where
    T: Float
{
    normalise_angle(a + get_ang_dist_2pi(a, b) * ratio)
}

/// Get the signed angular distance between two angles in the range of [0, 2pi].
///
/// This function will return the shortest signed distance between a and b accounting for wrapping
/// between 0 and 2pi.
pub fn get_ang_dist_2pi<T>(a: T, b: T) -> T
where
    T: Float
{
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    let c = rem_euclid(a - b, tau_t);
    let d = rem_euclid(b - a, tau_t);

    if c < d {
        -c
    }
    else {
        d
    }
}

/// Wrap an angle into the range [-pi, pi).
pub fn normalise_angle<T>(value: T) -> T
where
    T: Float
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    rem_euclid(value + pi_t, tau_t) - pi_t
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
/// This result is not an element of the function's codomain, but it is the
/// closest floating point number in the real numbers and thus fulfills the
/// property `self == self.div_euclid(rhs) * rhs + self.rem_euclid(rhs)`
/// approximatively.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;
    const TAU: f64 = std::f64::consts::TAU;

    #[test]
    fn test_get_ang_dist_2pi() {
        assert_eq!(get_ang_dist_2pi(1f64, 2f64), 1f64);
        assert_eq!(get_ang_dist_2pi(2f64, 1f64), -1f64);
        assert_eq!(get_ang_dist_2pi(0f64, TAU), 0f64);
        assert_eq!(get_ang_dist_2pi(TAU, 0f64), 0f64);
        assert_eq!(get_ang_dist_2pi(1f64, TAU), -1f64);
        assert_eq!(get_ang_dist_2pi(0f64, TAU - 1f64), -1f64);
        assert_eq!(get_ang_dist_2pi(TAU - 1f64, 1f64), 2f64);
    }

    #[test]
    fn test_normalise_angle() {
        assert!((normalise_angle(0.5f64) - 0.5).abs() < 1e-12);
        assert!((normalise_angle(TAU + 0.5f64) - 0.5).abs() < 1e-12);
        assert!((normalise_angle(-TAU - 0.5f64) + 0.5).abs() < 1e-12);
        assert!((normalise_angle(1.5 * PI) + 0.5 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_lerp_angle() {
        // Halfway between 0 and 1 rad
        assert!((lerp_angle(0f64, 1f64, 0.5) - 0.5).abs() < 1e-12);

        // Across the wrap, halfway between 3 and -3 rad is pi, not 0
        let mid = lerp_angle(3f64, -3f64, 0.5);
        assert!((mid.abs() - PI).abs() < 1e-9);

        assert_eq!(lerp(2f64, 4f64, 0.25), 2.5);
    }
}
