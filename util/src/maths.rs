//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap an angle in radians into the range [-pi, pi).
pub fn wrap_pi<T>(value: T) -> T
where
    T: Float
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap_or_else(T::zero);
    let tau_t: T = pi_t + pi_t;

    rem_euclid(value + pi_t, tau_t) - pi_t
}

/// Returns true if `value` is strictly within `tolerance` of `target`.
pub fn within<T>(value: T, target: T, tolerance: T) -> bool
where
    T: Float
{
    (value - target).abs() < tolerance
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wrap_pi() {
        const TAU: f64 = std::f64::consts::TAU;
        const PI: f64 = std::f64::consts::PI;

        assert!(within(wrap_pi(0.5f64), 0.5, 1e-12));
        assert!(within(wrap_pi(-0.5f64), -0.5, 1e-12));
        assert!(within(wrap_pi(TAU + 0.5f64), 0.5, 1e-12));
        assert!(within(wrap_pi(-TAU - 0.5f64), -0.5, 1e-12));
        assert!(within(wrap_pi(PI + 0.25f64), -PI + 0.25, 1e-12));
    }

    #[test]
    fn test_within() {
        assert!(within(-8.5f64, -9.0, 1.0));
        assert!(!within(-8.0f64, -9.0, 1.0));
        assert!(!within(f64::NAN, -9.0, 1.0));
    }
}
