//! 2D vector helpers on top of `glam::Vec2`.
//!
//! All helpers are pure and component-wise. `mod_vectors` follows the sign of
//! the dividend (truncated remainder), which is what the grid background relies
//! on when it offsets the first grid line from the left/top screen edge.

use glam::Vec2;
use rand::Rng;

pub const ORIGIN: Vec2 = Vec2::ZERO;

/// Returns `a + b`.
pub fn add_vectors(a: Vec2, b: Vec2) -> Vec2 {
    Vec2::new(a.x + b.x, a.y + b.y)
}

/// Returns `a - b`.
pub fn subtract_vectors(a: Vec2, b: Vec2) -> Vec2 {
    Vec2::new(a.x - b.x, a.y - b.y)
}

/// Returns the component-wise product of `a` and `b`.
pub fn multiply_vectors(a: Vec2, b: Vec2) -> Vec2 {
    Vec2::new(a.x * b.x, a.y * b.y)
}

/// Returns the component-wise truncated remainder `a % b`.
pub fn mod_vectors(a: Vec2, b: Vec2) -> Vec2 {
    Vec2::new(a.x % b.x, a.y % b.y)
}

/// Random integer in `[min, max]`, both ends inclusive. Bounds may be given in
/// either order.
pub fn rand_int(min: i32, max: i32) -> i32 {
    rand_int_with(&mut rand::thread_rng(), min, max)
}

pub fn rand_int_with<R: Rng + ?Sized>(rng: &mut R, min: i32, max: i32) -> i32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    rng.gen_range(lo..=hi)
}

/// True when every component is a finite number.
pub fn is_finite_vector(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn add_of_negated_subtrahend_matches_subtract() {
        let samples = [
            (Vec2::new(3.0, -2.0), Vec2::new(1.5, 4.0)),
            (Vec2::new(-10.0, 0.0), Vec2::new(-10.0, 7.25)),
            (Vec2::new(0.0, 0.0), Vec2::new(100.0, -100.0)),
        ];
        for (v1, v2) in samples {
            let via_add = add_vectors(v1, subtract_vectors(ORIGIN, v2));
            assert_eq!(via_add, subtract_vectors(v1, v2));
            assert_eq!(via_add, v1 - v2);
        }
    }

    #[test]
    fn add_and_multiply_are_commutative() {
        let a = Vec2::new(2.0, -3.0);
        let b = Vec2::new(0.5, 8.0);
        assert_eq!(add_vectors(a, b), add_vectors(b, a));
        assert_eq!(multiply_vectors(a, b), multiply_vectors(b, a));
        assert_eq!(multiply_vectors(a, b), Vec2::new(1.0, -24.0));
    }

    #[test]
    fn operations_leave_operands_untouched() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, 4.0);
        let _ = add_vectors(a, b);
        let _ = multiply_vectors(a, b);
        assert_eq!(a, Vec2::new(1.0, 2.0));
        assert_eq!(b, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn mod_keeps_sign_of_dividend() {
        let m = mod_vectors(Vec2::new(250.0, -250.0), Vec2::new(100.0, 100.0));
        assert_eq!(m, Vec2::new(50.0, -50.0));
    }

    #[test]
    fn rand_int_stays_within_inclusive_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut saw_min = false;
        let mut saw_max = false;
        for _ in 0..2000 {
            let n = rand_int_with(&mut rng, -2, 2);
            assert!((-2..=2).contains(&n));
            saw_min |= n == -2;
            saw_max |= n == 2;
        }
        assert!(saw_min && saw_max, "both inclusive ends should be reachable");
    }

    #[test]
    fn rand_int_accepts_reversed_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let n = rand_int_with(&mut rng, 5, 1);
            assert!((1..=5).contains(&n));
        }
    }

    #[test]
    fn finite_check_rejects_nan_and_infinity() {
        assert!(is_finite_vector(Vec2::new(1.0, -1.0)));
        assert!(!is_finite_vector(Vec2::new(f32::NAN, 0.0)));
        assert!(!is_finite_vector(Vec2::new(0.0, f32::INFINITY)));
    }
}
