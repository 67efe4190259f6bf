//! Small numeric helpers.

use std::f64::consts::{FRAC_PI_4, TAU};

/// Wrap `num` into the range `[0, wrap_to)`.
pub fn wrap_around(num: i32, wrap_to: i32) -> i32 {
    num.rem_euclid(wrap_to)
}

/// Wrap `num` into the range `[0, wrap_to)`.
pub fn wrap_around_f64(num: f64, wrap_to: f64) -> f64 {
    num.rem_euclid(wrap_to)
}

/// Round `value` up to the nearest multiple of `multiple`.
pub fn round_to_multiple(value: i32, multiple: i32) -> i32 {
    let bump = i32::from(value >= 0) * (multiple - 1);
    (value + bump) / multiple * multiple
}

/// Fast atan2 approximation scaled so a full turn maps to `[0, 1)`.
///
/// Zero is the +x axis, values increase towards +y. Accurate to a few
/// thousandths of a turn, which is plenty for arc membership tests on a
/// cell grid.
pub fn scaled_atan2_approx(y: f64, x: f64) -> f64 {
    if x == 0.0 && y == 0.0 {
        return 0.0;
    }

    let ay = y.abs();
    let angle = if x >= 0.0 {
        let r = (x - ay) / (x + ay);
        FRAC_PI_4 - FRAC_PI_4 * r
    } else {
        let r = (x + ay) / (ay - x);
        3.0 * FRAC_PI_4 - FRAC_PI_4 * r
    };
    let angle = if y < 0.0 { -angle } else { angle };

    (angle / TAU).rem_euclid(1.0)
}
