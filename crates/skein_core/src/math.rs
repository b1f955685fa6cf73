//! Math helpers shared by the combat and grid code
//!
//! Re-exports glam's double-precision vectors used for continuous positions

pub use glam::DVec2;

/// Squash `x` into (-1, 1): `x / (100 + |x|)`.
///
/// Combat formulas feed stat differences through this to get probabilities.
pub fn ratio(x: f64) -> f64 {
    x / (100.0 + x.abs())
}

pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

pub fn sign(x: f64) -> i32 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}
