//! Value-generation policies.
//!
//! Each metric definition carries exactly one policy: a fixed value repeated
//! every tick, or a uniform draw from a half-open range. Sampling never fails.

use rand::Rng;

/// How a definition produces each sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValuePolicy {
    /// The same value every tick.
    Fixed(i64),
    /// A uniform draw from `[min, max)` every tick.
    Uniform { min: f64, max: f64 },
}

impl ValuePolicy {
    /// Produce one sample.
    ///
    /// Ranges without a positive finite width (`min >= max`, NaN bounds,
    /// infinite bounds) pin to `min` exactly; sampling never panics.
    pub fn sample(&self) -> f64 {
        match *self {
            ValuePolicy::Fixed(v) => v as f64,
            ValuePolicy::Uniform { min, max } => {
                let width = max - min;
                if !width.is_finite() || width <= 0.0 {
                    return min;
                }
                rand::rng().random_range(min..max)
            }
        }
    }

    /// Whether this policy can return different values across calls.
    pub fn is_random(&self) -> bool {
        match *self {
            ValuePolicy::Fixed(_) => false,
            ValuePolicy::Uniform { min, max } => {
                let width = max - min;
                width.is_finite() && width > 0.0
            }
        }
    }
}
