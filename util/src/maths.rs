//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where 
    T: Float 
{
    target_range.0 
        + ((value - source_range.0) 
        * (target_range.1 - target_range.0) 
        / (source_range.1 - source_range.0))
}

/// Limit a value to the closed range `[min, max]`.
///
/// A NaN value is mapped to `min`, so that garbage input from a widget can
/// never produce a NaN demand.
pub fn clamp<T>(value: T, min: T, max: T) -> T 
where
    T: Float
{
    if value.is_nan() {
        return min
    }

    if value > max {
        max
    }
    else if value < min {
        min
    }
    else {
        value
    }
}

/// Limit a value to the symmetric range `[-limit, limit]`.
pub fn clamp_abs<T>(value: T, limit: T) -> T
where
    T: Float
{
    if value.is_nan() {
        return T::zero()
    }

    clamp(value, -limit.abs(), limit.abs())
}
