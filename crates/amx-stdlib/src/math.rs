//! Integer native implementations

use rand::Rng;

/// Smaller of two values
pub fn min(a: i32, b: i32) -> i32 {
    a.min(b)
}

/// Larger of two values
pub fn max(a: i32, b: i32) -> i32 {
    a.max(b)
}

/// Limit `value` to `[low, high]`
///
/// When `low > high` the bounds are swapped.
pub fn clamp(value: i32, low: i32, high: i32) -> i32 {
    let (low, high) = if low > high { (high, low) } else { (low, high) };
    value.clamp(low, high)
}

/// Pseudo-random value in `[0, max)`; 0 when `max` is not positive
pub fn random(max: i32) -> i32 {
    if max <= 0 {
        return 0;
    }
    rand::thread_rng().gen_range(0..max)
}
