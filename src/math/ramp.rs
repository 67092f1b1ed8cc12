//! Linear ramps and alpha compositing on 8-bit channels

use num_traits::{Float, FromPrimitive};

/// `count` evenly spaced values from `start` to `end`, both inclusive
///
/// A single sample yields `start`; zero samples yield an empty vector.
pub fn linspace<T: Float + FromPrimitive>(start: T, end: T, count: usize) -> Vec<T> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let last = T::from_usize(count - 1).unwrap_or_else(T::one);
            (0..count)
                .map(|i| {
                    let t = T::from_usize(i).unwrap_or_else(T::zero) / last;
                    start + (end - start) * t
                })
                .collect()
        }
    }
}

/// Inclusive 8-bit ramp of `count` samples from `from` to `to`
pub fn alpha_ramp(from: u8, to: u8, count: usize) -> Vec<u8> {
    linspace(f64::from(from), f64::from(to), count)
        .into_iter()
        .map(|value| value.round().clamp(0.0, 255.0) as u8)
        .collect()
}

/// Ramp that falls from 255 toward 0 without reaching either endpoint
///
/// Sample `i` of `count` is `255 * (count - i) / (count + 1)`, so every value is
/// strictly graded and never reads as fully fixed or fully free.
pub fn interior_falling_ramp(count: usize) -> Vec<u8> {
    let denominator = (count + 1) as f64;
    (0..count)
        .map(|i| {
            let value = 255.0 * (count - i) as f64 / denominator;
            value.round().clamp(1.0, 254.0) as u8
        })
        .collect()
}

/// Composite one channel: `alpha` 0 keeps `under`, 255 yields `over`
pub fn blend_channel(under: u8, over: u8, alpha: u8) -> u8 {
    let alpha = u32::from(alpha);
    let mixed = u32::from(under) * (255 - alpha) + u32::from(over) * alpha;
    ((mixed + 127) / 255) as u8
}
