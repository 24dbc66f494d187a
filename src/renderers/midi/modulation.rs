//! Pitch-wheel expanders
//!
//! Turn a declarative glide or oscillation into a list of
//! `(delta_ticks, wheel_value)` points. Every expansion ends with a `(0, 0)`
//! point that returns the wheel to center.

use std::f64::consts::PI;

/// Pitch-wheel range in SMF; the asymmetry comes from the 14-bit encoding
pub const PITCH_WHEEL_MIN: i16 = -8192;
pub const PITCH_WHEEL_MAX: i16 = 8191;

/// A wheel position and the ticks elapsed since the previous point
pub type WheelPoint = (u32, i16);

/// Map a normalized value in [-1.0, 1.0] to a wheel value
pub fn wheel_value(normalized: f64) -> i16 {
    (normalized * PITCH_WHEEL_MAX as f64)
        .round()
        .clamp(PITCH_WHEEL_MIN as f64, PITCH_WHEEL_MAX as f64) as i16
}

/// Linear glide from `start` to `end` over `total_ticks`
pub fn expand_ramp(start: f64, end: f64, steps: i64, total_ticks: u32) -> Vec<WheelPoint> {
    expand(steps, total_ticks, |t| start + (end - start) * t)
}

/// Sinusoidal modulation `depth * sin(2π·speed·t)` over `total_ticks`
pub fn expand_vibrato(depth: f64, speed: i64, steps: i64, total_ticks: u32) -> Vec<WheelPoint> {
    expand(steps, total_ticks, |t| depth * (2.0 * PI * speed as f64 * t).sin())
}

/// Sample `curve` at `steps + 1` evenly spaced points of t in [0, 1]
fn expand(steps: i64, total_ticks: u32, curve: impl Fn(f64) -> f64) -> Vec<WheelPoint> {
    let steps = steps.max(1);
    let spacing = (total_ticks as i64 / steps) as u32;

    let mut points: Vec<WheelPoint> = (0..=steps)
        .map(|i| {
            let delta = if i == 0 { 0 } else { spacing };
            (delta, wheel_value(curve(i as f64 / steps as f64)))
        })
        .collect();

    // Back to center
    points.push((0, 0));
    points
}
