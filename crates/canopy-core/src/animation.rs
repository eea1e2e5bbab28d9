#![forbid(unsafe_code)]

//! Easing functions and the one-shot tween timer.
//!
//! A [`Tween`] tracks elapsed time against a fixed duration and maps the
//! linear progress through an easing function to a value in `[0.0, 1.0]`.
//! Elapsed time accumulates as [`Duration`] so repeated small ticks do not
//! drift. The scene graph attaches one tween per moving element; there is no
//! scheduler here — the host ticks everything from its frame callback.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Easing functions
// ---------------------------------------------------------------------------

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f32) -> f32;

/// Identity easing (constant velocity).
#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-in (slow start).
#[inline]
pub fn ease_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

/// Quadratic ease-out (slow end).
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in-out (slow start and end).
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

// ---------------------------------------------------------------------------
// Tween
// ---------------------------------------------------------------------------

/// A one-shot eased progression from 0.0 to 1.0 over a fixed duration.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl Tween {
    /// Create a tween with the given duration and default linear easing.
    ///
    /// A zero duration is clamped to one nanosecond so progress is always
    /// defined; such a tween completes on its first tick.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration: if duration.is_zero() {
                Duration::from_nanos(1)
            } else {
                duration
            },
            easing: linear,
        }
    }

    /// Set the easing function (builder).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Advance by `dt`. Ticking past completion is safe.
    pub fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    /// Whether the tween has reached its end.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Raw linear progress (before easing), in [0.0, 1.0].
    #[must_use]
    pub fn raw_progress(&self) -> f32 {
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        (t as f32).clamp(0.0, 1.0)
    }

    /// Current eased value, clamped to [0.0, 1.0].
    #[must_use]
    pub fn value(&self) -> f32 {
        (self.easing)(self.raw_progress())
    }

    /// Restart from zero, keeping duration and easing.
    pub fn restart(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    /// Jump straight to the end.
    pub fn finish(&mut self) {
        self.elapsed = self.duration;
    }
}
