#![forbid(unsafe_code)]

//! Per-element eased movement.

use std::time::Duration;

use canopy_core::animation::{EasingFn, Tween};
use canopy_core::geometry::Point;

/// An eased glide from one point to another.
///
/// Retargeting restarts the glide from the current interpolated position,
/// never from the stale start point, so interrupting a transition mid-flight
/// is safe and idempotent.
#[derive(Debug, Clone, Copy)]
pub struct Motion {
    from: Point,
    to: Point,
    tween: Tween,
}

impl Motion {
    /// Start a glide from `from` to `to`.
    #[must_use]
    pub fn glide(from: Point, to: Point, duration: Duration, easing: EasingFn) -> Self {
        Self {
            from,
            to,
            tween: Tween::new(duration).easing(easing),
        }
    }

    /// A motion already at rest at `at`.
    #[must_use]
    pub fn resting(at: Point) -> Self {
        let mut tween = Tween::new(Duration::from_nanos(1));
        tween.finish();
        Self {
            from: at,
            to: at,
            tween,
        }
    }

    /// Current interpolated position.
    #[must_use]
    pub fn current(&self) -> Point {
        self.from.lerp(self.to, f64::from(self.tween.value()))
    }

    /// Final position of the glide.
    #[must_use]
    pub fn target(&self) -> Point {
        self.to
    }

    /// Redirect toward a new target, starting from wherever the motion
    /// currently is.
    pub fn retarget(&mut self, to: Point) {
        self.from = self.current();
        self.to = to;
        self.tween.restart();
    }

    /// Advance by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        self.tween.tick(dt);
    }

    /// Whether the glide has arrived.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.tween.is_complete()
    }
}
