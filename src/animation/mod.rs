//! Time-based animations: eased tweens and physical springs.
//!
//! Animations hold a [`Clock`] handle and are sampled, never stepped: [`Animation::value`] can be
//! called any number of times per frame and returns the same value until the clock moves.

use std::time::Duration;

use keyframe::functions::{EaseIn, EaseOut, EaseOutCubic};
use keyframe::EasingFunction;

mod clock;
mod spring;

pub use self::clock::Clock;
pub use self::spring::{Spring, SpringParams};

#[derive(Debug, Clone)]
pub struct Animation {
    from: f64,
    to: f64,
    is_off: bool,
    duration: Duration,
    start_time: Duration,
    clock: Clock,
    kind: Kind,
}

#[derive(Debug, Clone, Copy)]
enum Kind {
    Easing { curve: Curve },
    Spring(Spring),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Linear,
    /// CSS `ease-in`, accelerating from rest.
    EaseIn,
    /// CSS `ease-out`, the mirror image of [`Curve::EaseIn`].
    EaseOut,
    EaseOutCubic,
}

impl Animation {
    /// Creates an eased tween from `from` to `to` starting now.
    pub fn ease(clock: Clock, from: f64, to: f64, duration: Duration, curve: Curve) -> Self {
        let is_off = clock.should_complete_instantly();
        let start_time = clock.now();

        Self {
            from,
            to,
            is_off,
            duration: if is_off { Duration::ZERO } else { duration },
            start_time,
            clock,
            kind: Kind::Easing { curve },
        }
    }

    /// Creates a spring animation from `from` to `to` starting now.
    pub fn spring(
        clock: Clock,
        from: f64,
        to: f64,
        initial_velocity: f64,
        params: SpringParams,
    ) -> Self {
        let is_off = clock.should_complete_instantly();
        let start_time = clock.now();

        let spring = Spring {
            from,
            to,
            initial_velocity,
            params,
        };

        Self {
            from,
            to,
            is_off,
            duration: if is_off {
                Duration::ZERO
            } else {
                spring.duration()
            },
            start_time,
            clock,
            kind: Kind::Spring(spring),
        }
    }

    pub fn is_done(&self) -> bool {
        if self.is_off {
            return true;
        }

        self.clock.now() >= self.end_time()
    }

    pub fn value(&self) -> f64 {
        if self.is_off {
            return self.to;
        }

        let passed = self.clock.now().saturating_sub(self.start_time);
        if passed >= self.duration {
            return self.to;
        }

        match self.kind {
            Kind::Easing { curve } => {
                let x = passed.as_secs_f64() / self.duration.as_secs_f64();
                curve.y(x) * (self.to - self.from) + self.from
            }
            Kind::Spring(spring) => spring.value_at(passed),
        }
    }

    pub fn from(&self) -> f64 {
        self.from
    }

    pub fn to(&self) -> f64 {
        self.to
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn start_time(&self) -> Duration {
        self.start_time
    }

    pub fn end_time(&self) -> Duration {
        self.start_time.saturating_add(self.duration)
    }
}

impl Curve {
    pub fn y(self, x: f64) -> f64 {
        let x = x.clamp(0., 1.);
        match self {
            Curve::Linear => x,
            Curve::EaseIn => EaseIn.y(x),
            Curve::EaseOut => EaseOut.y(x),
            Curve::EaseOutCubic => EaseOutCubic.y(x),
        }
    }
}
