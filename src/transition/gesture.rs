//! Swipe-to-dismiss gesture handling.

use scrim_config::{SwipeDirection, SwipeDirections};
use tracing::debug;

use super::{BounceAnimation, Commit, CountdownLatch, DismissAnimation, Mode, TransitionEngine};
use crate::animation::{Animation, Curve};
use crate::geometry::{clamp01, Offset, Size};

/// Direction lock and offset of one drag.
///
/// Drag updates carry the total translation since the drag began. The direction is picked once,
/// from the first update whose dominant axis points in an allowed direction; until then the
/// gesture is inert.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureTracker {
    allowed: SwipeDirections,
    threshold: f64,
    direction: Option<SwipeDirection>,
    offset: Offset,
}

impl GestureTracker {
    pub fn new(allowed: SwipeDirections, threshold: f64) -> Self {
        Self {
            allowed,
            threshold,
            direction: None,
            offset: Offset::ZERO,
        }
    }

    /// Feeds a drag update. Returns the constrained offset once a direction is accepted.
    pub fn update(&mut self, dx: f64, dy: f64) -> Option<Offset> {
        let direction = match self.direction {
            Some(direction) => direction,
            None => {
                let candidate = candidate_direction(dx, dy)?;
                if !self.allowed.contains_direction(candidate) {
                    return None;
                }

                debug!("swipe direction locked to {candidate}");
                self.direction = Some(candidate);
                candidate
            }
        };

        self.offset = constrain(direction, dx, dy);
        Some(self.offset)
    }

    pub fn direction(&self) -> Option<SwipeDirection> {
        self.direction
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn progress(&self) -> f64 {
        self.direction
            .map_or(0., |dir| swipe_progress(dir, self.offset, self.threshold))
    }
}

/// Direction of the dominant axis of a translation. Ties go to the vertical axis.
pub fn candidate_direction(dx: f64, dy: f64) -> Option<SwipeDirection> {
    if !dx.is_finite() || !dy.is_finite() || (dx == 0. && dy == 0.) {
        return None;
    }

    let direction = if dx.abs() > dy.abs() {
        if dx > 0. {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        }
    } else if dy > 0. {
        SwipeDirection::Down
    } else {
        SwipeDirection::Up
    };
    Some(direction)
}

/// Pins a translation to the axis of `direction` and to its sign.
pub fn constrain(direction: SwipeDirection, dx: f64, dy: f64) -> Offset {
    match direction {
        SwipeDirection::Up => Offset::new(0., dy.min(0.)),
        SwipeDirection::Down => Offset::new(0., dy.max(0.)),
        SwipeDirection::Left => Offset::new(dx.min(0.), 0.),
        SwipeDirection::Right => Offset::new(dx.max(0.), 0.),
    }
}

/// Distance travelled along `direction`; negative when moving against it.
pub fn axis_distance(direction: SwipeDirection, offset: Offset) -> f64 {
    let along = if direction.is_horizontal() {
        offset.x
    } else {
        offset.y
    };
    along * direction.sign()
}

pub fn swipe_progress(direction: SwipeDirection, offset: Offset, threshold: f64) -> f64 {
    if threshold <= 0. {
        return 1.;
    }
    clamp01(axis_distance(direction, offset) / threshold)
}

/// Offset that puts the content fully off screen in `direction`.
pub fn off_screen_target(direction: SwipeDirection, size: Size) -> Offset {
    match direction {
        SwipeDirection::Up => Offset::new(0., -size.h),
        SwipeDirection::Down => Offset::new(0., size.h),
        SwipeDirection::Left => Offset::new(-size.w, 0.),
        SwipeDirection::Right => Offset::new(size.w, 0.),
    }
}

impl TransitionEngine {
    /// Begins a drag. Returns `false` if the modal cannot be swiped right now.
    pub fn swipe_gesture_begin(&mut self) -> bool {
        if self.mode.get() != Mode::Shown || !self.options.swipe_enabled() {
            return false;
        }

        self.gesture = Some(GestureTracker::new(
            self.options.dismiss_directions,
            self.options.swipe.threshold,
        ));
        self.state.active_direction = None;
        true
    }

    /// Updates the drag with the total translation since it began.
    ///
    /// Returns `None` if there is no drag, `Some(false)` while the drag is inert.
    pub fn swipe_gesture_update(&mut self, dx: f64, dy: f64) -> Option<bool> {
        let gesture = self.gesture.as_mut()?;
        let was_locked = gesture.direction().is_some();

        let Some(offset) = gesture.update(dx, dy) else {
            return Some(false);
        };
        let direction = gesture.direction();

        let tracking = if was_locked {
            self.mode.get() == Mode::SwipeTracking
        } else {
            self.mode.transition(Mode::Shown, Mode::SwipeTracking)
        };
        if !tracking {
            // Something else took over since the drag began.
            self.gesture = None;
            return None;
        }

        self.state.set_offset(offset);
        self.state.active_direction = direction;
        Some(true)
    }

    /// Ends the drag, either committing to a dismissal or bouncing back.
    pub fn swipe_gesture_end(&mut self) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };

        let Some(direction) = gesture.direction() else {
            self.state.set_offset(Offset::ZERO);
            self.state.active_direction = None;
            return false;
        };

        let progress = gesture.progress();
        let from = self.state.offset();

        if progress >= 1. {
            if !self.mode.transition(Mode::SwipeTracking, Mode::ClosingBySwipe) {
                return false;
            }

            let target = off_screen_target(direction, self.view_size);
            let duration = self.duration();
            let tween = |from, to| {
                Animation::ease(self.clock.clone(), from, to, duration, Curve::EaseOut)
            };
            self.dismiss = Some(DismissAnimation {
                x: tween(from.x, target.x),
                y: tween(from.y, target.y),
                x_done: false,
                y_done: false,
                latch: CountdownLatch::new(2),
            });
            self.post(Commit::Dismissing);
        } else {
            if !self.mode.transition(Mode::SwipeTracking, Mode::Bouncing) {
                return false;
            }

            self.bounce = Some(BounceAnimation {
                anim: Animation::spring(
                    self.clock.clone(),
                    1.,
                    0.,
                    0.,
                    self.options.swipe.bounce_spring.into(),
                ),
                from,
            });
        }

        true
    }

    pub fn is_swipe_gesture_active(&self) -> bool {
        self.gesture.is_some()
    }
}
