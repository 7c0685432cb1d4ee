use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use atomic::Atomic;
use serde::Serialize;
use tracing::debug;

/// Presentation mode of a modal.
///
/// Exactly one mode is active at any instant. `Hidden` and `Shown` are the idle modes; every
/// other mode has an animation or a gesture in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, bytemuck::NoUninit)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum Mode {
    Hidden,
    Opening,
    Shown,
    SwipeTracking,
    Bouncing,
    ClosingProgrammatic,
    ClosingBySwipe,
}

impl Mode {
    pub const ALL: [Self; 7] = [
        Self::Hidden,
        Self::Opening,
        Self::Shown,
        Self::SwipeTracking,
        Self::Bouncing,
        Self::ClosingProgrammatic,
        Self::ClosingBySwipe,
    ];

    pub fn is_idle(self) -> bool {
        matches!(self, Self::Hidden | Self::Shown)
    }

    pub fn is_closing(self) -> bool {
        matches!(self, Self::ClosingProgrammatic | Self::ClosingBySwipe)
    }

    /// Whether the content position is driven by a drag rather than by progress.
    pub fn is_gesture_driven(self) -> bool {
        matches!(
            self,
            Self::SwipeTracking | Self::Bouncing | Self::ClosingBySwipe
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Opening => "opening",
            Self::Shown => "shown",
            Self::SwipeTracking => "swipe-tracking",
            Self::Bouncing => "bouncing",
            Self::ClosingProgrammatic => "closing-programmatic",
            Self::ClosingBySwipe => "closing-by-swipe",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared, atomically updated [`Mode`].
///
/// Both the animation context and the commit context consult the mode to decide whether their
/// next action is legal, so every change is a compare-exchange from the mode the caller expects.
#[derive(Clone)]
pub struct ModeCell(Arc<Atomic<Mode>>);

impl ModeCell {
    pub fn new(mode: Mode) -> Self {
        Self(Arc::new(Atomic::new(mode)))
    }

    pub fn get(&self) -> Mode {
        self.0.load(Ordering::Acquire)
    }

    /// Moves from `from` to `to`, returning `false` if the mode was not `from`.
    pub fn transition(&self, from: Mode, to: Mode) -> bool {
        match self
            .0
            .compare_exchange(from, to, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                debug!("mode {from} -> {to}");
                true
            }
            Err(_) => false,
        }
    }

    /// Unconditionally sets the mode, returning the previous one.
    pub fn force(&self, mode: Mode) -> Mode {
        let prev = self.0.swap(mode, Ordering::AcqRel);
        if prev != mode {
            debug!("mode {prev} -> {mode} (forced)");
        }
        prev
    }
}

impl Default for ModeCell {
    fn default() -> Self {
        Self::new(Mode::Hidden)
    }
}

impl fmt::Debug for ModeCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModeCell").field(&self.get()).finish()
    }
}
