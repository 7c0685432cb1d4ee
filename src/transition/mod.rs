//! Open/close transitions and the swipe-to-dismiss state machine.
//!
//! The engine runs in the animation context: it is driven by [`TransitionEngine::advance_animations`]
//! once per frame and by drag events, and never touches the host. Lifecycle effects are posted as
//! [`Commit`] messages for the commit context to carry out.

use std::time::Duration;

use scrim_config::SwipeDirection;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::animation::{Animation, Clock, Curve};
use crate::geometry::{clamp01, Offset, Size};
use crate::options::Options;

mod gesture;
mod latch;
mod mode;

pub use self::gesture::{
    axis_distance, candidate_direction, constrain, off_screen_target, swipe_progress,
    GestureTracker,
};
pub use self::latch::CountdownLatch;
pub use self::mode::{Mode, ModeCell};


/// Lifecycle effect raised by the animation context for the commit context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// An open transition started; the content must be mounted.
    Mount,
    /// The open transition finished and progress is 1.
    Shown,
    /// A close transition finished and the state was reset; the content must be unmounted.
    Hidden,
    /// A swipe committed to dismissing the modal.
    Dismissing,
    /// The engine returned to [`Mode::Shown`] without a visibility change (bounce settled or an
    /// opening replay finished).
    Settled,
}

/// Numeric state of a transition.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct TransitionState {
    /// 0 is hidden, 1 is shown.
    pub progress: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub active_direction: Option<SwipeDirection>,
}

impl TransitionState {
    pub fn offset(&self) -> Offset {
        Offset::new(self.offset_x, self.offset_y)
    }

    fn set_offset(&mut self, offset: Offset) {
        self.offset_x = offset.x;
        self.offset_y = offset.y;
    }
}

#[derive(Debug)]
struct BounceAnimation {
    /// Goes from 1 to 0; multiplied by the release offset.
    anim: Animation,
    from: Offset,
}

#[derive(Debug)]
struct DismissAnimation {
    x: Animation,
    y: Animation,
    x_done: bool,
    y_done: bool,
    latch: CountdownLatch,
}

#[derive(Debug)]
pub struct TransitionEngine {
    mode: ModeCell,
    state: TransitionState,
    /// Open or close tween of the progress.
    progress_anim: Option<Animation>,
    /// Ongoing drag, between gesture begin and gesture end.
    gesture: Option<GestureTracker>,
    bounce: Option<BounceAnimation>,
    dismiss: Option<DismissAnimation>,
    /// Whether finishing the current opening should announce [`Commit::Shown`].
    announce_shown: bool,
    /// Whether the opening must be replayed once the engine is back in [`Mode::Shown`].
    pending_replay: bool,
    options: Options,
    /// Options drawn by the renderer. The animation part lags behind `options` until the running
    /// transition ends.
    presented: Options,
    view_size: Size,
    clock: Clock,
    commits: async_channel::Sender<Commit>,
}

impl TransitionEngine {
    pub fn new(
        clock: Clock,
        options: Options,
        view_size: Size,
        commits: async_channel::Sender<Commit>,
    ) -> Self {
        Self {
            mode: ModeCell::default(),
            state: TransitionState::default(),
            progress_anim: None,
            gesture: None,
            bounce: None,
            dismiss: None,
            announce_shown: false,
            pending_replay: false,
            presented: options.clone(),
            options,
            view_size,
            clock,
            commits,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode.get()
    }

    /// Shared handle to the mode, for consulting it from the commit context.
    pub fn mode_cell(&self) -> &ModeCell {
        &self.mode
    }

    pub fn state(&self) -> &TransitionState {
        &self.state
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn presented_options(&self) -> &Options {
        &self.presented
    }

    pub fn view_size(&self) -> Size {
        self.view_size
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn set_view_size(&mut self, size: Size) {
        self.view_size = size;
    }

    /// Replaces the options.
    ///
    /// Changing the animation kind while shown resets the state and replays the opening with the
    /// new kind. A transition or gesture in flight keeps being drawn with the previous kind and
    /// the replay happens when it settles back to shown. A close in flight drops the replay.
    pub fn set_options(&mut self, options: Options) {
        let kind_changed = options.kind() != self.presented.kind();
        self.options = options;

        if !kind_changed || self.mode.get() == Mode::Hidden {
            self.pending_replay = false;
            self.presented = self.options.clone();
            return;
        }

        if self.replay_opening(Mode::Shown) {
            return;
        }

        debug!("animation kind changed mid-transition, replaying once shown");
        self.pending_replay = true;
        self.presented = Options {
            animation: self.presented.animation.clone(),
            entry_direction: self.presented.entry_direction,
            ..self.options.clone()
        };
    }

    fn replay_opening(&mut self, from: Mode) -> bool {
        if !self.mode.transition(from, Mode::Opening) {
            return false;
        }

        debug!("replaying opening with {:?}", self.options.kind());
        self.pending_replay = false;
        self.presented = self.options.clone();
        self.reset_state();
        self.announce_shown = false;
        self.start_progress(1., Curve::EaseOut);
        true
    }

    /// Starts opening. Does nothing unless hidden.
    pub fn open(&mut self) -> bool {
        if !self.mode.transition(Mode::Hidden, Mode::Opening) {
            return false;
        }

        self.reset_state();
        self.pending_replay = false;
        self.presented = self.options.clone();
        self.announce_shown = true;
        self.start_progress(1., Curve::EaseOut);
        self.post(Commit::Mount);
        true
    }

    /// Starts a programmatic close. Does nothing unless shown.
    pub fn close(&mut self) -> bool {
        if !self.mode.transition(Mode::Shown, Mode::ClosingProgrammatic) {
            return false;
        }

        self.start_progress(0., Curve::EaseIn);
        true
    }

    pub fn are_animations_ongoing(&self) -> bool {
        let mode = self.mode.get();
        !mode.is_idle() && mode != Mode::SwipeTracking
    }

    /// Samples the running animations and completes the ones that are done.
    pub fn advance_animations(&mut self) {
        match self.mode.get() {
            Mode::Hidden | Mode::Shown | Mode::SwipeTracking => (),
            Mode::Opening => {
                if self.sample_progress() {
                    self.state.progress = 1.;
                    let commit = if self.announce_shown {
                        Commit::Shown
                    } else {
                        Commit::Settled
                    };
                    self.announce_shown = false;
                    self.settle(Mode::Opening, commit);
                }
            }
            Mode::ClosingProgrammatic => {
                if self.sample_progress() {
                    self.finish_close(Mode::ClosingProgrammatic);
                }
            }
            Mode::Bouncing => self.advance_bounce(),
            Mode::ClosingBySwipe => self.advance_dismiss(),
        }

        trace!(
            "progress={:.3} offset=({:.1}, {:.1})",
            self.state.progress,
            self.state.offset_x,
            self.state.offset_y
        );
    }

    /// Updates the progress from its tween and returns whether the tween is done.
    fn sample_progress(&mut self) -> bool {
        let Some(anim) = &self.progress_anim else {
            return true;
        };

        self.state.progress = clamp01(anim.value());
        if anim.is_done() {
            self.progress_anim = None;
            true
        } else {
            false
        }
    }

    fn advance_bounce(&mut self) {
        let Some(bounce) = &self.bounce else {
            self.finish_bounce();
            return;
        };

        let t = bounce.anim.value();
        let offset = Offset::new(bounce.from.x * t, bounce.from.y * t);
        let done = bounce.anim.is_done();
        self.state.set_offset(offset);

        if done {
            self.finish_bounce();
        }
    }

    fn finish_bounce(&mut self) {
        self.bounce = None;
        self.state.set_offset(Offset::ZERO);
        self.state.active_direction = None;
        self.settle(Mode::Bouncing, Commit::Settled);
    }

    /// Returns to [`Mode::Shown`], then starts a replay queued by a kind change.
    fn settle(&mut self, from: Mode, commit: Commit) {
        if !self.mode.transition(from, Mode::Shown) {
            return;
        }

        self.post(commit);
        if self.pending_replay {
            self.replay_opening(Mode::Shown);
        }
    }

    fn advance_dismiss(&mut self) {
        let Some(dismiss) = &mut self.dismiss else {
            self.finish_close(Mode::ClosingBySwipe);
            return;
        };

        self.state.offset_x = dismiss.x.value();
        self.state.offset_y = dismiss.y.value();

        let mut joined = false;
        if !dismiss.x_done && dismiss.x.is_done() {
            dismiss.x_done = true;
            joined |= dismiss.latch.count_down();
        }
        if !dismiss.y_done && dismiss.y.is_done() {
            dismiss.y_done = true;
            joined |= dismiss.latch.count_down();
        }

        if joined {
            self.finish_close(Mode::ClosingBySwipe);
        }
    }

    /// Completes a close: the state is reset before the mode goes back to hidden, so whoever
    /// handles [`Commit::Hidden`] observes a clean slate.
    fn finish_close(&mut self, from: Mode) {
        self.reset_state();
        self.pending_replay = false;
        self.presented = self.options.clone();
        if self.mode.transition(from, Mode::Hidden) {
            self.post(Commit::Hidden);
        }
    }

    fn reset_state(&mut self) {
        self.state = TransitionState::default();
        self.progress_anim = None;
        self.gesture = None;
        self.bounce = None;
        self.dismiss = None;
    }

    fn duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.options.animation.duration_ms))
    }

    fn start_progress(&mut self, to: f64, curve: Curve) {
        self.progress_anim = Some(Animation::ease(
            self.clock.clone(),
            self.state.progress,
            to,
            self.duration(),
            curve,
        ));
    }

    fn post(&self, commit: Commit) {
        debug!("posting {commit:?}");
        if let Err(err) = self.commits.send_blocking(commit) {
            warn!("error sending commit: {err:?}");
        }
    }
}
