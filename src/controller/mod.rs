//! Composition root: wires the transition engine to the visibility intent and the host.
//!
//! The controller straddles the two contexts. [`ModalController::advance_animations`] and the
//! drag methods belong to the animation context and only touch the engine.
//! [`ModalController::dispatch`] is the commit context: it drains the queues, talks to the host,
//! fires callbacks and reconciles the visibility intent with the engine mode.

use scrim_config::{BackdropPress, Config};
use tracing::{debug, trace};

use crate::animation::Clock;
use crate::geometry::Size;
use crate::host::{Layer, MountRequest, OverlayHost, RegistrationToken};
use crate::options::Options;
use crate::render::{present, Frame};
use crate::transition::{Commit, Mode, TransitionEngine, TransitionState};

mod handle;

pub use self::handle::{ModalHandle, Request};

#[cfg(test)]
mod tests;

/// View size used until the host reports one.
pub const DEFAULT_VIEW_SIZE: Size = Size::new(1280., 720.);

type Callback = Box<dyn FnMut()>;

#[derive(Default)]
struct Callbacks {
    on_show: Option<Callback>,
    on_hide: Option<Callback>,
    on_backdrop_press: Option<Callback>,
    on_request_close: Option<Callback>,
}

pub struct ModalController<H: OverlayHost> {
    host: H,
    engine: TransitionEngine,
    commits: async_channel::Receiver<Commit>,
    requests: async_channel::Receiver<Request>,
    handle: ModalHandle,
    mounted: bool,
    back_handler: Option<RegistrationToken>,
    callbacks: Callbacks,
}

impl<H: OverlayHost> ModalController<H> {
    pub fn new(host: H, config: &Config, clock: Clock) -> Self {
        let (commits_tx, commits_rx) = async_channel::unbounded();
        let (requests_tx, requests_rx) = async_channel::unbounded();

        let options = Options::from_config(config);
        let engine = TransitionEngine::new(clock, options, DEFAULT_VIEW_SIZE, commits_tx);

        Self {
            host,
            engine,
            commits: commits_rx,
            requests: requests_rx,
            handle: ModalHandle::new(requests_tx),
            mounted: false,
            back_handler: None,
            callbacks: Callbacks::default(),
        }
    }

    pub fn on_show(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.on_show = Some(Box::new(callback));
    }

    pub fn on_hide(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.on_hide = Some(Box::new(callback));
    }

    /// Replaces the default backdrop press behavior of dismissing the modal.
    pub fn on_backdrop_press(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.on_backdrop_press = Some(Box::new(callback));
    }

    /// Makes back and backdrop dismissal call `callback` instead of closing the modal.
    pub fn on_request_close(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.on_request_close = Some(Box::new(callback));
    }

    pub fn handle(&self) -> ModalHandle {
        self.handle.clone()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn mode(&self) -> Mode {
        self.engine.mode()
    }

    pub fn state(&self) -> &TransitionState {
        self.engine.state()
    }

    pub fn options(&self) -> &Options {
        self.engine.options()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_visible(&self) -> bool {
        self.handle.is_visible()
    }

    pub fn are_animations_ongoing(&self) -> bool {
        self.engine.are_animations_ongoing()
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.handle.set_visible(visible);
        self.dispatch();
    }

    /// Applies a new config. A mounted modal whose layer or region ids change is remounted.
    pub fn set_config(&mut self, config: &Config) {
        let options = Options::from_config(config);
        let closable = options.closable;
        let remount =
            self.mounted && mount_request(&options) != mount_request(self.engine.options());
        self.engine.set_options(options);

        if remount {
            debug!("mount request changed, remounting");
            self.unmount();
            self.mount();
        } else if self.mounted {
            self.update_back_handler(closable);
        }
        self.dispatch();
    }

    pub fn set_view_size(&mut self, size: Size) {
        self.engine.set_view_size(size);
    }

    pub fn drag_begin(&mut self) -> bool {
        self.engine.swipe_gesture_begin()
    }

    pub fn drag_update(&mut self, dx: f64, dy: f64) -> Option<bool> {
        self.engine.swipe_gesture_update(dx, dy)
    }

    pub fn drag_end(&mut self) -> bool {
        self.engine.swipe_gesture_end()
    }

    pub fn advance_animations(&mut self) {
        self.engine.advance_animations();
    }

    /// Handles a press on the backdrop. Returns `true` if the press did something.
    pub fn backdrop_pressed(&mut self) -> bool {
        let options = self.engine.options();
        if !self.mounted
            || !options.closable
            || !options.backdrop.enabled
            || options.backdrop.press == BackdropPress::Ignore
        {
            return false;
        }

        if let Some(callback) = &mut self.callbacks.on_backdrop_press {
            callback();
        } else {
            self.dismiss();
        }
        self.dispatch();
        true
    }

    /// Frame to draw, or `None` if nothing is mounted.
    pub fn frame(&self) -> Option<Frame> {
        self.mounted.then(|| {
            present(
                self.engine.state(),
                self.engine.mode(),
                self.engine.presented_options(),
                self.engine.view_size(),
            )
        })
    }

    /// Runs the commit context until both queues are empty.
    pub fn dispatch(&mut self) {
        loop {
            if let Ok(commit) = self.commits.try_recv() {
                self.apply_commit(commit);
                continue;
            }

            if let Ok(request) = self.requests.try_recv() {
                self.apply_request(request);
                continue;
            }

            self.reconcile();

            if self.commits.is_empty() && self.requests.is_empty() {
                break;
            }
        }
    }

    fn apply_commit(&mut self, commit: Commit) {
        debug!("applying {commit:?}");
        match commit {
            Commit::Mount => self.mount(),
            Commit::Shown => {
                if let Some(callback) = &mut self.callbacks.on_show {
                    callback();
                }
            }
            Commit::Hidden => {
                if let Some(callback) = &mut self.callbacks.on_hide {
                    callback();
                }
                self.unmount();
            }
            // A committed swipe consumes the visibility intent.
            Commit::Dismissing => self.handle.set_visible(false),
            Commit::Settled => (),
        }
    }

    fn apply_request(&mut self, request: Request) {
        trace!("applying {request:?}");
        match request {
            Request::Reconcile => (),
            Request::Dismiss => self.dismiss(),
        }
    }

    fn dismiss(&mut self) {
        if let Some(callback) = &mut self.callbacks.on_request_close {
            callback();
        } else {
            self.handle.set_visible(false);
        }
    }

    fn reconcile(&mut self) {
        let visible = self.handle.is_visible();
        match self.engine.mode() {
            Mode::Hidden if visible => {
                self.engine.open();
            }
            Mode::Shown if !visible => {
                self.engine.close();
            }
            _ => (),
        }
    }

    fn mount(&mut self) {
        if self.mounted {
            return;
        }

        let options = self.engine.options();
        let request = mount_request(options);
        let closable = options.closable;

        self.host.mount(&request);
        self.mounted = true;
        self.update_back_handler(closable);
    }

    fn unmount(&mut self) {
        if !self.mounted {
            return;
        }

        self.update_back_handler(false);
        self.host.unmount();
        self.mounted = false;
    }

    fn update_back_handler(&mut self, registered: bool) {
        match (registered, self.back_handler) {
            (true, None) => {
                let handle = self.handle.clone();
                let mode = self.engine.mode_cell().clone();
                // Presses during the exit animation are consumed rather than passed on.
                let token = self.host.register_back_handler(Box::new(move || {
                    handle.request_dismiss() || mode.get().is_closing()
                }));
                self.back_handler = Some(token);
            }
            (false, Some(token)) => {
                self.host.unregister_back_handler(token);
                self.back_handler = None;
            }
            _ => (),
        }
    }
}

fn mount_request(options: &Options) -> MountRequest {
    MountRequest {
        layer: if options.cover_screen {
            Layer::Inline
        } else {
            Layer::Overlay
        },
        ids: options.region_ids.clone(),
    }
}

impl<H: OverlayHost> Drop for ModalController<H> {
    fn drop(&mut self) {
        if let Some(token) = self.back_handler.take() {
            self.host.unregister_back_handler(token);
        }
    }
}
