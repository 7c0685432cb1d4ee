//! Scripted sessions against a headless host.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use scrim_config::Config;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::animation::Clock;
use crate::controller::ModalController;
use crate::geometry::Size;
use crate::host::{HeadlessHost, HostEvent};
use crate::render::Frame;
use crate::transition::{Mode, TransitionState};

/// Frame interval of a replay.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// One step of a script.
///
/// ```json
/// [{"visible": true}, {"advance": 300}, "drag-begin", {"drag-update": [0, 120]}, "drag-end"]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    Visible(bool),
    /// Runs frames for this many milliseconds.
    Advance(u64),
    DragBegin,
    DragUpdate(f64, f64),
    DragEnd,
    Back,
    BackdropPress,
    Resize(f64, f64),
}

/// What happened in one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub time_ms: u64,
    pub visible: bool,
    pub mode: Mode,
    pub state: TransitionState,
    pub frame: Option<Frame>,
    pub host: Vec<String>,
    pub callbacks: Vec<&'static str>,
}

pub fn parse_script(text: &str) -> serde_json::Result<Vec<Step>> {
    serde_json::from_str(text)
}

pub struct Replay {
    controller: ModalController<HeadlessHost>,
    clock: Clock,
    now: Duration,
    callbacks: Rc<RefCell<Vec<&'static str>>>,
}

impl Replay {
    pub fn new(config: &Config, view_size: Size) -> Self {
        let clock = Clock::with_time(Duration::ZERO);
        let mut controller = ModalController::new(HeadlessHost::new(), config, clock.clone());
        controller.set_view_size(view_size);

        let callbacks = Rc::new(RefCell::new(Vec::new()));
        controller.on_show({
            let callbacks = callbacks.clone();
            move || {
                info!("modal shown");
                callbacks.borrow_mut().push("on-show");
            }
        });
        controller.on_hide({
            let callbacks = callbacks.clone();
            move || {
                info!("modal hidden");
                callbacks.borrow_mut().push("on-hide");
            }
        });

        Self {
            controller,
            clock,
            now: Duration::ZERO,
            callbacks,
        }
    }

    pub fn controller(&self) -> &ModalController<HeadlessHost> {
        &self.controller
    }

    /// Applies the steps, emitting a record after every step and every frame.
    pub fn run(&mut self, steps: &[Step], mut emit: impl FnMut(Record)) {
        for step in steps {
            match *step {
                Step::Advance(ms) => {
                    let end = self.now + Duration::from_millis(ms);
                    while self.now < end {
                        self.now = (self.now + FRAME_INTERVAL).min(end);
                        self.clock.set_unadjusted(self.now);
                        self.controller.advance_animations();
                        self.controller.dispatch();
                        emit(self.record());
                    }
                }
                step => {
                    self.apply(step);
                    emit(self.record());
                }
            }
        }
    }

    fn apply(&mut self, step: Step) {
        match step {
            Step::Visible(visible) => self.controller.set_visible(visible),
            Step::Advance(_) => (),
            Step::DragBegin => {
                self.controller.drag_begin();
            }
            Step::DragUpdate(dx, dy) => {
                self.controller.drag_update(dx, dy);
            }
            Step::DragEnd => {
                self.controller.drag_end();
                self.controller.dispatch();
            }
            Step::Back => {
                self.controller.host_mut().press_back();
                self.controller.dispatch();
            }
            Step::BackdropPress => {
                self.controller.backdrop_pressed();
            }
            Step::Resize(w, h) => self.controller.set_view_size(Size::new(w, h)),
        }
    }

    fn record(&mut self) -> Record {
        let host = self
            .controller
            .host_mut()
            .take_events()
            .iter()
            .map(HostEvent::to_string)
            .collect();

        Record {
            time_ms: u64::try_from(self.now.as_millis()).unwrap_or(u64::MAX),
            visible: self.controller.is_visible(),
            mode: self.controller.mode(),
            state: *self.controller.state(),
            frame: self.controller.frame(),
            host,
            callbacks: self.callbacks.borrow_mut().drain(..).collect(),
        }
    }
}
