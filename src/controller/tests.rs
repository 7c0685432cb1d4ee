use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use insta::assert_snapshot;
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use scrim_config::{AnimationKind, BackdropPart, Config, SwipePart};

use super::*;
use crate::host::{BackHandler, HeadlessHost, HostEvent};

/// Headless host that writes its events into a log shared with the callbacks.
struct LogHost {
    inner: HeadlessHost,
    log: Rc<RefCell<Vec<String>>>,
}

impl LogHost {
    fn record(&mut self) {
        let mut log = self.log.borrow_mut();
        log.extend(self.inner.take_events().iter().map(HostEvent::to_string));
    }
}

impl OverlayHost for LogHost {
    fn mount(&mut self, request: &MountRequest) {
        self.inner.mount(request);
        self.record();
    }

    fn unmount(&mut self) {
        self.inner.unmount();
        self.record();
    }

    fn register_back_handler(&mut self, handler: BackHandler) -> RegistrationToken {
        let token = self.inner.register_back_handler(handler);
        self.record();
        token
    }

    fn unregister_back_handler(&mut self, token: RegistrationToken) {
        self.inner.unregister_back_handler(token);
        self.record();
    }
}

struct Fixture {
    controller: ModalController<LogHost>,
    clock: Clock,
    now: Duration,
    log: Rc<RefCell<Vec<String>>>,
    shows: Rc<Cell<u32>>,
    hides: Rc<Cell<u32>>,
}

impl Fixture {
    fn new(config: Config) -> Self {
        let clock = Clock::with_time(Duration::ZERO);
        let log = Rc::new(RefCell::new(Vec::new()));
        let host = LogHost {
            inner: HeadlessHost::new(),
            log: log.clone(),
        };

        let mut controller = ModalController::new(host, &config, clock.clone());
        controller.set_view_size(Size::new(400., 800.));

        let shows = Rc::new(Cell::new(0));
        let hides = Rc::new(Cell::new(0));
        controller.on_show({
            let log = log.clone();
            let shows = shows.clone();
            move || {
                shows.set(shows.get() + 1);
                log.borrow_mut().push("on-show".to_owned());
            }
        });
        controller.on_hide({
            let log = log.clone();
            let hides = hides.clone();
            move || {
                hides.set(hides.get() + 1);
                log.borrow_mut().push("on-hide".to_owned());
            }
        });

        Self {
            controller,
            clock,
            now: Duration::ZERO,
            log,
            shows,
            hides,
        }
    }

    fn fade() -> Self {
        Self::new(Config::default())
    }

    /// Runs frames of 16 ms, advancing animations and dispatching commits.
    fn run(&mut self, ms: u64) {
        let mut left = ms;
        while left > 0 {
            let step = left.min(16);
            left -= step;
            self.now += Duration::from_millis(step);
            self.clock.set_unadjusted(self.now);
            self.controller.advance_animations();
            self.controller.dispatch();
        }
    }

    fn swipe(&mut self, dx: f64, dy: f64) {
        assert!(self.controller.drag_begin());
        self.controller.drag_update(dx, dy);
        self.controller.drag_end();
        self.controller.dispatch();
    }

    fn press_back(&mut self) -> bool {
        let handled = self.controller.host_mut().inner.press_back();
        self.controller.dispatch();
        handled
    }

    fn note(&self, line: &str) {
        self.log.borrow_mut().push(format!("-- {line}"));
    }

    fn take_log(&self) -> String {
        self.log.borrow_mut().drain(..).collect::<Vec<_>>().join("\n")
    }
}

#[test]
fn open_and_close() {
    let mut f = Fixture::fade();
    assert!(!f.controller.is_mounted());
    assert_eq!(f.controller.frame(), None);

    f.controller.set_visible(true);
    assert!(f.controller.is_mounted());
    assert_eq!(f.controller.mode(), Mode::Opening);
    assert_eq!(f.controller.frame().unwrap().progress, 0.);

    f.run(300);
    assert_eq!(f.controller.mode(), Mode::Shown);
    assert_eq!(f.controller.state().progress, 1.);
    f.note("shown");

    f.controller.set_visible(false);
    assert_eq!(f.controller.mode(), Mode::ClosingProgrammatic);
    f.run(300);
    assert_eq!(f.controller.mode(), Mode::Hidden);
    assert!(!f.controller.is_mounted());

    assert_snapshot!(f.take_log(), @r"
    mount overlay modal-container/modal-backdrop/modal-content
    register-back 1
    on-show
    -- shown
    on-hide
    unregister-back 1
    unmount
    ");
}

#[test]
fn on_show_fires_after_progress_reaches_one() {
    let mut f = Fixture::fade();
    f.controller.set_visible(true);
    f.run(288);
    assert_eq!(f.shows.get(), 0);
    assert!(f.controller.state().progress < 1.);

    f.run(16);
    assert_eq!(f.shows.get(), 1);
    assert_eq!(f.controller.state().progress, 1.);

    f.run(1000);
    assert_eq!(f.shows.get(), 1);
}

#[test]
fn swipe_dismiss_fires_on_hide_once() {
    let mut f = Fixture::fade();
    f.controller.set_visible(true);
    f.run(300);
    f.take_log();

    f.swipe(0., 120.);
    assert_eq!(f.controller.mode(), Mode::ClosingBySwipe);
    assert!(!f.controller.is_visible());
    assert!(f.controller.is_mounted());

    f.run(150);
    assert_eq!(f.controller.mode(), Mode::ClosingBySwipe);
    assert_eq!(f.hides.get(), 0);

    f.run(200);
    assert_eq!(f.controller.mode(), Mode::Hidden);
    assert_eq!(*f.controller.state(), TransitionState::default());
    assert_eq!(f.hides.get(), 1);

    f.run(1000);
    assert_eq!(f.hides.get(), 1);
    assert_eq!(f.controller.mode(), Mode::Hidden);

    assert_snapshot!(f.take_log(), @r"
    on-hide
    unregister-back 1
    unmount
    ");
}

#[test]
fn short_swipe_bounces_without_hiding() {
    let mut f = Fixture::fade();
    f.controller.set_visible(true);
    f.run(300);

    f.swipe(0., 40.);
    assert_eq!(f.controller.mode(), Mode::Bouncing);

    f.run(5000);
    assert_eq!(f.controller.mode(), Mode::Shown);
    assert_eq!(f.controller.state().offset_y, 0.);
    assert_eq!(f.controller.state().active_direction, None);
    assert!(f.controller.is_visible());
    assert_eq!(f.hides.get(), 0);
    assert_eq!(f.shows.get(), 1);
}

#[test]
fn hide_requested_during_bounce_closes_after_settling() {
    let mut f = Fixture::fade();
    f.controller.set_visible(true);
    f.run(300);

    f.swipe(0., 40.);
    f.controller.set_visible(false);
    assert_eq!(f.controller.mode(), Mode::Bouncing);

    f.run(5000);
    assert_eq!(f.controller.mode(), Mode::Hidden);
    assert_eq!(f.hides.get(), 1);
}

#[test]
fn rapid_toggles_complete_in_order() {
    let mut f = Fixture::fade();

    f.controller.set_visible(true);
    f.run(100);
    f.controller.set_visible(false);
    f.controller.set_visible(true);
    f.controller.set_visible(false);
    assert_eq!(f.controller.mode(), Mode::Opening);

    f.run(1000);
    assert_eq!(f.controller.mode(), Mode::Hidden);
    assert_eq!(f.shows.get(), 1);
    assert_eq!(f.hides.get(), 1);

    assert_snapshot!(f.take_log(), @r"
    mount overlay modal-container/modal-backdrop/modal-content
    register-back 1
    on-show
    on-hide
    unregister-back 1
    unmount
    ");
}

#[test]
fn reopening_from_on_hide_sees_clean_state() {
    let mut f = Fixture::fade();
    let handle = f.controller.handle();
    let reopened = Rc::new(Cell::new(false));
    f.controller.on_hide({
        let log = f.log.clone();
        let reopened = reopened.clone();
        move || {
            log.borrow_mut().push("on-hide".to_owned());
            if !reopened.replace(true) {
                handle.set_visible(true);
            }
        }
    });

    f.controller.set_visible(true);
    f.run(300);
    f.controller.set_visible(false);
    f.run(300);

    assert_eq!(f.controller.mode(), Mode::Opening);
    assert_eq!(f.controller.state().progress, 0.);
    assert!(f.controller.is_mounted());

    f.run(300);
    assert_eq!(f.controller.mode(), Mode::Shown);

    assert_snapshot!(f.take_log(), @r"
    mount overlay modal-container/modal-backdrop/modal-content
    register-back 1
    on-show
    on-hide
    unregister-back 1
    unmount
    mount overlay modal-container/modal-backdrop/modal-content
    register-back 2
    on-show
    ");
}

#[test]
fn back_press_dismisses() {
    let mut f = Fixture::fade();
    assert!(!f.press_back());

    f.controller.set_visible(true);
    f.run(300);
    assert!(f.press_back());
    assert!(!f.controller.is_visible());
    assert_eq!(f.controller.mode(), Mode::ClosingProgrammatic);

    f.run(300);
    assert_eq!(f.controller.mode(), Mode::Hidden);
    assert_eq!(f.controller.host().inner.back_handler_count(), 0);
    assert!(!f.press_back());
}

#[test]
fn back_press_while_closing_is_consumed() {
    let mut f = Fixture::fade();
    f.controller.set_visible(true);
    f.run(300);

    f.swipe(0., 200.);
    assert_eq!(f.controller.mode(), Mode::ClosingBySwipe);
    assert!(!f.controller.is_visible());
    assert!(f.press_back());
    assert_eq!(f.controller.mode(), Mode::ClosingBySwipe);

    f.run(1000);
    assert_eq!(f.controller.mode(), Mode::Hidden);
    assert_eq!(f.hides.get(), 1);
    assert!(!f.press_back());

    f.controller.set_visible(true);
    f.run(300);
    f.controller.set_visible(false);
    assert_eq!(f.controller.mode(), Mode::ClosingProgrammatic);
    assert!(f.press_back());
    f.run(300);
    assert_eq!(f.controller.mode(), Mode::Hidden);
    assert!(!f.controller.is_visible());
}

#[test]
fn back_press_while_opening_closes_once_shown() {
    let mut f = Fixture::fade();
    f.controller.set_visible(true);
    f.run(100);
    assert!(f.press_back());
    assert_eq!(f.controller.mode(), Mode::Opening);

    f.run(1000);
    assert_eq!(f.controller.mode(), Mode::Hidden);
    assert_eq!(f.shows.get(), 1);
    assert_eq!(f.hides.get(), 1);
}

#[test]
fn not_closable_ignores_back_backdrop_and_swipe() {
    let config = Config {
        closable: false,
        ..Default::default()
    };
    let mut f = Fixture::new(config);
    f.controller.set_visible(true);
    f.run(300);

    assert_eq!(f.controller.host().inner.back_handler_count(), 0);
    assert!(!f.press_back());
    assert!(!f.controller.backdrop_pressed());
    assert!(!f.controller.drag_begin());
    assert_eq!(f.controller.mode(), Mode::Shown);
    assert!(f.controller.is_visible());
}

#[test]
fn closable_change_updates_back_handler() {
    let mut f = Fixture::fade();
    f.controller.set_visible(true);
    f.run(300);
    assert_eq!(f.controller.host().inner.back_handler_count(), 1);

    let config = Config {
        closable: false,
        ..Default::default()
    };
    f.controller.set_config(&config);
    assert_eq!(f.controller.host().inner.back_handler_count(), 0);

    f.controller.set_config(&Config::default());
    assert_eq!(f.controller.host().inner.back_handler_count(), 1);
    assert_eq!(f.controller.mode(), Mode::Shown);
}

#[test]
fn on_request_close_takes_over_dismissal() {
    let mut f = Fixture::fade();
    let requests = Rc::new(Cell::new(0));
    f.controller.on_request_close({
        let requests = requests.clone();
        move || requests.set(requests.get() + 1)
    });

    f.controller.set_visible(true);
    f.run(300);

    assert!(f.press_back());
    assert!(f.controller.backdrop_pressed());
    f.run(300);
    assert_eq!(requests.get(), 2);
    assert_eq!(f.controller.mode(), Mode::Shown);
    assert!(f.controller.is_visible());

    // Swipes are not routed through the callback.
    f.swipe(0., 200.);
    f.run(300);
    assert_eq!(requests.get(), 2);
    assert_eq!(f.controller.mode(), Mode::Hidden);
}

#[test]
fn backdrop_press() {
    let mut f = Fixture::fade();
    assert!(!f.controller.backdrop_pressed());

    f.controller.set_visible(true);
    f.run(300);
    assert!(f.controller.backdrop_pressed());
    assert_eq!(f.controller.mode(), Mode::ClosingProgrammatic);
    f.run(300);
    assert_eq!(f.hides.get(), 1);
}

#[test]
fn backdrop_press_callback_and_ignore() {
    let mut f = Fixture::fade();
    let presses = Rc::new(Cell::new(0));
    f.controller.on_backdrop_press({
        let presses = presses.clone();
        move || presses.set(presses.get() + 1)
    });
    f.controller.set_visible(true);
    f.run(300);
    assert!(f.controller.backdrop_pressed());
    assert_eq!(presses.get(), 1);
    assert_eq!(f.controller.mode(), Mode::Shown);

    let config = Config {
        backdrop: BackdropPart {
            press: Some("ignore".to_owned()),
            ..Default::default()
        },
        ..Default::default()
    };
    f.controller.set_config(&config);
    assert!(!f.controller.backdrop_pressed());
    assert_eq!(presses.get(), 1);

    let config = Config {
        backdrop: BackdropPart::off(),
        ..Default::default()
    };
    f.controller.set_config(&config);
    assert!(!f.controller.backdrop_pressed());
    assert_eq!(f.controller.frame().unwrap().backdrop, None);
}

#[test]
fn cover_screen_mounts_inline() {
    let config = Config {
        cover_screen: true,
        ..Default::default()
    };
    let mut f = Fixture::new(config);
    f.controller.set_visible(true);
    assert_snapshot!(f.take_log(), @r"
    mount inline modal-container/modal-backdrop/modal-content
    register-back 1
    ");
}

#[test]
fn layer_change_while_mounted_remounts() {
    let mut f = Fixture::fade();
    f.controller.set_visible(true);
    f.run(300);
    f.take_log();

    f.controller.set_config(&Config::default());
    assert_eq!(f.take_log(), "");

    let config = Config {
        cover_screen: true,
        ..Default::default()
    };
    f.controller.set_config(&config);
    assert_eq!(f.controller.mode(), Mode::Shown);
    assert!(f.controller.is_mounted());
    assert_eq!(f.controller.host().inner.back_handler_count(), 1);
    assert_snapshot!(f.take_log(), @r"
    unregister-back 1
    unmount
    mount inline modal-container/modal-backdrop/modal-content
    register-back 2
    ");
}

#[test]
fn kind_change_replays_without_new_on_show() {
    let mut f = Fixture::fade();
    f.controller.set_visible(true);
    f.run(300);

    f.controller
        .set_config(&Config::default().with_animation(AnimationKind::Slide));
    assert_eq!(f.controller.mode(), Mode::Opening);
    let frame = f.controller.frame().unwrap();
    assert_eq!(frame.content.translate_y, 800.);

    f.run(300);
    assert_eq!(f.controller.mode(), Mode::Shown);
    assert_eq!(f.shows.get(), 1);
    assert_eq!(f.controller.frame().unwrap().content.translate_y, 0.);
}

#[test]
fn kind_change_while_opening_keeps_drawing_the_running_kind() {
    let mut f = Fixture::fade();
    f.controller.set_visible(true);
    f.run(144);
    let before = f.controller.frame().unwrap();

    f.controller
        .set_config(&Config::default().with_animation(AnimationKind::Slide));
    assert_eq!(f.controller.frame().unwrap(), before);
    assert_eq!(before.content.translate_y, 0.);

    f.run(156);
    assert_eq!(f.controller.mode(), Mode::Opening);
    assert_eq!(f.shows.get(), 1);
    assert_eq!(f.controller.frame().unwrap().content.translate_y, 800.);

    f.run(300);
    assert_eq!(f.controller.mode(), Mode::Shown);
    assert_eq!(f.shows.get(), 1);
    assert_eq!(f.controller.frame().unwrap().content.translate_y, 0.);
}

#[test]
fn kind_change_during_bounce_replays_after_settling() {
    let mut f = Fixture::fade();
    f.controller.set_visible(true);
    f.run(300);

    f.swipe(0., 40.);
    assert_eq!(f.controller.mode(), Mode::Bouncing);
    f.controller
        .set_config(&Config::default().with_animation(AnimationKind::Slide));

    let mut saw_opening = false;
    for _ in 0..200 {
        f.run(16);
        saw_opening |= f.controller.mode() == Mode::Opening;
    }
    assert!(saw_opening);
    assert_eq!(f.controller.mode(), Mode::Shown);
    assert_eq!(f.shows.get(), 1);
    assert_eq!(f.hides.get(), 0);
}

#[test]
fn frame_timeline() {
    let mut f = Fixture::new(Config::default().with_animation(AnimationKind::Slide));
    f.controller.set_visible(true);

    let mut lines = Vec::new();
    let mut sample = |f: &Fixture| {
        let frame = f.controller.frame().unwrap();
        lines.push(format!(
            "{} progress={:.2} backdrop={:.2} y={:.1}",
            frame.mode,
            frame.progress,
            frame.backdrop.map_or(0., |b| b.opacity),
            frame.content.translate_y,
        ));
    };

    sample(&f);
    f.run(300);
    sample(&f);
    f.controller.drag_begin();
    f.controller.drag_update(0., 160.);
    sample(&f);
    f.controller.drag_end();
    f.controller.dispatch();
    sample(&f);

    f.run(300);
    assert_eq!(f.controller.frame(), None);
    assert_snapshot!(lines.join("\n"), @r"
    opening progress=0.00 backdrop=0.00 y=800.0
    shown progress=1.00 backdrop=0.70 y=0.0
    swipe-tracking progress=1.00 backdrop=0.56 y=160.0
    closing-by-swipe progress=1.00 backdrop=0.56 y=160.0
    ");
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Op {
    SetVisible(bool),
    Advance(#[proptest(strategy = "1..400u64")] u64),
    DragBegin,
    DragUpdate {
        #[proptest(strategy = "-300f64..300.")]
        dx: f64,
        #[proptest(strategy = "-300f64..300.")]
        dy: f64,
    },
    DragEnd,
    Back,
    BackdropPress,
    SetKind(#[proptest(strategy = "0..4usize")] usize),
    Resize {
        #[proptest(strategy = "100f64..2000.")]
        w: f64,
        #[proptest(strategy = "100f64..2000.")]
        h: f64,
    },
}

impl Op {
    fn apply(self, f: &mut Fixture) {
        match self {
            Op::SetVisible(visible) => f.controller.set_visible(visible),
            Op::Advance(ms) => f.run(ms),
            Op::DragBegin => {
                f.controller.drag_begin();
            }
            Op::DragUpdate { dx, dy } => {
                f.controller.drag_update(dx, dy);
            }
            Op::DragEnd => {
                f.controller.drag_end();
                f.controller.dispatch();
            }
            Op::Back => {
                f.press_back();
            }
            Op::BackdropPress => {
                f.controller.backdrop_pressed();
            }
            Op::SetKind(idx) => {
                let kind = [
                    AnimationKind::Fade,
                    AnimationKind::Slide,
                    AnimationKind::Scale,
                    AnimationKind::Custom,
                ][idx];
                f.controller
                    .set_config(&Config::default().with_animation(kind));
            }
            Op::Resize { w, h } => f.controller.set_view_size(Size::new(w, h)),
        }
    }
}

#[track_caller]
fn check_invariants(f: &Fixture) {
    let mode = f.controller.mode();
    let state = f.controller.state();

    assert!((0. ..=1.).contains(&state.progress), "{state:?}");
    assert_eq!(f.controller.is_mounted(), mode != Mode::Hidden, "{mode}");
    assert_eq!(
        f.controller.host().inner.mounted().is_some(),
        f.controller.is_mounted()
    );
    assert_eq!(state.active_direction.is_some(), mode.is_gesture_driven(), "{mode} {state:?}");
    if mode == Mode::Hidden {
        assert_eq!(*state, TransitionState::default());
    }

    let shows = f.shows.get();
    let hides = f.hides.get();
    assert!(shows == hides || shows == hides + 1, "{shows} shows, {hides} hides");
}

fn check_ops(ops: &[Op]) -> Fixture {
    let mut f = Fixture::fade();
    for op in ops {
        op.apply(&mut f);
        check_invariants(&f);
    }
    f
}

#[test]
fn basic_ops() {
    let ops = [
        Op::SetVisible(true),
        Op::Advance(50),
        Op::DragBegin,
        Op::DragUpdate { dx: 0., dy: 150. },
        Op::Advance(300),
        Op::SetVisible(false),
        Op::Advance(300),
        Op::SetKind(1),
        Op::DragEnd,
        Op::Advance(400),
    ];
    let f = check_ops(&ops);
    assert_eq!(f.controller.mode(), Mode::Hidden);
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: if std::env::var_os("RUN_SLOW_TESTS").is_none() {
            eprintln!("ignoring slow test");
            64
        } else {
            2048
        },
        ..ProptestConfig::default()
    })]

    #[test]
    fn random_operations_keep_invariants(ops: Vec<Op>) {
        let mut f = check_ops(&ops);

        // Release any drag and let everything settle closed.
        f.controller.drag_end();
        f.controller.set_visible(false);
        for _ in 0..3 {
            f.run(10_000);
            check_invariants(&f);
        }

        prop_assert_eq!(f.controller.mode(), Mode::Hidden);
        prop_assert_eq!(f.shows.get(), f.hides.get());
    }
}

#[test]
fn swipe_disabled_directions() {
    let config = Config {
        swipe: SwipePart::directions([scrim_config::SwipeDirection::Up]),
        ..Default::default()
    };
    let mut f = Fixture::new(config);
    f.controller.set_visible(true);
    f.run(300);

    f.swipe(0., 300.);
    assert_eq!(f.controller.mode(), Mode::Shown);
    f.swipe(0., -300.);
    assert_eq!(f.controller.mode(), Mode::ClosingBySwipe);
}
