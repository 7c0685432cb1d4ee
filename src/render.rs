//! Mapping from transition state to what the host draws.

use scrim_config::{AnimationKind, Color};
use serde::Serialize;

use crate::geometry::{clamp01, lerp, Offset, Size};
use crate::options::Options;
use crate::transition::{axis_distance, off_screen_target, Mode, TransitionState};

/// Everything the host needs to draw one frame of the modal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub mode: Mode,
    pub progress: f64,
    /// `None` when the backdrop is off.
    pub backdrop: Option<BackdropFrame>,
    pub content: ContentFrame,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BackdropFrame {
    pub color: Color,
    pub opacity: f64,
    /// The host draws its own backdrop content with this opacity.
    pub custom: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContentFrame {
    pub opacity: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl ContentFrame {
    pub const IDENTITY: Self = Self {
        opacity: 1.,
        translate_x: 0.,
        translate_y: 0.,
        scale: 1.,
    };

    fn translated(offset: Offset, opacity: f64) -> Self {
        Self {
            opacity,
            translate_x: offset.x,
            translate_y: offset.y,
            scale: 1.,
        }
    }
}

/// Computes the frame for the given state.
pub fn present(state: &TransitionState, mode: Mode, options: &Options, view_size: Size) -> Frame {
    let progress = clamp01(state.progress);
    let swipe_fade = swipe_fade_fraction(state, view_size);

    let backdrop = options.backdrop.enabled.then(|| {
        let configured = options.backdrop.opacity;
        let mut base = configured * (1. - swipe_fade);
        // Snap back to the full opacity as the bounce spring settles near zero offset.
        if mode == Mode::Bouncing && configured - base <= options.swipe.bounce_opacity_epsilon {
            base = configured;
        }

        BackdropFrame {
            color: options.backdrop.color,
            opacity: lerp(0., base, progress),
            custom: options.backdrop.custom,
        }
    });

    let kind = options.kind();
    let content = if state.active_direction.is_some() {
        let opacity = if kind == AnimationKind::Fade {
            progress
        } else {
            1.
        };
        ContentFrame::translated(state.offset(), opacity)
    } else {
        match kind {
            AnimationKind::Fade => ContentFrame {
                opacity: progress,
                ..ContentFrame::IDENTITY
            },
            AnimationKind::Scale => {
                let from = options.animation.scale_factor.unwrap_or(1.);
                ContentFrame {
                    opacity: progress,
                    scale: lerp(from, 1., progress),
                    ..ContentFrame::IDENTITY
                }
            }
            AnimationKind::Slide => {
                let entry = off_screen_target(options.entry_direction, view_size);
                let offset = Offset::new(lerp(entry.x, 0., progress), lerp(entry.y, 0., progress));
                ContentFrame::translated(offset, 1.)
            }
            AnimationKind::Custom => ContentFrame::IDENTITY,
        }
    };

    Frame {
        mode,
        progress,
        backdrop,
        content,
    }
}

/// Fraction of the screen extent travelled along the active direction.
fn swipe_fade_fraction(state: &TransitionState, view_size: Size) -> f64 {
    let Some(direction) = state.active_direction else {
        return 0.;
    };

    let extent = if direction.is_horizontal() {
        view_size.w
    } else {
        view_size.h
    };
    if extent <= 0. {
        return 0.;
    }

    clamp01(axis_distance(direction, state.offset()).abs() / extent)
}
