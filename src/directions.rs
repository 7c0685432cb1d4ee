//! Resolution of swipe directions from the normalized configuration.

use scrim_config::{
    AnimationConfig, AnimationKind, SlideDirection, SwipeConfig, SwipeDirection, SwipeDirections,
};

/// Returns the directions in which the content can be swiped away.
///
/// Explicit swipe directions win. Otherwise a slide animation dismisses towards its `end`
/// directions (or its single direction), and anything else uses `fallback`.
pub fn dismiss_directions(
    swipe: &SwipeConfig,
    animation: &AnimationConfig,
    fallback: SwipeDirections,
) -> SwipeDirections {
    if !swipe.directions.is_empty() {
        return swipe.directions;
    }

    if animation.kind == AnimationKind::Slide {
        match animation.direction {
            Some(SlideDirection::Single(dir)) => return dir.into(),
            Some(SlideDirection::Split { end, .. }) if !end.is_empty() => return end,
            _ => (),
        }
    }

    fallback
}

/// Returns the direction the content slides in from.
pub fn entry_direction(animation: &AnimationConfig, fallback: SwipeDirection) -> SwipeDirection {
    if animation.kind != AnimationKind::Slide {
        return fallback;
    }

    match animation.direction {
        Some(SlideDirection::Single(dir)) => dir,
        Some(SlideDirection::Split { start, .. }) => start,
        None => fallback,
    }
}
