use scrim_config::{
    normalize_animation, AnimationConfig, AnimationKind, BackdropConfig, Config, RegionIds,
    SwipeConfig, SwipeDirection, SwipeDirections,
};

use crate::directions::{dismiss_directions, entry_direction};

/// Fully resolved modal options, derived from a [`Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub animation: AnimationConfig,
    pub swipe: SwipeConfig,
    pub backdrop: BackdropConfig,
    pub dismiss_directions: SwipeDirections,
    pub entry_direction: SwipeDirection,
    pub closable: bool,
    pub cover_screen: bool,
    pub region_ids: RegionIds,
}

impl Default for Options {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Options {
    pub fn from_config(config: &Config) -> Self {
        let animation = normalize_animation(config.animation.as_ref());
        let swipe = config.swipe.normalize();

        Self {
            dismiss_directions: dismiss_directions(&swipe, &animation, SwipeDirections::DOWN),
            entry_direction: entry_direction(&animation, SwipeDirection::Down),
            animation,
            swipe,
            backdrop: config.backdrop.normalize(),
            closable: config.closable,
            cover_screen: config.cover_screen,
            region_ids: config.region_ids.clone(),
        }
    }

    pub fn kind(&self) -> AnimationKind {
        self.animation.kind
    }

    /// Whether a drag gesture may dismiss the modal.
    pub fn swipe_enabled(&self) -> bool {
        self.closable && self.swipe.enabled && !self.dismiss_directions.is_empty()
    }
}
