//! Declarative configuration for scrim modals.
//!
//! The `*Part` types mirror what a user writes, with every field optional. Normalizing a part
//! produces the fully-populated record the transition engine consumes. Normalization never fails:
//! malformed values are coerced to their defaults and logged.

use std::fs;
use std::path::Path;

use miette::{Context as _, IntoDiagnostic as _};
use tracing::debug;

pub mod animation;
pub mod backdrop;
pub mod direction;
pub mod swipe;
mod utils;

pub use crate::animation::{
    normalize_animation, AnimationConfig, AnimationKind, AnimationPart, SlideDirection,
    SlideDirectionPart,
};
pub use crate::backdrop::{BackdropConfig, BackdropPart, BackdropPress, Color};
pub use crate::direction::{SwipeDirection, SwipeDirections};
pub use crate::swipe::{DirectionList, SpringParams, SpringPart, SwipeConfig, SwipePart};
pub use crate::utils::{FloatOrInt, Number};

pub const DEFAULT_BACKDROP_ID: &str = "modal-backdrop";
pub const DEFAULT_CONTENT_ID: &str = "modal-content";
pub const DEFAULT_CONTAINER_ID: &str = "modal-container";

/// Top-level modal configuration.
#[derive(knuffel::Decode, Debug, Clone, PartialEq)]
pub struct Config {
    #[knuffel(child)]
    pub animation: Option<AnimationPart>,
    #[knuffel(child, default)]
    pub swipe: SwipePart,
    #[knuffel(child, default)]
    pub backdrop: BackdropPart,
    #[knuffel(child, unwrap(argument), default = true)]
    pub closable: bool,
    #[knuffel(child, unwrap(argument), default)]
    pub cover_screen: bool,
    #[knuffel(child, default)]
    pub region_ids: RegionIds,
}

/// Identifiers of the regions a modal mounts, for locating them from a test harness.
#[derive(knuffel::Decode, Debug, Clone, PartialEq, Eq)]
pub struct RegionIds {
    #[knuffel(property, default = DEFAULT_BACKDROP_ID.to_owned())]
    pub backdrop: String,
    #[knuffel(property, default = DEFAULT_CONTENT_ID.to_owned())]
    pub content: String,
    #[knuffel(property, default = DEFAULT_CONTAINER_ID.to_owned())]
    pub container: String,
}

impl Default for RegionIds {
    fn default() -> Self {
        Self {
            backdrop: DEFAULT_BACKDROP_ID.to_owned(),
            content: DEFAULT_CONTENT_ID.to_owned(),
            container: DEFAULT_CONTAINER_ID.to_owned(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            animation: None,
            swipe: SwipePart::default(),
            backdrop: BackdropPart::default(),
            closable: true,
            cover_screen: false,
            region_ids: RegionIds::default(),
        }
    }
}

impl Config {
    pub fn parse(filename: &str, text: &str) -> Result<Self, knuffel::Error> {
        knuffel::parse(filename, text)
    }

    pub fn load(path: &Path) -> miette::Result<Self> {
        let contents = fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("error reading {path:?}"))?;

        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("config.kdl");
        let config = Self::parse(filename, &contents).context("error parsing")?;
        debug!("loaded config from {path:?}");
        Ok(config)
    }

    /// Loads the config at `path`, or returns the defaults if the file does not exist.
    pub fn load_or_default(path: &Path) -> miette::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("config file {path:?} not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn with_animation(mut self, animation: impl Into<AnimationPart>) -> Self {
        self.animation = Some(animation.into());
        self
    }
}
