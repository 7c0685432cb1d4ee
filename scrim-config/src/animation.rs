use std::fmt;
use std::str::FromStr;

use knuffel::errors::DecodeError;
use tracing::warn;

use crate::direction::decode_direction;
use crate::utils::Number;
use crate::{FloatOrInt, SwipeDirection, SwipeDirections};

pub const DEFAULT_DURATION_MS: u32 = 300;
pub const DEFAULT_SCALE_FACTOR: f64 = 0.8;
pub const DEFAULT_SLIDE_DIRECTION: SwipeDirection = SwipeDirection::Down;

/// How the content enters and leaves the screen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    #[default]
    Fade,
    Slide,
    Scale,
    /// Progress is driven as usual but the host animates the content itself.
    Custom,
}

impl AnimationKind {
    pub fn name(self) -> &'static str {
        match self {
            AnimationKind::Fade => "fade",
            AnimationKind::Slide => "slide",
            AnimationKind::Scale => "scale",
            AnimationKind::Custom => "custom",
        }
    }
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnimationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fade" => Ok(Self::Fade),
            "slide" => Ok(Self::Slide),
            "scale" => Ok(Self::Scale),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("unknown animation kind: {s:?}")),
        }
    }
}

/// Animation settings as written by the user. Every field is optional.
///
/// ```kdl
/// animation "slide" {
///     duration-ms 250
///     direction start="down" {
///         end "down" "left"
///     }
/// }
/// ```
#[derive(knuffel::Decode, Debug, Default, Clone, PartialEq)]
pub struct AnimationPart {
    /// Kept as a string so that unknown kinds can fall back to fade instead of failing to parse.
    #[knuffel(argument)]
    pub kind: Option<String>,
    /// Decimal durations are rounded to whole milliseconds.
    #[knuffel(child, unwrap(argument))]
    pub duration_ms: Option<Number>,
    #[knuffel(child)]
    pub direction: Option<SlideDirectionPart>,
    #[knuffel(child, unwrap(argument))]
    pub scale_factor: Option<Number>,
}

/// Slide direction as written by the user: either a bare direction, or a `start` property with
/// an `end` child listing the dismiss directions.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SlideDirectionPart {
    pub bare: Option<SwipeDirection>,
    pub start: Option<SwipeDirection>,
    pub end: Vec<SwipeDirection>,
}

/// Fully resolved animation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    pub kind: AnimationKind,
    pub duration_ms: u32,
    pub direction: Option<SlideDirection>,
    pub scale_factor: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    /// Slides in from and is dismissed towards the same direction.
    Single(SwipeDirection),
    /// Slides in from `start`, can be dismissed towards any of `end`.
    Split {
        start: SwipeDirection,
        end: SwipeDirections,
    },
}

impl AnimationConfig {
    /// Per-kind defaults.
    pub fn defaults_for(kind: AnimationKind) -> Self {
        let mut config = Self {
            kind,
            duration_ms: DEFAULT_DURATION_MS,
            direction: None,
            scale_factor: None,
        };

        match kind {
            AnimationKind::Slide => {
                config.direction = Some(SlideDirection::Single(DEFAULT_SLIDE_DIRECTION));
            }
            AnimationKind::Scale => config.scale_factor = Some(DEFAULT_SCALE_FACTOR),
            AnimationKind::Fade | AnimationKind::Custom => (),
        }

        config
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self::defaults_for(AnimationKind::Fade)
    }
}

impl AnimationPart {
    pub fn kind(kind: AnimationKind) -> Self {
        Self {
            kind: Some(kind.name().to_owned()),
            ..Default::default()
        }
    }

    /// Merges the explicit fields over the defaults of the requested kind.
    ///
    /// Never fails: unknown kinds become fade, and out-of-range values are replaced with the
    /// kind's defaults.
    pub fn normalize(&self) -> AnimationConfig {
        let kind = match self.kind.as_deref() {
            None => AnimationKind::Fade,
            Some(name) => name.parse().unwrap_or_else(|_| {
                warn!("unknown animation kind {name:?}, falling back to fade");
                AnimationKind::Fade
            }),
        };

        let mut config = AnimationConfig::defaults_for(kind);

        if let Some(ms) = self.duration_ms {
            match ms.finite() {
                // At least 1 ms after rounding.
                Some(ms) if ms > 0. => config.duration_ms = ms.round().clamp(1., 1e9) as u32,
                _ => warn!("animation duration must be positive, got {}ms", ms.0),
            }
        }

        if let Some(direction) = self.direction.as_ref().and_then(SlideDirectionPart::normalize) {
            config.direction = Some(direction);
        }

        if let Some(factor) = self.scale_factor {
            let factor = factor.0;
            if factor.is_finite() && factor > 0. && factor <= 1. {
                config.scale_factor = Some(factor);
            } else {
                warn!("scale factor must be in (0, 1], got {factor}");
            }
        }

        config
    }
}

/// Normalizes an optional animation part; a missing part means fade with defaults.
pub fn normalize_animation(part: Option<&AnimationPart>) -> AnimationConfig {
    part.map(AnimationPart::normalize).unwrap_or_default()
}

impl From<AnimationKind> for AnimationPart {
    fn from(kind: AnimationKind) -> Self {
        Self::kind(kind)
    }
}

impl From<&AnimationConfig> for AnimationPart {
    fn from(config: &AnimationConfig) -> Self {
        Self {
            kind: Some(config.kind.name().to_owned()),
            duration_ms: Some(FloatOrInt(f64::from(config.duration_ms))),
            direction: config.direction.map(SlideDirectionPart::from),
            scale_factor: config.scale_factor.map(FloatOrInt),
        }
    }
}

impl SlideDirectionPart {
    pub fn single(direction: SwipeDirection) -> Self {
        Self {
            bare: Some(direction),
            ..Default::default()
        }
    }

    pub fn split(start: SwipeDirection, end: impl IntoIterator<Item = SwipeDirection>) -> Self {
        Self {
            bare: None,
            start: Some(start),
            end: end.into_iter().collect(),
        }
    }

    fn normalize(&self) -> Option<SlideDirection> {
        if self.start.is_none() && self.end.is_empty() {
            return self.bare.map(SlideDirection::Single);
        }

        let start = self
            .start
            .or(self.bare)
            .unwrap_or(DEFAULT_SLIDE_DIRECTION);
        let end: SwipeDirections = self.end.iter().copied().collect();
        if end.is_empty() {
            Some(SlideDirection::Single(start))
        } else {
            Some(SlideDirection::Split { start, end })
        }
    }
}

impl From<SlideDirection> for SlideDirectionPart {
    fn from(direction: SlideDirection) -> Self {
        match direction {
            SlideDirection::Single(dir) => Self::single(dir),
            SlideDirection::Split { start, end } => Self::split(start, end.directions()),
        }
    }
}

impl<S: knuffel::traits::ErrorSpan> knuffel::Decode<S> for SlideDirectionPart {
    fn decode_node(
        node: &knuffel::ast::SpannedNode<S>,
        ctx: &mut knuffel::decode::Context<S>,
    ) -> Result<Self, DecodeError<S>> {
        if let Some(type_name) = &node.type_name {
            ctx.emit_error(DecodeError::unexpected(
                type_name,
                "type name",
                "no type name expected for this node",
            ));
        }

        let mut part = Self::default();

        let mut arguments = node.arguments.iter();
        if let Some(val) = arguments.next() {
            part.bare = decode_direction(val);
        }
        for val in arguments {
            ctx.emit_error(DecodeError::unexpected(
                &val.literal,
                "argument",
                "only a single bare direction is allowed",
            ));
        }

        for (name, val) in &node.properties {
            match &***name {
                "start" => part.start = decode_direction(val),
                name_str => {
                    ctx.emit_error(DecodeError::unexpected(
                        name,
                        "property",
                        format!("unexpected property `{}`", name_str.escape_default()),
                    ));
                }
            }
        }

        for child in node.children() {
            match &**child.node_name {
                "end" => {
                    part.end.extend(child.arguments.iter().filter_map(decode_direction));
                }
                name_str => {
                    ctx.emit_error(DecodeError::unexpected(
                        child,
                        "node",
                        format!("unexpected node `{}`", name_str.escape_default()),
                    ));
                }
            }
        }

        Ok(part)
    }
}
