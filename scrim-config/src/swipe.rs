use knuffel::errors::DecodeError;
use tracing::warn;

use crate::direction::decode_direction;
use crate::utils::Number;
use crate::{SwipeDirection, SwipeDirections};

pub const DEFAULT_SWIPE_THRESHOLD: f64 = 100.;
pub const DEFAULT_BOUNCE_OPACITY_EPSILON: f64 = 0.05;

/// Swipe-to-dismiss settings as written by the user.
///
/// ```kdl
/// swipe {
///     directions "down" "left"
///     threshold 120
///     bounce-spring damping-ratio=1.0 stiffness=200 epsilon=0.0001
/// }
/// ```
#[derive(knuffel::Decode, Debug, Default, Clone, PartialEq)]
pub struct SwipePart {
    /// Disables swiping altogether; the other fields are then ignored.
    #[knuffel(child)]
    pub off: bool,
    #[knuffel(child)]
    pub directions: Option<DirectionList>,
    #[knuffel(child, unwrap(argument))]
    pub threshold: Option<Number>,
    #[knuffel(child)]
    pub bounce_spring: Option<SpringPart>,
    #[knuffel(child, unwrap(argument))]
    pub bounce_opacity_epsilon: Option<Number>,
}

/// Unknown directions are dropped with a warning.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirectionList {
    pub directions: Vec<SwipeDirection>,
}

#[derive(knuffel::Decode, Debug, Default, Clone, Copy, PartialEq)]
pub struct SpringPart {
    #[knuffel(property)]
    pub damping_ratio: Option<Number>,
    #[knuffel(property)]
    pub stiffness: Option<Number>,
    #[knuffel(property)]
    pub epsilon: Option<Number>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeConfig {
    pub enabled: bool,
    /// Explicit dismiss directions. Empty means "derive from the animation".
    pub directions: SwipeDirections,
    /// Distance in logical pixels that commits a dismissal.
    pub threshold: f64,
    pub bounce_spring: SpringParams,
    /// How close to fully opaque the backdrop must be during a bounce to snap back to opaque.
    pub bounce_opacity_epsilon: f64,
}

/// Bounce-back spring settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    pub damping_ratio: f64,
    pub stiffness: f64,
    pub epsilon: f64,
}

impl Default for SpringParams {
    fn default() -> Self {
        // Critically damped, so the offset never overshoots past zero.
        Self {
            damping_ratio: 1.,
            stiffness: 200.,
            epsilon: 0.0001,
        }
    }
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directions: SwipeDirections::empty(),
            threshold: DEFAULT_SWIPE_THRESHOLD,
            bounce_spring: SpringParams::default(),
            bounce_opacity_epsilon: DEFAULT_BOUNCE_OPACITY_EPSILON,
        }
    }
}

impl SwipeConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

impl SwipePart {
    pub fn off() -> Self {
        Self {
            off: true,
            ..Default::default()
        }
    }

    pub fn directions(directions: impl IntoIterator<Item = SwipeDirection>) -> Self {
        Self {
            directions: Some(DirectionList {
                directions: directions.into_iter().collect(),
            }),
            ..Default::default()
        }
    }

    pub fn normalize(&self) -> SwipeConfig {
        if self.off {
            return SwipeConfig::disabled();
        }

        let mut config = SwipeConfig::default();

        if let Some(list) = &self.directions {
            config.directions = list.directions.iter().copied().collect();
        }

        if let Some(threshold) = self.threshold {
            match threshold.finite() {
                Some(threshold) if threshold > 0. => config.threshold = threshold,
                _ => warn!("swipe threshold must be positive, got {}", threshold.0),
            }
        }

        if let Some(spring) = &self.bounce_spring {
            config.bounce_spring = spring.normalize();
        }

        if let Some(epsilon) = self.bounce_opacity_epsilon.and_then(Number::finite) {
            config.bounce_opacity_epsilon = epsilon.max(0.);
        }

        config
    }
}

impl SpringPart {
    /// Non-positive damping or stiffness would leave the spring frozen in place, so those fall
    /// back to the defaults.
    pub fn normalize(&self) -> SpringParams {
        let defaults = SpringParams::default();
        SpringParams {
            damping_ratio: positive_or(self.damping_ratio, "damping-ratio", defaults.damping_ratio),
            stiffness: positive_or(self.stiffness, "stiffness", defaults.stiffness),
            epsilon: self
                .epsilon
                .and_then(Number::finite)
                .map_or(defaults.epsilon, |x| x.max(0.)),
        }
    }
}

fn positive_or(value: Option<Number>, name: &str, default: f64) -> f64 {
    let Some(value) = value else {
        return default;
    };

    match value.finite() {
        Some(x) if x > 0. => x,
        _ => {
            warn!("bounce spring {name} must be positive, got {}", value.0);
            default
        }
    }
}

impl<S: knuffel::traits::ErrorSpan> knuffel::Decode<S> for DirectionList {
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

        for (name, _) in &node.properties {
            ctx.emit_error(DecodeError::unexpected(
                name,
                "property",
                "no properties expected for this node",
            ));
        }

        if let Some(child) = node.children().next() {
            ctx.emit_error(DecodeError::unexpected(
                child,
                "node",
                "no children expected for this node",
            ));
        }

        let directions = node.arguments.iter().filter_map(decode_direction).collect();
        Ok(Self { directions })
    }
}
