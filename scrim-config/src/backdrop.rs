use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::warn;

use crate::utils::Number;

pub const DEFAULT_BACKDROP_OPACITY: f64 = 0.7;

/// Backdrop settings as written by the user.
#[derive(knuffel::Decode, Debug, Default, Clone, PartialEq)]
pub struct BackdropPart {
    /// No backdrop at all.
    #[knuffel(child)]
    pub off: bool,
    /// The host draws its own backdrop content; only opacity is driven.
    #[knuffel(child)]
    pub custom: bool,
    #[knuffel(child, unwrap(argument))]
    pub color: Option<String>,
    #[knuffel(child, unwrap(argument))]
    pub opacity: Option<Number>,
    /// Kept as a string so that unknown values can fall back to dismiss.
    #[knuffel(child, unwrap(argument))]
    pub press: Option<String>,
}

/// What pressing the backdrop does.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BackdropPress {
    /// Dismisses the modal, or calls the backdrop press callback if one is installed.
    #[default]
    Dismiss,
    Ignore,
}

impl BackdropPress {
    pub fn name(self) -> &'static str {
        match self {
            BackdropPress::Dismiss => "dismiss",
            BackdropPress::Ignore => "ignore",
        }
    }
}

impl fmt::Display for BackdropPress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackdropPress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dismiss" => Ok(Self::Dismiss),
            "ignore" => Ok(Self::Ignore),
            _ => Err(format!("unknown backdrop press behavior: {s:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackdropConfig {
    pub enabled: bool,
    pub custom: bool,
    pub color: Color,
    pub opacity: f64,
    pub press: BackdropPress,
}

/// RGBA color with components in 0..=1, not premultiplied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::from_array([0., 0., 0., 1.]);

    pub const fn from_array([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl FromStr for Color {
    type Err = csscolorparser::ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let color = csscolorparser::parse(s)?;
        Ok(Self::from_array(color.to_array()))
    }
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            custom: false,
            color: Color::BLACK,
            opacity: DEFAULT_BACKDROP_OPACITY,
            press: BackdropPress::Dismiss,
        }
    }
}

impl BackdropPart {
    pub fn off() -> Self {
        Self {
            off: true,
            ..Default::default()
        }
    }

    pub fn normalize(&self) -> BackdropConfig {
        let mut config = BackdropConfig {
            enabled: !self.off,
            custom: self.custom,
            ..Default::default()
        };

        if let Some(color) = &self.color {
            match color.parse() {
                Ok(color) => config.color = color,
                Err(err) => warn!("invalid backdrop color {color:?}, using black: {err}"),
            }
        }

        if let Some(opacity) = self.opacity {
            match opacity.finite() {
                Some(opacity) => config.opacity = opacity.clamp(0., 1.),
                None => warn!("invalid backdrop opacity, using {DEFAULT_BACKDROP_OPACITY}"),
            }
        }

        if let Some(press) = &self.press {
            match press.parse() {
                Ok(press) => config.press = press,
                Err(err) => warn!("{err}, using dismiss"),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::FloatOrInt;

    #[test]
    fn off_keeps_defaults() {
        assert_eq!(
            BackdropPart::off().normalize(),
            BackdropConfig {
                enabled: false,
                ..Default::default()
            }
        );
    }

    #[test]
    fn custom_values() {
        let part = BackdropPart {
            color: Some("red".to_owned()),
            opacity: Some(FloatOrInt(0.5)),
            ..Default::default()
        };
        let config = part.normalize();
        assert!(config.enabled);
        assert_eq!(config.color, Color::from_array([1., 0., 0., 1.]));
        assert_eq!(config.opacity, 0.5);
    }

    #[test]
    fn malformed_values_are_coerced() {
        let part = BackdropPart {
            color: Some("not a color".to_owned()),
            opacity: Some(FloatOrInt(3.)),
            press: Some("sometimes".to_owned()),
            ..Default::default()
        };
        let config = part.normalize();
        assert_eq!(config.color, Color::BLACK);
        assert_eq!(config.opacity, 1.);
        assert_eq!(config.press, BackdropPress::Dismiss);

        let part = BackdropPart {
            opacity: Some(FloatOrInt(f64::NAN)),
            press: Some("ignore".to_owned()),
            ..Default::default()
        };
        let config = part.normalize();
        assert_eq!(config.opacity, DEFAULT_BACKDROP_OPACITY);
        assert_eq!(config.press, BackdropPress::Ignore);
    }
}
