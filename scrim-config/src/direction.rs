use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::warn;

/// A direction in which content can be swiped away, or from which it slides in.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

bitflags::bitflags! {
    /// A set of swipe directions.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SwipeDirections: u8 {
        const UP = 1 << 0;
        const DOWN = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

impl SwipeDirection {
    pub const ALL: [SwipeDirection; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    pub fn flag(self) -> SwipeDirections {
        match self {
            SwipeDirection::Up => SwipeDirections::UP,
            SwipeDirection::Down => SwipeDirections::DOWN,
            SwipeDirection::Left => SwipeDirections::LEFT,
            SwipeDirection::Right => SwipeDirections::RIGHT,
        }
    }

    /// Whether movement in this direction happens along the X axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, SwipeDirection::Left | SwipeDirection::Right)
    }

    /// Sign of the offset that moves content in this direction.
    pub fn sign(self) -> f64 {
        match self {
            SwipeDirection::Up | SwipeDirection::Left => -1.,
            SwipeDirection::Down | SwipeDirection::Right => 1.,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SwipeDirection::Up => "up",
            SwipeDirection::Down => "down",
            SwipeDirection::Left => "left",
            SwipeDirection::Right => "right",
        }
    }
}

impl fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SwipeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(format!("unknown swipe direction: {s:?}")),
        }
    }
}

/// Decodes a direction argument, warning about and skipping anything that is not a known name.
pub(crate) fn decode_direction<S: knuffel::traits::ErrorSpan>(
    val: &knuffel::ast::Value<S>,
) -> Option<SwipeDirection> {
    match &*val.literal {
        knuffel::ast::Literal::String(name) => match name.parse() {
            Ok(direction) => Some(direction),
            Err(err) => {
                warn!("{err}, ignoring");
                None
            }
        },
        other => {
            warn!("expected a swipe direction name, got {other:?}, ignoring");
            None
        }
    }
}

impl SwipeDirections {
    pub fn contains_direction(self, direction: SwipeDirection) -> bool {
        self.contains(direction.flag())
    }

    /// Iterates the contained directions in up, down, left, right order.
    pub fn directions(self) -> impl Iterator<Item = SwipeDirection> {
        SwipeDirection::ALL
            .into_iter()
            .filter(move |dir| self.contains_direction(*dir))
    }
}

impl From<SwipeDirection> for SwipeDirections {
    fn from(direction: SwipeDirection) -> Self {
        direction.flag()
    }
}

impl FromIterator<SwipeDirection> for SwipeDirections {
    fn from_iter<T: IntoIterator<Item = SwipeDirection>>(iter: T) -> Self {
        iter.into_iter()
            .fold(SwipeDirections::empty(), |set, dir| set | dir.flag())
    }
}

impl Serialize for SwipeDirections {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.directions())
    }
}
