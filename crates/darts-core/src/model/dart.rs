use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single dart as it landed on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Dart {
    Miss,
    Single(u8),
    Double(u8),
    Treble(u8),
    OuterBull,
    InnerBull,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a dart (expected e.g. T20, D16, S5, 25, BULL or MISS)")]
pub struct DartParseError(pub String);

impl Dart {
    pub const BOARD_NUMBERS: core::ops::RangeInclusive<u8> = 1..=20;

    pub fn single(number: u8) -> Option<Self> {
        Self::BOARD_NUMBERS
            .contains(&number)
            .then_some(Dart::Single(number))
    }

    pub fn double(number: u8) -> Option<Self> {
        Self::BOARD_NUMBERS
            .contains(&number)
            .then_some(Dart::Double(number))
    }

    pub fn treble(number: u8) -> Option<Self> {
        Self::BOARD_NUMBERS
            .contains(&number)
            .then_some(Dart::Treble(number))
    }

    /// Every distinct landing spot, misses included.
    pub fn all() -> impl Iterator<Item = Dart> {
        let singles = Self::BOARD_NUMBERS.map(Dart::Single);
        let doubles = Self::BOARD_NUMBERS.map(Dart::Double);
        let trebles = Self::BOARD_NUMBERS.map(Dart::Treble);
        core::iter::once(Dart::Miss)
            .chain(singles)
            .chain(doubles)
            .chain(trebles)
            .chain([Dart::OuterBull, Dart::InnerBull])
    }

    pub const fn value(self) -> u16 {
        match self {
            Dart::Miss => 0,
            Dart::Single(n) => n as u16,
            Dart::Double(n) => n as u16 * 2,
            Dart::Treble(n) => n as u16 * 3,
            Dart::OuterBull => 25,
            Dart::InnerBull => 50,
        }
    }

    /// Number of Cricket marks this dart is worth on its target.
    pub const fn marks(self) -> u8 {
        match self {
            Dart::Miss => 0,
            Dart::Single(_) | Dart::OuterBull => 1,
            Dart::Double(_) | Dart::InnerBull => 2,
            Dart::Treble(_) => 3,
        }
    }

    /// Board number hit, with the bull reported as 25.
    pub const fn number(self) -> Option<u8> {
        match self {
            Dart::Miss => None,
            Dart::Single(n) | Dart::Double(n) | Dart::Treble(n) => Some(n),
            Dart::OuterBull | Dart::InnerBull => Some(25),
        }
    }

    /// Darts that may finish an X01 leg.
    pub const fn is_double(self) -> bool {
        matches!(self, Dart::Double(_) | Dart::InnerBull)
    }
}

impl fmt::Display for Dart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dart::Miss => f.write_str("MISS"),
            Dart::Single(n) => write!(f, "S{n}"),
            Dart::Double(n) => write!(f, "D{n}"),
            Dart::Treble(n) => write!(f, "T{n}"),
            Dart::OuterBull => f.write_str("25"),
            Dart::InnerBull => f.write_str("BULL"),
        }
    }
}

impl FromStr for Dart {
    type Err = DartParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        let parsed = match normalized.as_str() {
            "MISS" | "M" | "0" => Some(Dart::Miss),
            "25" | "S25" | "SB" | "OB" => Some(Dart::OuterBull),
            "BULL" | "DB" | "D25" | "50" => Some(Dart::InnerBull),
            other => {
                let (prefix, digits) = match other.chars().next() {
                    Some(c @ ('S' | 'D' | 'T')) => (Some(c), &other[1..]),
                    _ => (None, other),
                };
                digits
                    .parse::<u8>()
                    .ok()
                    .and_then(|number| match prefix {
                        None | Some('S') => Dart::single(number),
                        Some('D') => Dart::double(number),
                        Some('T') => Dart::treble(number),
                        Some(_) => None,
                    })
            }
        };
        parsed.ok_or_else(|| DartParseError(value.to_string()))
    }
}

impl From<Dart> for String {
    fn from(dart: Dart) -> Self {
        dart.to_string()
    }
}

impl TryFrom<String> for Dart {
    type Error = DartParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
