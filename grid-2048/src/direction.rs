use std::fmt;

use crate::error::GridError;

/// One of the four axis-aligned shift directions. `Up` points towards increasing `y`.
///
/// The discriminants match the order of the arrow key escape sequences `A`, `B`, `C`, `D`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Right = 2,
    Left = 3,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Right, Self::Left];

    pub fn iter() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter()
    }

    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Right => (1, 0),
            Self::Left => (-1, 0),
        }
    }

    /// Whether blocks are visited in descending `(x, y)` order when shifting this way.
    pub const fn is_descending(self) -> bool {
        matches!(self, Self::Right | Self::Up)
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Up),
            1 => Some(Self::Down),
            2 => Some(Self::Right),
            3 => Some(Self::Left),
            _ => None,
        }
    }
}

impl TryFrom<(i32, i32)> for Direction {
    type Error = GridError;

    fn try_from((dx, dy): (i32, i32)) -> Result<Self, Self::Error> {
        match (dx.signum(), dy.signum()) {
            (0, 1) => Ok(Self::Up),
            (0, -1) => Ok(Self::Down),
            (1, 0) => Ok(Self::Right),
            (-1, 0) => Ok(Self::Left),
            _ => Err(GridError::InvalidDirection { dx, dy }),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Right => "right",
            Self::Left => "left",
        };

        f.write_str(name)
    }
}
