use std::{error, fmt};

use crate::{block::BlockId, board::Cell};

/// Local invariant violations. None of these fire during normal play.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    OutOfBounds {
        x: i64,
        y: i64,
        width: usize,
        height: usize,
    },
    InvalidDirection {
        dx: i32,
        dy: i32,
    },
    DuplicateOccupancy {
        cell: Cell,
        occupant: BlockId,
        incoming: BlockId,
    },
    UnknownBlock(BlockId),
    /// Block values are powers of two no smaller than 2.
    InvalidValue(u32),
    ValueOverflow(BlockId),
    InvalidDimensions {
        width: usize,
        height: usize,
    },
    /// Occupancy and block coordinates disagree.
    Inconsistent {
        cell: Cell,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds {
                x,
                y,
                width,
                height,
            } => write!(f, "cell ({x}, {y}) is outside the {width}x{height} board"),
            Self::InvalidDirection { dx, dy } => {
                write!(f, "({dx}, {dy}) is not an axis-aligned direction")
            }
            Self::DuplicateOccupancy {
                cell,
                occupant,
                incoming,
            } => write!(
                f,
                "block {incoming} cannot occupy {cell}: already held by block {occupant}"
            ),
            Self::UnknownBlock(id) => write!(f, "block {id} is not on the board"),
            Self::InvalidValue(value) => write!(f, "{value} is not a valid block value"),
            Self::ValueOverflow(id) => write!(f, "block {id} cannot grow any further"),
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid board dimensions {width}x{height}")
            }
            Self::Inconsistent { cell } => {
                write!(f, "occupancy of {cell} disagrees with block positions")
            }
        }
    }
}

impl error::Error for GridError {}
