use std::fmt;

use crate::board::Cell;

/// Largest block value. Blocks holding it no longer merge.
pub const MAX_VALUE: u32 = 1 << 31;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A numbered tile. `cell` is a coordinate looked up through the board, not a reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub value: u32,
    pub cell: Cell,
    /// Set on a block that another block is merging into during the current shift.
    pub merge_pending: bool,
    /// Set on a block that is being absorbed into the given block during the current shift.
    pub merge_target: Option<BlockId>,
}

impl Block {
    pub const fn new(id: BlockId, value: u32, cell: Cell) -> Self {
        Self {
            id,
            value,
            cell,
            merge_pending: false,
            merge_target: None,
        }
    }

    pub const fn is_valid_value(value: u32) -> bool {
        value >= 2 && value.is_power_of_two()
    }

    pub const fn can_double(&self) -> bool {
        self.value < MAX_VALUE
    }

    pub const fn accepts_merge(&self, value: u32) -> bool {
        self.value == value && self.can_double() && self.is_settled()
    }

    pub const fn is_settled(&self) -> bool {
        !self.merge_pending && self.merge_target.is_none()
    }

    pub fn clear_merge_state(&mut self) {
        self.merge_pending = false;
        self.merge_target = None;
    }
}
