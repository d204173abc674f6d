use std::fmt;

use rustc_hash::FxHashMap;

use crate::{
    block::{Block, BlockId},
    direction::Direction,
    error::GridError,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Fixed-size grid. Occupancy is stored per cell as a block id; the blocks themselves live in a
/// store keyed by id, so there are no references between cells and blocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Option<BlockId>>,
    blocks: FxHashMap<BlockId, Block>,
    next_id: u32,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        let cell_count = width
            .checked_mul(height)
            .filter(|&count| count > 0)
            .ok_or(GridError::InvalidDimensions { width, height })?;

        Ok(Self {
            width,
            height,
            cells: vec![None; cell_count],
            blocks: FxHashMap::default(),
            next_id: 0,
        })
    }

    /// Builds a board from rows of values, top row first. Zero marks an empty cell.
    pub fn from_rows<R: AsRef<[u32]>>(rows: &[R]) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().len());

        let mut board = Self::new(width, height)?;

        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();

            if row.len() != width {
                return Err(GridError::InvalidDimensions {
                    width: row.len(),
                    height,
                });
            }

            let y = height - 1 - i;

            for (x, &value) in row.iter().enumerate() {
                if value != 0 {
                    board.insert_block(Cell::new(x, y), value)?;
                }
            }
        }

        Ok(board)
    }

    /// Block values row by row, top row first, with zero for empty cells.
    pub fn rows(&self) -> Vec<Vec<u32>> {
        (0..self.height)
            .rev()
            .map(|y| {
                (0..self.width)
                    .map(|x| {
                        self.cells[y * self.width + x]
                            .and_then(|id| self.blocks.get(&id))
                            .map_or(0, |block| block.value)
                    })
                    .collect()
            })
            .collect()
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub fn cell_at(&self, x: i64, y: i64) -> Result<Cell, GridError> {
        let in_range = |v: i64, len: usize| usize::try_from(v).ok().filter(|&v| v < len);

        match (in_range(x, self.width), in_range(y, self.height)) {
            (Some(x), Some(y)) => Ok(Cell::new(x, y)),
            _ => Err(GridError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            }),
        }
    }

    fn index(&self, cell: Cell) -> Result<usize, GridError> {
        if cell.x < self.width && cell.y < self.height {
            Ok(cell.y * self.width + cell.x)
        } else {
            Err(GridError::OutOfBounds {
                x: cell.x as i64,
                y: cell.y as i64,
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn neighbor(&self, cell: Cell, direction: Direction) -> Option<Cell> {
        let (dx, dy) = direction.offset();

        self.cell_at(cell.x as i64 + i64::from(dx), cell.y as i64 + i64::from(dy))
            .ok()
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Cell::new(x, y)))
    }

    pub fn occupant_id(&self, cell: Cell) -> Result<Option<BlockId>, GridError> {
        self.index(cell).map(|i| self.cells[i])
    }

    pub fn occupant(&self, cell: Cell) -> Result<Option<&Block>, GridError> {
        Ok(self
            .occupant_id(cell)?
            .and_then(|id| self.blocks.get(&id)))
    }

    /// Writes the occupancy of `cell` without touching the block's own coordinate.
    pub fn set_occupant(&mut self, cell: Cell, occupant: Option<BlockId>) -> Result<(), GridError> {
        let i = self.index(cell)?;

        if let Some(incoming) = occupant {
            if !self.blocks.contains_key(&incoming) {
                return Err(GridError::UnknownBlock(incoming));
            }

            if let Some(current) = self.cells[i].filter(|&current| current != incoming) {
                return Err(GridError::DuplicateOccupancy {
                    cell,
                    occupant: current,
                    incoming,
                });
            }
        }

        self.cells[i] = occupant;

        Ok(())
    }

    pub fn free_cells(&self) -> Vec<Cell> {
        self.cells()
            .zip(&self.cells)
            .filter(|(_, occupant)| occupant.is_none())
            .map(|(cell, _)| cell)
            .collect()
    }

    pub fn free_cell_count(&self) -> usize {
        self.cells.iter().filter(|occupant| occupant.is_none()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn insert_block(&mut self, cell: Cell, value: u32) -> Result<BlockId, GridError> {
        if !Block::is_valid_value(value) {
            return Err(GridError::InvalidValue(value));
        }

        let i = self.index(cell)?;
        let id = BlockId(self.next_id);

        if let Some(occupant) = self.cells[i] {
            return Err(GridError::DuplicateOccupancy {
                cell,
                occupant,
                incoming: id,
            });
        }

        self.next_id += 1;
        self.blocks.insert(id, Block::new(id, value, cell));
        self.cells[i] = Some(id);

        Ok(id)
    }

    pub fn remove_block(&mut self, id: BlockId) -> Result<Block, GridError> {
        let block = self.blocks.remove(&id).ok_or(GridError::UnknownBlock(id))?;

        let i = self.index(block.cell)?;

        if self.cells[i] == Some(id) {
            self.cells[i] = None;
        }

        Ok(block)
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    /// Mutable access for move resolution. Callers must restore consistency before handing the
    /// board back.
    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(&id)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    pub fn blocks_mut(&mut self) -> impl Iterator<Item = &mut Block> {
        self.blocks.values_mut()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn value_sum(&self) -> u64 {
        self.blocks.values().map(|block| u64::from(block.value)).sum()
    }

    pub fn max_value(&self) -> Option<u32> {
        self.blocks.values().map(|block| block.value).max()
    }

    /// Verifies that every block sits where the occupancy mapping says it does and that no
    /// block is left with merge state.
    pub fn check_consistency(&self) -> Result<(), GridError> {
        for block in self.blocks.values() {
            if self.occupant_id(block.cell)? != Some(block.id) || !block.is_settled() {
                return Err(GridError::Inconsistent { cell: block.cell });
            }
        }

        for (cell, occupant) in self.cells().zip(&self.cells) {
            if let Some(id) = occupant {
                let block = self.blocks.get(id).ok_or(GridError::UnknownBlock(*id))?;

                if block.cell != cell {
                    return Err(GridError::Inconsistent { cell });
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let line: Vec<_> = row
                .iter()
                .map(|&value| {
                    if value == 0 {
                        format!("{:>5}", ".")
                    } else {
                        format!("{value:>5}")
                    }
                })
                .collect();

            writeln!(f, "{}", line.join("|"))?;
        }

        Ok(())
    }
}
