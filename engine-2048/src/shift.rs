use grid_2048::{BlockId, Board, Cell, Direction, GridError};

/// A pair of equal blocks combined by a shift. `value` is the survivor's doubled value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Merge {
    pub survivor: BlockId,
    pub absorbed: BlockId,
    pub cell: Cell,
    pub value: u32,
}

/// Start and end cell of one block. Absorbed blocks end on their survivor's cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockMove {
    pub id: BlockId,
    pub from: Cell,
    pub to: Cell,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveResult {
    pub moved: bool,
    pub merges: Vec<Merge>,
    pub moves: Vec<BlockMove>,
    pub score: u64,
}

fn shift_order(board: &Board, direction: Direction) -> Vec<(Cell, BlockId)> {
    let mut order: Vec<_> = board.blocks().map(|block| (block.cell, block.id)).collect();

    order.sort_unstable_by_key(|&(cell, _)| (cell.x, cell.y));

    if direction.is_descending() {
        order.reverse();
    }

    order
}

/// Slides every block as far as it goes in `direction`, merging equal blocks at most once each.
///
/// Blocks are visited farthest-first so they claim their destination before the blocks behind
/// them. A block stops when it leaves the board, hits a block it cannot merge with, or merges.
/// Merged values are applied after every block has been placed, so a block created by a merge
/// in this shift never merges again in the same shift.
pub fn resolve(board: &mut Board, direction: Direction) -> Result<MoveResult, GridError> {
    let order = shift_order(board, direction);

    let mut moves = Vec::with_capacity(order.len());
    let mut pairs = Vec::new();

    for (start, id) in order {
        let value = board.block(id).ok_or(GridError::UnknownBlock(id))?.value;
        let mut current = start;

        while let Some(next) = board.neighbor(current, direction) {
            let occupant = board
                .occupant(next)?
                .map(|other| (other.id, other.accepts_merge(value)));

            match occupant {
                None => {
                    board.set_occupant(current, None)?;
                    board.set_occupant(next, Some(id))?;
                    current = next;
                }
                Some((survivor, true)) => {
                    board.set_occupant(current, None)?;

                    board
                        .block_mut(survivor)
                        .ok_or(GridError::UnknownBlock(survivor))?
                        .merge_pending = true;
                    board
                        .block_mut(id)
                        .ok_or(GridError::UnknownBlock(id))?
                        .merge_target = Some(survivor);

                    pairs.push((survivor, id));
                    current = next;
                    break;
                }
                Some((_, false)) => break,
            }
        }

        board.block_mut(id).ok_or(GridError::UnknownBlock(id))?.cell = current;

        moves.push(BlockMove {
            id,
            from: start,
            to: current,
        });
    }

    let mut merges = Vec::with_capacity(pairs.len());

    for (survivor, absorbed) in pairs {
        board.remove_block(absorbed)?;

        let block = board
            .block_mut(survivor)
            .ok_or(GridError::UnknownBlock(survivor))?;
        block.value = block
            .value
            .checked_mul(2)
            .ok_or(GridError::ValueOverflow(survivor))?;

        log::trace!("merged {absorbed} into {survivor} at {}", block.cell);

        merges.push(Merge {
            survivor,
            absorbed,
            cell: block.cell,
            value: block.value,
        });
    }

    board.blocks_mut().for_each(|block| block.clear_merge_state());

    let moved = !merges.is_empty() || moves.iter().any(|m| m.from != m.to);
    let score = merges.iter().map(|merge| u64::from(merge.value)).sum();

    log::debug!(
        "shift {direction}: moved={moved} merges={} score={score}",
        merges.len()
    );
    debug_assert_eq!(board.check_consistency(), Ok(()));

    Ok(MoveResult {
        moved,
        merges,
        moves,
        score,
    })
}

/// Some block must have a free neighbour, or one it can merge with, in `direction`.
pub fn would_move(board: &Board, direction: Direction) -> bool {
    board.blocks().any(|block| {
        board
            .neighbor(block.cell, direction)
            .and_then(|next| board.occupant(next).ok())
            .map_or(false, |occupant| {
                occupant.map_or(true, |other| other.accepts_merge(block.value))
            })
    })
}

pub fn can_move(board: &Board) -> bool {
    Direction::iter().any(|direction| would_move(board, direction))
}
