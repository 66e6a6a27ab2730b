use alloc::collections::VecDeque;
use ndarray::Array2;

use crate::*;

/// Reveals `coords` and flood-fills outward through zero-count cells.
///
/// Out-of-bounds, already revealed and flagged cells are left alone, and the fill never
/// enters a flagged cell. Returns how many cells were newly revealed.
pub fn reveal(
    board: &Board,
    revealed: &mut Array2<bool>,
    flagged: &Array2<bool>,
    coords: Coord2,
) -> CellCount {
    let is_closed = |revealed: &Array2<bool>, pos: Coord2| {
        !revealed[pos.to_nd_index()] && !flagged[pos.to_nd_index()]
    };

    if !board.contains(coords) || !is_closed(revealed, coords) {
        return 0;
    }

    // cells are marked revealed as they are queued, so each one enters the queue once
    revealed[coords.to_nd_index()] = true;
    let mut opened: CellCount = 1;
    let mut to_visit = VecDeque::from([coords]);

    while let Some(visit_coords) = to_visit.pop_front() {
        if !board[visit_coords].is_zero() {
            continue;
        }

        for pos in board.iter_neighbors(visit_coords) {
            if is_closed(revealed, pos) {
                revealed[pos.to_nd_index()] = true;
                opened += 1;
                to_visit.push_back(pos);
                log::trace!("Flood opened cell at {:?}", pos);
            }
        }
    }

    log::debug!("Revealed {} cells from {:?}", opened, coords);
    opened
}

/// Marks every mine revealed, flags included. Returns how many mines were newly revealed.
pub fn reveal_mines(board: &Board, revealed: &mut Array2<bool>) -> CellCount {
    let mut opened = 0;
    for coords in board.mines() {
        let cell = &mut revealed[coords.to_nd_index()];
        if !*cell {
            *cell = true;
            opened += 1;
        }
    }
    opened
}
