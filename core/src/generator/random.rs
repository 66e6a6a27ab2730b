use alloc::vec::Vec;
use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::*;

/// Uniformly random generator that never places a mine next to the first click.
#[derive(Clone, Debug)]
pub struct RandomBoardGenerator {
    rng: SmallRng,
}

impl RandomBoardGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_rng(rng: SmallRng) -> Self {
        Self { rng }
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate(&mut self, config: &GameConfig, safe: Coord2) -> Result<Board> {
        generate_board(config, safe, &mut self.rng)
    }
}

/// Places `config.mines` mines uniformly at random among the cells outside the 3x3 block
/// around `safe`, then computes the adjacency counts.
pub fn generate_board<R: Rng + ?Sized>(
    config: &GameConfig,
    safe: Coord2,
    rng: &mut R,
) -> Result<Board> {
    let size = config.size;
    if size.0 == 0 || size.1 == 0 {
        return Err(GameError::EmptyBoard);
    }
    if !in_bounds(safe, size) {
        return Err(GameError::InvalidCoords);
    }

    let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());
    for coords in safe_zone(safe, size) {
        // temporarily mark the safe zone so it is skipped below
        mine_mask[coords.to_nd_index()] = true;
    }
    let candidates: Vec<Coord2> = mine_mask
        .indexed_iter()
        .filter(|(_, excluded)| !**excluded)
        .map(|((x, y), _)| (x as Coord, y as Coord))
        .collect();
    mine_mask.fill(false);

    let available = candidates.len() as CellCount;
    if config.mines > available {
        log::warn!(
            "Cannot place {} mines, only {} cells outside the safe zone",
            config.mines,
            available
        );
        return Err(GameError::InsufficientSpace {
            requested: config.mines,
            available,
        });
    }

    for index in rand::seq::index::sample(rng, candidates.len(), config.mines.into()) {
        mine_mask[candidates[index].to_nd_index()] = true;
    }

    let board = Board::from_mine_mask(&mine_mask);
    log::debug!(
        "Generated {:?} board with {} mines, safe cell {:?}",
        size,
        board.mine_count(),
        safe
    );
    Ok(board)
}
