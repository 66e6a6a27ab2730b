use crate::*;
pub use random::*;

mod random;

/// Source of fresh boards for the first reveal of a game.
pub trait BoardGenerator {
    /// Produces a board for `config` whose safe zone around `safe` holds no mine.
    fn generate(&mut self, config: &GameConfig, safe: Coord2) -> Result<Board>;
}

impl<G: BoardGenerator + ?Sized> BoardGenerator for &mut G {
    fn generate(&mut self, config: &GameConfig, safe: Coord2) -> Result<Board> {
        (**self).generate(config, safe)
    }
}
