use ndarray::Array2;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::*;

/// Valid transitions:
/// - Pending -> Running (first reveal generates the board)
/// - Pending -> Won (first reveal opens the whole board)
/// - Running -> Won
/// - Running -> Lost
/// - any -> Pending (reset or difficulty change)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// No board yet, timer stopped
    Pending,
    /// Board generated, timer ticking
    Running,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// What a renderer should draw for a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    Revealed(u8),
    Mine,
    /// The mine that ended the game
    TriggeredMine,
}

/// One game from difficulty selection to win or loss.
#[derive(Clone, Debug)]
pub struct GameSession<G = RandomBoardGenerator> {
    config: GameConfig,
    generator: G,
    board: Option<Board>,
    revealed: Array2<bool>,
    flagged: Array2<bool>,
    revealed_count: CellCount,
    flag_count: CellCount,
    status: GameStatus,
    elapsed_secs: u32,
    bomb_hit: Option<Coord2>,
}

impl<G: BoardGenerator> GameSession<G> {
    pub fn new(config: GameConfig, generator: G) -> Self {
        Self {
            config,
            generator,
            board: None,
            revealed: Array2::default(config.size.to_nd_index()),
            flagged: Array2::default(config.size.to_nd_index()),
            revealed_count: 0,
            flag_count: 0,
            status: GameStatus::Pending,
            elapsed_secs: 0,
            bomb_hit: None,
        }
    }

    /// Switches to a new configuration, discarding the current game.
    pub fn select_difficulty(&mut self, config: impl Into<GameConfig>) {
        self.config = config.into();
        self.reset();
    }

    /// Starts over with the current configuration. Nothing of the old game is kept.
    pub fn reset(&mut self) {
        let shape = self.config.size.to_nd_index();
        self.board = None;
        self.revealed = Array2::default(shape);
        self.flagged = Array2::default(shape);
        self.revealed_count = 0;
        self.flag_count = 0;
        self.status = GameStatus::Pending;
        self.elapsed_secs = 0;
        self.bomb_hit = None;
        log::debug!(
            "New game {:?} with {} mines",
            self.config.size,
            self.config.mines
        );
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn first_click_done(&self) -> bool {
        self.board.is_some()
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn bomb_hit(&self) -> Option<Coord2> {
        self.bomb_hit
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn flag_count(&self) -> CellCount {
        self.flag_count
    }

    /// How many mines have not been flagged yet, negative when over-flagged.
    pub fn mines_left(&self) -> i32 {
        i32::from(self.config.mines) - i32::from(self.flag_count)
    }

    pub fn is_revealed(&self, coords: Coord2) -> bool {
        self.contains(coords) && self.revealed[coords.to_nd_index()]
    }

    pub fn is_flagged(&self, coords: Coord2) -> bool {
        self.contains(coords) && self.flagged[coords.to_nd_index()]
    }

    pub fn board_size_key(&self) -> BoardSizeKey {
        self.config.board_size_key()
    }

    /// View of a cell for rendering, `None` outside the board.
    pub fn cell_view(&self, coords: Coord2) -> Option<CellView> {
        if !self.contains(coords) {
            return None;
        }

        let index = coords.to_nd_index();
        Some(match (&self.board, self.revealed[index]) {
            (Some(board), true) => match board[coords] {
                BoardCell::Mine if self.bomb_hit == Some(coords) => CellView::TriggeredMine,
                BoardCell::Mine => CellView::Mine,
                BoardCell::Clear(count) => CellView::Revealed(count),
            },
            _ if self.flagged[index] => CellView::Flagged,
            _ => CellView::Hidden,
        })
    }

    /// Left click. The first one generates the board around `coords` and starts the timer.
    ///
    /// Clicks outside the board, on flagged or revealed cells, or after the game ended are
    /// ignored. Only a failing board generator produces an error, leaving the game pending.
    pub fn click_reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        if !self.contains(coords) {
            log::trace!("Ignoring reveal outside the board at {:?}", coords);
            return Ok(RevealOutcome::NoChange);
        }
        if self.status.is_finished() || self.is_flagged(coords) || self.is_revealed(coords) {
            return Ok(RevealOutcome::NoChange);
        }

        if self.status.is_pending() {
            let board = self.generator.generate(&self.config, coords)?;
            if board.size() != self.config.size || board.mine_count() != self.config.mines {
                return Err(GameError::InvalidBoardShape);
            }
            self.board = Some(board);
            self.status = GameStatus::Running;
            log::debug!("Game started at {:?}", coords);
        }

        let Some(board) = &self.board else {
            return Ok(RevealOutcome::NoChange);
        };

        if board.is_mine(coords) {
            self.bomb_hit = Some(coords);
            self.revealed_count += reveal_mines(board, &mut self.revealed);
            self.status = GameStatus::Lost;
            log::info!(
                "Hit a mine at {:?} after {}s",
                coords,
                self.elapsed_secs
            );
            return Ok(RevealOutcome::HitMine);
        }

        self.revealed_count += reveal(board, &mut self.revealed, &self.flagged, coords);

        if self.revealed_count == self.config.safe_cell_count() {
            self.status = GameStatus::Won;
            log::info!("Won {:?} in {}s", self.config.size, self.elapsed_secs);
            Ok(RevealOutcome::Won)
        } else {
            Ok(RevealOutcome::Revealed)
        }
    }

    /// Right click. Flags may be placed before the first reveal, never on revealed cells and
    /// never after the game ended.
    pub fn toggle_flag(&mut self, coords: Coord2) -> MarkOutcome {
        if !self.contains(coords) || self.status.is_finished() || self.is_revealed(coords) {
            return MarkOutcome::NoChange;
        }

        let flag = &mut self.flagged[coords.to_nd_index()];
        *flag = !*flag;
        if *flag {
            self.flag_count += 1;
        } else {
            self.flag_count -= 1;
        }
        log::trace!("Flag at {:?} set to {}", coords, *flag);
        MarkOutcome::Changed
    }

    /// One second of wall-clock time. Counts only while the game is running.
    pub fn tick(&mut self) -> bool {
        if self.status.is_running() {
            self.elapsed_secs = self.elapsed_secs.saturating_add(1);
            true
        } else {
            false
        }
    }

    /// Leaderboard entry for a won game.
    pub fn score_entry(
        &self,
        initials: Initials,
        recorded_at: OffsetDateTime,
        submission_id: Option<u64>,
    ) -> Option<ScoreEntry> {
        matches!(self.status, GameStatus::Won).then(|| ScoreEntry {
            initials,
            elapsed_secs: self.elapsed_secs,
            board_size: self.board_size_key(),
            recorded_at,
            submission_id,
        })
    }

    fn contains(&self, coords: Coord2) -> bool {
        in_bounds(coords, self.config.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use rand::rngs::SmallRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    /// Hands out a fixed layout regardless of the first click.
    struct FixedLayout(Board);

    impl BoardGenerator for FixedLayout {
        fn generate(&mut self, _config: &GameConfig, _safe: Coord2) -> Result<Board> {
            Ok(self.0.clone())
        }
    }

    fn fixed_session(size: Coord2, mines: &[Coord2]) -> GameSession<FixedLayout> {
        let board = Board::from_mine_coords(size, mines).unwrap();
        let config = GameConfig::new_unchecked(size, board.mine_count());
        GameSession::new(config, FixedLayout(board))
    }

    #[test]
    fn single_cell_board_wins_on_first_click() {
        let config = GameConfig::new((1, 1), 0).unwrap();
        let mut session = GameSession::new(config, RandomBoardGenerator::new(0));

        assert_eq!(session.click_reveal((0, 0)), Ok(RevealOutcome::Won));
        assert_eq!(session.status(), GameStatus::Won);
        assert!(!session.tick());
        assert_eq!(session.elapsed_secs(), 0);
    }

    #[test]
    fn first_click_generates_a_safe_board() {
        let mut session = GameSession::new(Difficulty::Easy.config(), RandomBoardGenerator::new(3));
        assert!(!session.first_click_done());

        let outcome = session.click_reveal((4, 4)).unwrap();

        assert!(matches!(outcome, RevealOutcome::Revealed | RevealOutcome::Won));
        assert!(session.first_click_done());
        assert_eq!(session.cell_view((4, 4)), Some(CellView::Revealed(0)));
        let board = session.board().unwrap();
        assert_eq!(board.mine_count(), 10);
        for coords in safe_zone((4, 4), (8, 8)) {
            assert!(!board.is_mine(coords));
            assert!(session.is_revealed(coords));
        }
    }

    #[test]
    fn timer_runs_only_while_playing() {
        let mut session = fixed_session((4, 1), &[(3, 0)]);
        assert!(!session.tick());

        session.click_reveal((0, 0)).unwrap();
        assert_eq!(session.status(), GameStatus::Won);

        let mut session = fixed_session((4, 1), &[(3, 0)]);
        session.click_reveal((2, 0)).unwrap();
        assert_eq!(session.status(), GameStatus::Running);
        assert!(session.tick());
        assert!(session.tick());
        assert_eq!(session.elapsed_secs(), 2);

        session.click_reveal((3, 0)).unwrap();
        assert!(!session.tick());
        assert_eq!(session.elapsed_secs(), 2);
    }

    #[test]
    fn flagged_cell_cannot_be_revealed() {
        let mut session = fixed_session((5, 5), &[(0, 0), (1, 0), (0, 1), (4, 4)]);
        session.click_reveal((1, 1)).unwrap();
        assert_eq!(session.toggle_flag((2, 2)), MarkOutcome::Changed);

        assert_eq!(session.click_reveal((2, 2)), Ok(RevealOutcome::NoChange));
        assert!(!session.is_revealed((2, 2)));
        assert!(session.is_flagged((2, 2)));
        assert_eq!(session.cell_view((2, 2)), Some(CellView::Flagged));
    }

    #[test]
    fn flags_can_be_placed_before_the_first_click() {
        let mut session = fixed_session((3, 3), &[]);

        assert_eq!(session.toggle_flag((1, 1)), MarkOutcome::Changed);
        assert_eq!(session.click_reveal((1, 1)), Ok(RevealOutcome::NoChange));
        assert!(!session.first_click_done());
        assert_eq!(session.status(), GameStatus::Pending);

        assert_eq!(session.toggle_flag((1, 1)), MarkOutcome::Changed);
        assert_eq!(session.flag_count(), 0);
    }

    #[test]
    fn flagging_a_revealed_cell_does_nothing() {
        let mut session = fixed_session((3, 1), &[(2, 0)]);
        session.click_reveal((1, 0)).unwrap();

        assert_eq!(session.toggle_flag((1, 0)), MarkOutcome::NoChange);
        assert_eq!(session.toggle_flag((2, 0)), MarkOutcome::Changed);
        assert_eq!(session.mines_left(), 0);
    }

    #[test]
    fn hitting_a_mine_reveals_all_mines() {
        let mines = [(0, 0), (3, 0), (3, 3)];
        let mut session = fixed_session((4, 4), &mines);
        session.click_reveal((1, 2)).unwrap();
        session.toggle_flag((3, 3));
        session.toggle_flag((3, 1));
        let safe_revealed: Vec<_> = (0..4)
            .flat_map(|x| (0..4).map(move |y| (x, y)))
            .filter(|coords| !mines.contains(coords))
            .map(|coords| session.is_revealed(coords))
            .collect();

        assert_eq!(session.click_reveal((0, 0)), Ok(RevealOutcome::HitMine));

        assert_eq!(session.status(), GameStatus::Lost);
        assert_eq!(session.bomb_hit(), Some((0, 0)));
        assert_eq!(session.cell_view((0, 0)), Some(CellView::TriggeredMine));
        assert_eq!(session.cell_view((3, 0)), Some(CellView::Mine));
        assert_eq!(session.cell_view((3, 3)), Some(CellView::Mine));
        assert_eq!(session.cell_view((3, 1)), Some(CellView::Flagged));
        assert!(session.is_flagged((3, 1)));
        let safe_after: Vec<_> = (0..4)
            .flat_map(|x| (0..4).map(move |y| (x, y)))
            .filter(|coords| !mines.contains(coords))
            .map(|coords| session.is_revealed(coords))
            .collect();
        assert_eq!(safe_revealed, safe_after);
    }

    #[test]
    fn finished_games_reject_moves() {
        let mut session = fixed_session((3, 1), &[(2, 0)]);
        session.click_reveal((0, 0)).unwrap();
        assert_eq!(session.status(), GameStatus::Won);

        assert_eq!(session.toggle_flag((2, 0)), MarkOutcome::NoChange);
        assert_eq!(session.click_reveal((2, 0)), Ok(RevealOutcome::NoChange));
        assert_eq!(session.status(), GameStatus::Won);
    }

    #[test]
    fn clicks_outside_the_board_are_ignored() {
        let mut session = fixed_session((3, 3), &[]);

        assert_eq!(session.click_reveal((3, 0)), Ok(RevealOutcome::NoChange));
        assert_eq!(session.toggle_flag((0, 9)), MarkOutcome::NoChange);
        assert_eq!(session.status(), GameStatus::Pending);
        assert_eq!(session.cell_view((3, 3)), None);
    }

    #[test]
    fn generator_failure_keeps_the_game_pending() {
        let config = GameConfig::new_unchecked((3, 3), 1);
        let mut session = GameSession::new(config, RandomBoardGenerator::new(0));

        assert_eq!(
            session.click_reveal((1, 1)),
            Err(GameError::InsufficientSpace {
                requested: 1,
                available: 0
            })
        );
        assert_eq!(session.status(), GameStatus::Pending);
        assert!(!session.first_click_done());
    }

    #[test]
    fn board_with_wrong_mine_count_is_rejected() {
        let board = Board::from_mine_coords((4, 1), &[(3, 0)]).unwrap();
        let config = GameConfig::new_unchecked((4, 1), 2);
        let mut session = GameSession::new(config, FixedLayout(board));

        assert_eq!(
            session.click_reveal((0, 0)),
            Err(GameError::InvalidBoardShape)
        );
        assert_eq!(session.status(), GameStatus::Pending);
        assert!(session.board().is_none());
        assert_eq!(session.revealed_count(), 0);
    }

    #[test]
    fn reset_and_difficulty_change_discard_the_game() {
        let mut session = fixed_session((4, 1), &[(3, 0)]);
        session.toggle_flag((3, 0));
        session.click_reveal((2, 0)).unwrap();
        session.tick();

        session.reset();
        assert_eq!(session.status(), GameStatus::Pending);
        assert_eq!(session.elapsed_secs(), 0);
        assert_eq!(session.flag_count(), 0);
        assert!(!session.first_click_done());
        assert!(!session.is_revealed((2, 0)));

        session.select_difficulty(GameConfig::new_unchecked((2, 2), 0));
        assert_eq!(session.size(), (2, 2));
        assert_eq!(session.cell_view((1, 1)), Some(CellView::Hidden));
        assert_eq!(session.cell_view((3, 0)), None);
    }

    #[test]
    fn win_triggers_exactly_on_last_safe_cell() {
        let mut rng = SmallRng::seed_from_u64(2024);

        for _ in 0..100 {
            let size: Coord2 = (rng.random_range(1..=10), rng.random_range(1..=10));
            let mut mines = Vec::new();
            let mut safe = Vec::new();
            for x in 0..size.0 {
                for y in 0..size.1 {
                    if rng.random_bool(0.2) {
                        mines.push((x, y));
                    } else {
                        safe.push((x, y));
                    }
                }
            }
            if safe.is_empty() {
                continue;
            }
            safe.shuffle(&mut rng);

            let mut session = fixed_session(size, &mines);
            let safe_total = CellCount::try_from(safe.len()).unwrap();

            for coords in safe {
                let outcome = session.click_reveal(coords).unwrap();
                let done = session.revealed_count() == safe_total;
                assert_eq!(outcome == RevealOutcome::Won, done);
                assert_eq!(outcome.ends_game(), done);
                assert_eq!(session.status() == GameStatus::Won, done);
                if done {
                    break;
                }
            }
            assert_eq!(session.status(), GameStatus::Won);
        }
    }

    #[test]
    fn score_entry_only_for_won_games() {
        let when = time::macros::datetime!(2024-01-01 0:00 UTC);
        let mut session = fixed_session((2, 1), &[(1, 0)]);
        let initials = Initials::new("ace").unwrap();
        assert!(session.score_entry(initials.clone(), when, None).is_none());

        session.click_reveal((0, 0)).unwrap();
        let entry = session.score_entry(initials, when, Some(1)).unwrap();

        assert_eq!(entry.board_size.as_str(), "2x1-1m");
        assert_eq!(entry.elapsed_secs, 0);
        assert_eq!(entry.submission_id, Some(1));
    }
}
