use alloc::string::String;
use alloc::vec::Vec;
use core::convert::Infallible;
use time::OffsetDateTime;

use crate::*;

/// Where ranked scores live: a remote service, a file, or an in-memory [`Ledger`].
pub trait ScoreBackend {
    type Error;

    /// Ranked entries for a board, fastest first, at most ten.
    fn top_scores(
        &mut self,
        board_size: &BoardSizeKey,
    ) -> core::result::Result<Vec<ScoreEntry>, Self::Error>;

    /// Adds an entry and returns the updated ranking of its board.
    fn submit_score(
        &mut self,
        entry: ScoreEntry,
    ) -> core::result::Result<Vec<ScoreEntry>, Self::Error>;
}

impl ScoreBackend for Ledger {
    type Error = Infallible;

    fn top_scores(
        &mut self,
        board_size: &BoardSizeKey,
    ) -> core::result::Result<Vec<ScoreEntry>, Infallible> {
        Ok(self.top(board_size).to_vec())
    }

    fn submit_score(
        &mut self,
        entry: ScoreEntry,
    ) -> core::result::Result<Vec<ScoreEntry>, Infallible> {
        Ok(self.submit(entry).to_vec())
    }
}

/// Asks the player for initials after a ranked win.
pub trait InitialsPrompt {
    /// `None` when the player cancels.
    fn ask_initials(&mut self, elapsed_secs: u32) -> Option<String>;
}

impl<F: FnMut(u32) -> Option<String>> InitialsPrompt for F {
    fn ask_initials(&mut self, elapsed_secs: u32) -> Option<String> {
        self(elapsed_secs)
    }
}

/// What happened to a finished game's time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WinRecord {
    /// The session is not in the won state, nothing was sent.
    NotWon,
    /// Too slow for the board, carries the current ranking.
    NotRanked(Vec<ScoreEntry>),
    /// The player dismissed the prompt or entered no usable initials.
    Cancelled,
    /// Carries the ranking returned by the backend after submission.
    Submitted(Vec<ScoreEntry>),
}

/// Checks whether a won game ranks on its board and, if so, asks for initials and submits it.
///
/// Backend errors are handed back untouched and the session is never modified, so the caller
/// can show the error and retry.
pub fn record_win<G, B, P>(
    session: &GameSession<G>,
    backend: &mut B,
    prompt: &mut P,
    recorded_at: OffsetDateTime,
    submission_id: Option<u64>,
) -> core::result::Result<WinRecord, B::Error>
where
    G: BoardGenerator,
    B: ScoreBackend + ?Sized,
    P: InitialsPrompt + ?Sized,
{
    if !matches!(session.status(), GameStatus::Won) {
        return Ok(WinRecord::NotWon);
    }

    let board_size = session.board_size_key();
    let top = backend.top_scores(&board_size)?;
    if !qualifies(&top, session.elapsed_secs()) {
        log::debug!(
            "{}s does not rank on {}",
            session.elapsed_secs(),
            board_size
        );
        return Ok(WinRecord::NotRanked(top));
    }

    let initials = prompt
        .ask_initials(session.elapsed_secs())
        .and_then(|raw| Initials::new(&raw).ok());
    let Some(entry) =
        initials.and_then(|initials| session.score_entry(initials, recorded_at, submission_id))
    else {
        log::debug!("Score entry cancelled");
        return Ok(WinRecord::Cancelled);
    };

    let top = backend.submit_score(entry)?;
    log::info!("Submitted score for {}", board_size);
    Ok(WinRecord::Submitted(top))
}
