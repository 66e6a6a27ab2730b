use anyhow::{Context, bail};
use mines3d_core::{
    BoardGenerator, BoardSizeKey, CellView, Coord, Coord2, Difficulty, GameSession, GameStatus,
    LEDGER_CAPACITY, RevealOutcome, ScoreEntry, WinRecord, record_win,
};
use mines3d_protocol::{FETCH_SCORES_FAILED, SAVE_SCORE_FAILED};
use mines3d_store::FileScoreStore;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::time::{Duration, Instant};
use time::OffsetDateTime;

const HELP: &str = "\
Commands:
  r X Y         reveal a cell
  f X Y         toggle a flag
  n             new game
  d DIFFICULTY  new game on easy, medium or hard
  s             show the leaderboard
  h             this help
  q             quit";

/// One line typed at the prompt.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Input {
    Reveal(Coord2),
    Flag(Coord2),
    NewGame,
    Difficulty(Difficulty),
    Scores,
    Help,
    Quit,
}

impl FromStr for Input {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let mut words = line.split_whitespace();
        let input = match words.next().context("Empty command")? {
            "r" | "reveal" => Self::Reveal(parse_coords(&mut words)?),
            "f" | "flag" => Self::Flag(parse_coords(&mut words)?),
            "n" | "new" => Self::NewGame,
            "d" | "difficulty" => {
                Self::Difficulty(words.next().context("Missing difficulty")?.parse()?)
            }
            "s" | "scores" => Self::Scores,
            "h" | "help" | "?" => Self::Help,
            "q" | "quit" => Self::Quit,
            other => bail!("Unknown command {other:?}"),
        };
        if words.next().is_some() {
            bail!("Too many arguments");
        }
        Ok(input)
    }
}

fn parse_coords<'a>(words: &mut impl Iterator<Item = &'a str>) -> anyhow::Result<Coord2> {
    let mut next = || -> anyhow::Result<Coord> {
        let word = words.next().context("Expected X and Y")?;
        let value: i64 = word
            .parse()
            .with_context(|| format!("Invalid coordinate {word:?}"))?;
        // no board is 256 cells wide, so this lands outside and gets ignored
        Ok(Coord::try_from(value).unwrap_or(Coord::MAX))
    };
    Ok((next()?, next()?))
}

pub(crate) fn format_time(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn status_label(status: GameStatus) -> &'static str {
    match status {
        GameStatus::Pending => "click to start",
        GameStatus::Running => "running",
        GameStatus::Won => "won",
        GameStatus::Lost => "lost",
    }
}

fn cell_char(view: Option<CellView>) -> char {
    match view {
        Some(CellView::Revealed(0)) => '·',
        Some(CellView::Revealed(count)) => char::from_digit(count.into(), 10).unwrap_or('?'),
        Some(CellView::Flagged) => 'F',
        Some(CellView::Mine) => '*',
        Some(CellView::TriggeredMine) => 'X',
        Some(CellView::Hidden) | None => '#',
    }
}

/// Draws the board with column numbers on top and row numbers on the left.
pub(crate) fn render<G: BoardGenerator>(
    session: &GameSession<G>,
    out: &mut impl Write,
) -> io::Result<()> {
    let (width, height) = session.size();
    writeln!(
        out,
        "{}  mines {}  time {}  {}",
        session.board_size_key(),
        session.mines_left(),
        format_time(session.elapsed_secs()),
        status_label(session.status())
    )?;

    write!(out, "   ")?;
    for x in 0..width {
        write!(out, "{x:>3}")?;
    }
    writeln!(out)?;
    for y in 0..height {
        write!(out, "{y:>3}")?;
        for x in 0..width {
            write!(out, "{:>3}", cell_char(session.cell_view((x, y))))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub(crate) fn write_scores(
    out: &mut impl Write,
    board_size: &BoardSizeKey,
    top: &[ScoreEntry],
) -> io::Result<()> {
    writeln!(out, "Best times on {board_size}")?;
    if top.is_empty() {
        writeln!(out, "  no scores yet")?;
    }
    for (rank, entry) in top.iter().enumerate() {
        writeln!(
            out,
            "{:>4}. {:<3}  {}  {}",
            rank + 1,
            entry.initials.as_str(),
            format_time(entry.elapsed_secs),
            entry.recorded_at.date()
        )?;
    }
    Ok(())
}

/// Turns wall-clock time into whole-second ticks.
#[derive(Debug)]
struct Ticker {
    last: Instant,
}

impl Ticker {
    fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    fn restart(&mut self) {
        self.last = Instant::now();
    }

    /// Seconds completed since the previous call. The fraction carries over.
    fn due(&mut self) -> u32 {
        let secs = self.last.elapsed().as_secs();
        self.last += Duration::from_secs(secs);
        u32::try_from(secs).unwrap_or(u32::MAX)
    }
}

/// Interactive game on a line-based terminal.
pub(crate) struct Game<G, R, W> {
    session: GameSession<G>,
    scores: FileScoreStore,
    submission_ids: SmallRng,
    ticker: Ticker,
    input: R,
    output: W,
}

impl<G: BoardGenerator, R: BufRead, W: Write> Game<G, R, W> {
    pub fn new(session: GameSession<G>, scores: FileScoreStore, input: R, output: W) -> Self {
        Self {
            session,
            scores,
            submission_ids: SmallRng::from_os_rng(),
            ticker: Ticker::new(),
            input,
            output,
        }
    }

    pub fn run(mut self) -> anyhow::Result<()> {
        writeln!(self.output, "{HELP}")?;
        render(&self.session, &mut self.output)?;

        let mut line = String::new();
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            self.catch_up();
            if line.trim().is_empty() {
                continue;
            }

            match line.parse::<Input>() {
                Ok(Input::Quit) => break,
                Ok(input) => self.handle(input)?,
                Err(err) => writeln!(self.output, "{err:#}, type h for help")?,
            }
        }
        Ok(())
    }

    fn catch_up(&mut self) {
        if !self.session.status().is_running() {
            self.ticker.restart();
            return;
        }
        for _ in 0..self.ticker.due() {
            self.session.tick();
        }
    }

    fn handle(&mut self, input: Input) -> anyhow::Result<()> {
        match input {
            Input::Reveal(coords) => match self.session.click_reveal(coords) {
                Ok(RevealOutcome::NoChange) => {}
                Ok(RevealOutcome::Revealed) => render(&self.session, &mut self.output)?,
                Ok(RevealOutcome::HitMine) => {
                    render(&self.session, &mut self.output)?;
                    writeln!(self.output, "Boom! Type n for a new game.")?;
                }
                Ok(RevealOutcome::Won) => {
                    render(&self.session, &mut self.output)?;
                    writeln!(
                        self.output,
                        "Cleared in {}!",
                        format_time(self.session.elapsed_secs())
                    )?;
                    self.record_score()?;
                }
                Err(err) => {
                    log::error!("Could not start game: {}", err);
                    writeln!(self.output, "Could not start game: {err}")?;
                }
            },
            Input::Flag(coords) => {
                if self.session.toggle_flag(coords).has_update() {
                    render(&self.session, &mut self.output)?;
                }
            }
            Input::NewGame => {
                self.session.reset();
                render(&self.session, &mut self.output)?;
            }
            Input::Difficulty(difficulty) => {
                self.session.select_difficulty(difficulty);
                render(&self.session, &mut self.output)?;
            }
            Input::Scores => {
                let board_size = self.session.board_size_key();
                match self.scores.top_scores(&board_size) {
                    Ok(top) => write_scores(&mut self.output, &board_size, &top)?,
                    Err(err) => {
                        log::error!("{}: {}", FETCH_SCORES_FAILED, err);
                        writeln!(self.output, "{FETCH_SCORES_FAILED}: {err}")?;
                    }
                }
            }
            Input::Help => writeln!(self.output, "{HELP}")?,
            Input::Quit => {}
        }
        Ok(())
    }

    fn record_score(&mut self) -> anyhow::Result<()> {
        let Self {
            session,
            scores,
            submission_ids,
            input,
            output,
            ..
        } = self;

        let mut prompt = |elapsed_secs: u32| -> Option<String> {
            write!(
                output,
                "Top {LEDGER_CAPACITY} time {}! Your initials: ",
                format_time(elapsed_secs)
            )
            .ok()?;
            output.flush().ok()?;
            let mut line = String::new();
            match input.read_line(&mut line) {
                Ok(0) | Err(_) => None,
                Ok(_) => Some(line),
            }
        };
        let record = record_win(
            session,
            scores,
            &mut prompt,
            OffsetDateTime::now_utc(),
            Some(submission_ids.random()),
        );

        match record {
            Ok(WinRecord::Submitted(top)) => {
                write_scores(output, &session.board_size_key(), &top)?;
            }
            Ok(WinRecord::NotRanked(_)) => {
                writeln!(output, "Not fast enough for the top {LEDGER_CAPACITY}.")?;
            }
            Ok(WinRecord::Cancelled) => writeln!(output, "Score not saved.")?,
            Ok(WinRecord::NotWon) => {}
            Err(err) => {
                log::error!("{}: {}", SAVE_SCORE_FAILED, err);
                writeln!(output, "{SAVE_SCORE_FAILED}: {err}")?;
            }
        }
        Ok(())
    }
}
