use anyhow::Context;
use clap::{Parser, Subcommand};
use mines3d_core::{BoardSizeKey, Difficulty, GameConfig, GameSession, RandomBoardGenerator};
use mines3d_protocol::{FETCH_SCORES_FAILED, LOAD_SETTINGS_FAILED, SAVE_SETTINGS_FAILED, Settings};
use mines3d_store::{FileScoreStore, SettingsStore};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::io::{self, Write};
use std::path::PathBuf;

mod config;
mod play;
mod tuner;

use config::Config;
use play::Game;
use tuner::{Axis, RotationTuner};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Configuration file, ignored when missing
    #[arg(short, long, default_value = "mines3d.toml")]
    config: PathBuf,

    /// Score file, overrides the configuration
    #[arg(long)]
    scores: Option<PathBuf>,

    /// Settings file, overrides the configuration
    #[arg(long)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play in the terminal (default)
    Play(PlayArgs),
    /// Show the leaderboard of a board size
    Scores {
        /// Board key such as 8x8, defaults to the configured difficulty
        #[arg(short, long)]
        board: Option<String>,
    },
    /// Inspect or tune the board orientation
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(clap::Args, Debug, Default)]
struct PlayArgs {
    #[arg(short, long)]
    difficulty: Option<Difficulty>,

    /// Custom board width
    #[arg(long, requires_all = ["height", "mines"], conflicts_with = "difficulty")]
    width: Option<u8>,

    #[arg(long, requires = "width")]
    height: Option<u8>,

    #[arg(long, requires = "width")]
    mines: Option<u16>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,
}

impl PlayArgs {
    fn game_config(&self, fallback: Difficulty) -> anyhow::Result<GameConfig> {
        match (self.width, self.height, self.mines) {
            (Some(width), Some(height), Some(mines)) => GameConfig::new((width, height), mines)
                .with_context(|| format!("Cannot play {mines} mines on {width}x{height}")),
            _ => Ok(self.difficulty.unwrap_or(fallback).config()),
        }
    }

    fn generator(&self) -> RandomBoardGenerator {
        match self.seed {
            Some(seed) => RandomBoardGenerator::new(seed),
            None => RandomBoardGenerator::from_rng(SmallRng::from_os_rng()),
        }
    }
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Print the saved rotation
    Show,
    /// Rotate the board by whole steps of 3.75 degrees
    Rotate {
        #[arg(value_enum)]
        axis: Axis,
        #[arg(allow_negative_numbers = true)]
        steps: i32,
    },
    /// Put the board rotation back to zero
    Reset,
}

fn print_settings(settings: &Settings) {
    println!("board rotation: {:?}", settings.board_rotation);
    println!("cell rotation:  {:?}", settings.cell_rotation);
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let config = Config::load(&args.config)?;
    log::debug!("Using {:?}", config);
    let scores = FileScoreStore::new(args.scores.unwrap_or(config.scores_path));

    match args
        .command
        .unwrap_or_else(|| Command::Play(PlayArgs::default()))
    {
        Command::Play(play) => {
            let game_config = play.game_config(config.difficulty)?;
            let session = GameSession::new(game_config, play.generator());
            Game::new(session, scores, io::stdin().lock(), io::stdout().lock()).run()?;
        }
        Command::Scores { board } => {
            let board_size = match board {
                Some(board) => BoardSizeKey::from(board.as_str()),
                None => config.difficulty.config().board_size_key(),
            };
            let top = scores
                .top_scores(&board_size)
                .context(FETCH_SCORES_FAILED)?;
            let mut out = io::stdout().lock();
            play::write_scores(&mut out, &board_size, &top)?;
            out.flush()?;
        }
        Command::Settings { action } => {
            let store = SettingsStore::new(args.settings.unwrap_or(config.settings_path));
            let mut tuner = RotationTuner::new(store.load().context(LOAD_SETTINGS_FAILED)?);
            let changed = match action {
                SettingsAction::Show => false,
                SettingsAction::Rotate { axis, steps } => {
                    tuner.rotate(axis, steps);
                    true
                }
                SettingsAction::Reset => {
                    tuner.reset();
                    true
                }
            };
            if changed {
                let saved = store
                    .save(tuner.settings())
                    .context(SAVE_SETTINGS_FAILED)?;
                println!("{}", saved.message);
            }
            print_settings(tuner.settings());
        }
    }
    Ok(())
}
