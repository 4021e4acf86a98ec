use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chess_analysis::sample::OPERA_GAME_PGN;
use chess_analysis::{GameAnalyzer, LiveCoach};
use chess_coach::config::CoachConfig;
use chess_coach::{render, session};
use chess_core::Color;
use chess_openings::{builtin, Opening, OpeningBook, OpeningDatabase};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chess-coach")]
#[command(about = "Opening practice, game review and live play against a UCI engine")]
struct Cli {
    /// Configuration file (defaults to coach.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List curated openings
    Openings {
        /// Only openings for this side (white or black)
        #[arg(long)]
        side: Option<Color>,
        /// Case-insensitive name filter
        #[arg(long)]
        search: Option<String>,
    },
    /// Show an annotated opening line
    Line {
        /// Opening id, as shown by `openings`
        opening: String,
        /// Line number within the opening
        #[arg(short, long, default_value = "0")]
        line: usize,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Review a game with the engine
    Review {
        /// PGN file to analyse (defaults to the bundled Opera Game)
        #[arg(long)]
        pgn: Option<PathBuf>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Play a graded game against the engine
    Play {
        /// Your side
        #[arg(long, default_value = "white")]
        color: Color,
    },
}

/// Openings for `side` whose name matches `search`, in database order.
fn select_openings<'a>(
    db: &'a OpeningDatabase,
    side: Option<Color>,
    search: Option<&str>,
) -> Vec<&'a Opening> {
    let mut openings = match side {
        Some(side) => db.by_side(side),
        None => db.all().iter().collect(),
    };
    if let Some(query) = search {
        let matches = db.search(query);
        openings.retain(|o| matches.iter().any(|m| m.id == o.id));
    }
    openings
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(CoachConfig::default_path);
    let config = CoachConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Openings { side, search } => {
            let db = builtin()?;
            print!("{}", render::opening_list(select_openings(&db, side, search.as_deref())));
        }
        Commands::Line {
            opening,
            line,
            json,
        } => {
            let book = OpeningBook::build(&builtin()?)?;
            let found = book
                .opening(&opening)
                .ok_or_else(|| anyhow!("unknown opening '{opening}'"))?;
            let annotated = found
                .lines
                .get(line)
                .ok_or_else(|| anyhow!("opening '{opening}' has {} line(s)", found.lines.len()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(annotated)?);
            } else {
                print!("{}", render::annotated_line(found, annotated));
            }
        }
        Commands::Review { pgn, json } => {
            let text = match &pgn {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => OPERA_GAME_PGN.to_string(),
            };
            let analyzer = GameAnalyzer::new(config.engine_factory(), config.analysis_config());
            let analysis = analyzer.analyze_pgn(&text)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print!("{}", render::analysis_table(&analysis));
            }
        }
        Commands::Play { color } => {
            let coach = LiveCoach::new(config.engine_factory(), config.analysis_config());
            let stdin = io::stdin();
            session::run(&coach, color, stdin.lock(), &mut io::stdout())?;
        }
    }

    Ok(())
}
