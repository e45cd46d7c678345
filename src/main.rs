//! Sokoban - Main Binary
//!
//! Text-based Sokoban player plus tooling for level files and scores

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use sokoban_engine::{
    game::{
        EngineConfig, GameEngine, GameLogger, InteractiveSession, SessionSnapshot, VerbosityLevel,
    },
    profile::{self, WalkConfig},
    savefile::{self, SaveFile},
    score::{ScoreStore, TOP_TEN},
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sokoban")]
#[command(about = "Sokoban - push every crate onto a diamond", long_about = None)]
struct Cli {
    /// Verbosity level (0=silent, 1=minimal, 2=normal, 3=verbose)
    #[arg(long, short = 'v', default_value = "normal", global = true)]
    verbosity: VerbosityLevel,

    /// Directory holding the per-level score ledgers
    #[arg(long, default_value = "score_lists", global = true)]
    scores_dir: PathBuf,

    /// Name recorded in the score ledgers
    #[arg(long, default_value = "player", global = true)]
    player: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a save file interactively on stdin/stdout
    Play {
        /// Save file (.skb) to load (required unless --start-from is provided)
        #[arg(value_name = "FILE", required_unless_present = "start_from")]
        file: Option<PathBuf>,

        /// Start with debug output enabled
        #[arg(long)]
        debug: bool,

        /// Default target for the `save` command
        #[arg(long, default_value = "saved.skb")]
        save_to: PathBuf,

        /// Write a session snapshot here when quitting mid-game
        #[arg(long, value_name = "SNAPSHOT_FILE")]
        snapshot_output: Option<PathBuf>,

        /// Resume from a session snapshot instead of a save file
        #[arg(long, value_name = "SNAPSHOT_FILE")]
        start_from: Option<PathBuf>,
    },

    /// Parse every .skb file under a directory and report what loads
    Check {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Show the top 10 for a level
    Scores {
        /// Level index (0-based)
        #[arg(value_name = "LEVEL")]
        level: usize,
    },

    /// Run random-walk sessions for profiling (use with cargo-flamegraph)
    Profile {
        /// Save file supplying the levels
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of independent walks
        #[arg(long, short = 'w', default_value_t = 1000)]
        walks: usize,

        /// Steps per walk
        #[arg(long, short = 's', default_value_t = 500)]
        steps: usize,

        /// Random seed for deterministic profiling
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let verbosity = cli.verbosity;

    match cli.command {
        Commands::Play {
            file,
            debug,
            save_to,
            snapshot_output,
            start_from,
        } => {
            let config = EngineConfig { verbosity, debug };
            run_play(
                file,
                start_from,
                config,
                &cli.scores_dir,
                &cli.player,
                save_to,
                snapshot_output,
            )
            .await?
        }
        Commands::Check { dir } => run_check(dir).await?,
        Commands::Scores { level } => run_scores(&cli.scores_dir, level)?,
        Commands::Profile {
            file,
            walks,
            steps,
            seed,
        } => {
            let config = WalkConfig {
                walks,
                steps,
                seed,
                ..WalkConfig::default()
            };
            run_profile(file, config, verbosity).await?
        }
    }

    Ok(())
}

async fn run_play(
    file: Option<PathBuf>,
    start_from: Option<PathBuf>,
    config: EngineConfig,
    scores_dir: &Path,
    player: &str,
    save_to: PathBuf,
    snapshot_output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut engine = match (start_from, file) {
        (Some(snapshot_path), _) => {
            let snapshot = SessionSnapshot::load_from_file(&snapshot_path)
                .with_context(|| format!("reading snapshot {}", snapshot_path.display()))?;
            snapshot.restore(config)?
        }
        (None, Some(path)) => {
            let logger = GameLogger::with_verbosity(config.verbosity);
            let save = SaveFile::load_async(&path, &logger)
                .await
                .with_context(|| format!("loading {}", path.display()))?;
            if save.is_empty() {
                bail!("{} contains no playable levels", path.display());
            }
            GameEngine::with_config(save, config)
        }
        (None, None) => bail!("nothing to play: pass a save file or --start-from"),
    };

    let mut scores = ScoreStore::new(scores_dir);
    let stdin = std::io::stdin();
    InteractiveSession::new(&mut engine, &mut scores, player, save_to)
        .run(stdin.lock(), std::io::stdout())?;

    if let Some(path) = snapshot_output {
        if !engine.is_game_complete() {
            SessionSnapshot::capture(&engine).save_to_file(&path)?;
            println!("Snapshot written to {}", path.display());
        }
    }
    Ok(())
}

async fn run_check(dir: PathBuf) -> anyhow::Result<()> {
    println!("=== Checking save files under {} ===\n", dir.display());

    let results = savefile::scan_directory(&dir)
        .await
        .with_context(|| format!("walking {}", dir.display()))?;

    let mut failures = 0;
    for (path, result) in &results {
        match result {
            Ok(summary) => println!(
                "{}: '{}' {} levels{}",
                path.display(),
                summary.map_set_name,
                summary.levels,
                if summary.warnings > 0 {
                    format!(" ({} warnings)", summary.warnings)
                } else {
                    String::new()
                }
            ),
            Err(e) => {
                failures += 1;
                println!("{}: FAILED ({e})", path.display());
            }
        }
    }

    println!("\n{} files checked, {} failed", results.len(), failures);
    Ok(())
}

fn run_scores(scores_dir: &Path, level: usize) -> anyhow::Result<()> {
    let mut store = ScoreStore::new(scores_dir);
    let ledger = store
        .ledger(level)
        .with_context(|| format!("reading scores for level {level}"))?;
    println!("{}", ledger.display_table(TOP_TEN));
    Ok(())
}

async fn run_profile(
    file: PathBuf,
    config: WalkConfig,
    verbosity: VerbosityLevel,
) -> anyhow::Result<()> {
    println!("=== Sokoban - Profiling Mode ===\n");

    let logger = GameLogger::with_verbosity(verbosity);
    let save = SaveFile::load_async(&file, &logger)
        .await
        .with_context(|| format!("loading {}", file.display()))?;
    if save.is_empty() {
        bail!("{} contains no playable levels", file.display());
    }
    println!(
        "Running {} walks of {} steps over {} levels with seed {}\n",
        config.walks,
        config.steps,
        save.levels.len(),
        config.seed
    );

    let report = profile::profile(save, config).await?;
    let stats = &report.stats;
    println!("Walks:            {}", stats.walks);
    println!("Moves attempted:  {}", stats.attempted);
    println!("Moves accepted:   {}", stats.accepted);
    println!("Crate pushes:     {}", stats.pushes);
    println!("Undos:            {}", stats.undos);
    println!("Levels completed: {}", stats.levels_completed);
    println!("Walk errors:      {}", stats.errors);
    println!(
        "Elapsed:          {:.2}s ({:.0} moves/s)",
        report.elapsed.as_secs_f64(),
        report.moves_per_second()
    );
    println!();
    println!("For CPU profiling:");
    println!(
        "  cargo flamegraph --bin sokoban -- profile {} --walks {} --seed {}",
        file.display(),
        config.walks,
        config.seed
    );

    Ok(())
}
