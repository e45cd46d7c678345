//! Random-walk profiling
//!
//! Runs many independent sessions over the same level set in parallel, each
//! driven by a seeded random walk of moves and occasional undos. Useful for
//! flamegraphs and for shaking out engine invariants on real level files.

use crate::core::Direction;
use crate::game::{EngineConfig, GameEngine, VerbosityLevel};
use crate::savefile::SaveFile;
use crate::Result;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::time::{Duration, Instant};

/// Shape of a profiling run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkConfig {
    pub walks: usize,
    /// Moves attempted per walk
    pub steps: usize,
    pub seed: u64,
    /// Chance that a step is an undo instead of a move
    pub undo_probability: f64,
}

impl Default for WalkConfig {
    fn default() -> Self {
        WalkConfig {
            walks: 1000,
            steps: 500,
            seed: 42,
            undo_probability: 0.1,
        }
    }
}

/// Totals across every walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub walks: usize,
    pub attempted: u64,
    pub accepted: u64,
    pub pushes: u64,
    pub undos: u64,
    pub levels_completed: u64,
    /// Walks stopped early by an engine error
    pub errors: usize,
}

impl WalkStats {
    fn merge(mut self, other: WalkStats) -> WalkStats {
        self.walks += other.walks;
        self.attempted += other.attempted;
        self.accepted += other.accepted;
        self.pushes += other.pushes;
        self.undos += other.undos;
        self.levels_completed += other.levels_completed;
        self.errors += other.errors;
        self
    }
}

/// One seeded walk over a fresh session
fn walk(save: &SaveFile, config: &WalkConfig, walk_index: usize) -> WalkStats {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(walk_index as u64));
    let mut engine = GameEngine::with_config(
        save.clone(),
        EngineConfig::new(VerbosityLevel::Silent),
    );
    let mut stats = WalkStats {
        walks: 1,
        ..WalkStats::default()
    };

    for _ in 0..config.steps {
        if engine.is_game_complete() {
            break;
        }

        if rng.gen_bool(config.undo_probability) {
            match engine.undo() {
                Ok(true) => stats.undos += 1,
                Ok(false) => {}
                Err(_) => {
                    stats.errors += 1;
                    break;
                }
            }
            continue;
        }

        let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        stats.attempted += 1;
        match engine.move_keeper(direction) {
            Ok(outcome) => {
                if outcome.accepted {
                    stats.accepted += 1;
                }
                if outcome.pushed_crate {
                    stats.pushes += 1;
                }
                if outcome.level_completed {
                    stats.levels_completed += 1;
                    engine.acknowledge_level_complete();
                }
            }
            Err(_) => {
                stats.errors += 1;
                break;
            }
        }
    }
    stats
}

/// Run every walk on the rayon pool and sum the results
pub fn run_random_walks(save: &SaveFile, config: &WalkConfig) -> WalkStats {
    (0..config.walks)
        .into_par_iter()
        .map(|i| walk(save, config, i))
        .reduce(WalkStats::default, WalkStats::merge)
}

/// Timed report of a profiling run
#[derive(Debug, Clone)]
pub struct ProfileReport {
    pub stats: WalkStats,
    pub elapsed: Duration,
}

impl ProfileReport {
    pub fn moves_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.stats.attempted as f64 / secs
        }
    }
}

/// Run the walks off the async runtime's worker threads
pub async fn profile(save: SaveFile, config: WalkConfig) -> Result<ProfileReport> {
    let report = tokio::task::spawn_blocking(move || {
        let start = Instant::now();
        let stats = run_random_walks(&save, &config);
        ProfileReport {
            stats,
            elapsed: start.elapsed(),
        }
    })
    .await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameLogger;

    fn sample() -> SaveFile {
        let mut logger = GameLogger::new();
        logger.enable_capture();
        SaveFile::parse(
            "MapSetName: Walk\nLevelName: A\nWWWWWWW\nWS C DW\nW     W\nWWWWWWW\n",
            &logger,
        )
    }

    #[test]
    fn test_walks_are_deterministic() {
        let save = sample();
        let config = WalkConfig {
            walks: 16,
            steps: 200,
            seed: 7,
            undo_probability: 0.2,
        };
        let first = run_random_walks(&save, &config);
        let second = run_random_walks(&save, &config);
        assert_eq!(first, second);
        assert_eq!(first.walks, 16);
        assert_eq!(first.errors, 0);
        assert!(first.accepted <= first.attempted);
    }

    #[tokio::test]
    async fn test_profile_async() {
        let config = WalkConfig {
            walks: 4,
            steps: 50,
            ..WalkConfig::default()
        };
        let report = profile(sample(), config).await.unwrap();
        assert_eq!(report.stats.walks, 4);
    }
}
