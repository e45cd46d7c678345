//! Performance benchmarks for the move/undo state machine
//!
//! Measures move-and-reset throughput on an open room, push-and-undo cycles
//! and the parallel random walks behind `sokoban profile`.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sokoban_engine::core::Direction;
use sokoban_engine::game::{EngineConfig, GameEngine, GameLogger, VerbosityLevel};
use sokoban_engine::profile::{run_random_walks, WalkConfig};
use sokoban_engine::savefile::SaveFile;

const ROOM: &str = "MapSetName: Bench
LevelName: Room
WWWWWWWWWW
WS       W
W   C    W
W        W
W       DW
WWWWWWWWWW
";

fn config() -> EngineConfig {
    EngineConfig::new(VerbosityLevel::Silent)
}

fn bench_walk_and_undo(c: &mut Criterion) {
    c.bench_function("walk_right_left_with_undo", |b| {
        let mut engine = GameEngine::from_text(ROOM, config());
        b.iter(|| {
            for _ in 0..6 {
                black_box(engine.move_keeper(Direction::Right).ok());
            }
            black_box(engine.reset_level().ok());
        });
    });
}

fn bench_push_cycle(c: &mut Criterion) {
    c.bench_function("push_and_undo", |b| {
        let mut engine = GameEngine::from_text(ROOM, config());
        // Stand left of the crate
        engine.move_keeper(Direction::Down).ok();
        engine.move_keeper(Direction::Right).ok();
        engine.move_keeper(Direction::Right).ok();
        b.iter(|| {
            black_box(engine.move_keeper(Direction::Right).ok());
            black_box(engine.undo().ok());
        });
    });
}

fn bench_random_walks(c: &mut Criterion) {
    let save = SaveFile::parse(ROOM, &GameLogger::with_verbosity(VerbosityLevel::Silent));
    let walk = WalkConfig {
        walks: 64,
        steps: 200,
        seed: 42,
        undo_probability: 0.1,
    };
    c.bench_function("random_walks_64x200", |b| {
        b.iter(|| black_box(run_random_walks(&save, &walk)));
    });
}

criterion_group!(
    benches,
    bench_walk_and_undo,
    bench_push_cycle,
    bench_random_walks
);
criterion_main!(benches);
