//! Benchmark for SKB save file parsing and writing

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sokoban_engine::game::{GameLogger, VerbosityLevel};
use sokoban_engine::savefile::{self, SaveFile};
use std::fs;
use std::path::PathBuf;

fn quiet_logger() -> GameLogger {
    let mut logger = GameLogger::with_verbosity(VerbosityLevel::Silent);
    logger.enable_capture();
    logger.set_timestamps(false);
    logger
}

/// A synthetic set of `count` open rooms, each `size` cells square
fn synthetic_save(count: usize, size: usize) -> String {
    let mut out = String::from("MapSetName: Synthetic\n");
    for i in 0..count {
        out.push_str(&format!("LevelName: Room {i}\n"));
        for row in 0..size {
            let line: String = (0..size)
                .map(|col| {
                    if row == 0 || col == 0 || row == size - 1 || col == size - 1 {
                        'W'
                    } else if row == 1 && col == 1 {
                        'S'
                    } else if row == size / 2 && col == size / 2 {
                        'C'
                    } else if row == size - 2 && col == size - 2 {
                        'D'
                    } else {
                        ' '
                    }
                })
                .collect();
            out.push_str(&line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

fn load_samples() -> Vec<(String, String)> {
    let mut samples = vec![
        ("synthetic_10x8".to_string(), synthetic_save(10, 8)),
        ("synthetic_100x20".to_string(), synthetic_save(100, 20)),
    ];

    let sample_path = PathBuf::from("levels/sample.skb");
    match fs::read_to_string(&sample_path) {
        Ok(contents) => samples.push(("sample.skb".to_string(), contents)),
        Err(_) => eprintln!(
            "Warning: {} not found, using synthetic samples only",
            sample_path.display()
        ),
    }
    samples
}

fn bench_parse(c: &mut Criterion) {
    let samples = load_samples();
    let logger = quiet_logger();

    let mut group = c.benchmark_group("parse_save");
    for (name, contents) in &samples {
        group.throughput(Throughput::Bytes(contents.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), contents, |b, contents| {
            b.iter(|| {
                let save = savefile::parse_save(black_box(contents), &logger);
                black_box(save)
            });
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let logger = quiet_logger();
    let save = SaveFile::parse(&synthetic_save(100, 20), &logger);

    c.bench_function("render_save_100x20", |b| {
        b.iter(|| black_box(save.to_text()));
    });
}

criterion_group!(benches, bench_parse, bench_render);
criterion_main!(benches);
