//! Demonstration of the Bloom Sensor Agent pipeline.
//!
//! This example shows how to:
//! 1. Build a pipeline from a preset
//! 2. Feed it a scripted presence signal
//! 3. Watch vitality wilt and recover
//! 4. Summarize the session
//!
//! Run with: cargo run --example pipeline_demo
//!
//! No hardware or image files are needed; the asset catalog holds made-up
//! paths and the renderer only logs.

use bloom_sensor_agent::{
    catalog::AssetCatalog,
    config::{Config, Preset},
    core::Pipeline,
    session::SessionLog,
    source::{synthetic, RangeSource, SourceError, SyntheticSource},
    ABOUT,
};
use std::path::PathBuf;

const ASSET_COUNT: usize = 10;

fn main() {
    println!("Bloom Sensor Agent - Pipeline Demo");
    println!("==================================");
    println!();
    println!("{ABOUT}");
    println!();

    let config = Config::default().with_preset(Preset::Synthetic);
    let catalog = AssetCatalog::new(
        (0..ASSET_COUNT)
            .map(|i| PathBuf::from(format!("segment_{i:03}.png")))
            .collect(),
    )
    .expect("catalog has entries");

    let mut source = SyntheticSource::from_presence(
        "pattern",
        &synthetic::default_pattern(),
        config.synthetic,
    );
    let mut pipeline = Pipeline::new(&config.pipeline);
    let mut session = SessionLog::new(source.name());

    println!("Script: 150 s sitting, 30 s away, 40 s sitting, 60 s away");
    println!("Printing every 10th tick...");
    println!();

    source.start().expect("synthetic source always starts");
    loop {
        let sample = match source.next_sample() {
            Ok(sample) => sample,
            Err(SourceError::Offline) => break,
            Err(e) => {
                eprintln!("Read failed: {e}");
                session.record_read_failure();
                None
            }
        };

        let report = pipeline
            .tick(sample, config.dt_secs, catalog.len())
            .expect("catalog is not empty");
        if report.tick % 10 == 0 {
            let asset = catalog
                .get(report.asset_index)
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            println!("{report}  -> {asset}");
        }
        session.record(&report);
    }
    source.stop();

    println!();
    println!("{}", session.summary().display());
}
