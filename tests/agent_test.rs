//! End-to-end runs of the agent over each source kind.

use bloom_sensor_agent::{
    agent::{Agent, AgentError, RunOptions, StopReason},
    catalog::{AssetCatalog, AssetPattern},
    config::{Config, Preset},
    core::SelectionMode,
    render::LogRenderer,
    session::SessionSummary,
    source::{
        synthetic, InteractiveSource, LidarSource, MoveCommand, RangeSource, ReplayDevice,
        SourceError, SyntheticSource,
    },
};
use crossbeam_channel::bounded;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bloom-agent-{name}-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn catalog(n: usize) -> AssetCatalog {
    AssetCatalog::new(
        (0..n)
            .map(|i| PathBuf::from(format!("segment_{i:03}.png")))
            .collect(),
    )
    .unwrap()
}

fn fast(max_ticks: Option<u64>) -> RunOptions {
    RunOptions {
        max_ticks,
        fast: true,
    }
}

#[test]
fn test_default_pattern_wilts_and_recovers() {
    let config = Config::default().with_preset(Preset::Synthetic);
    let source = SyntheticSource::from_presence(
        "pattern",
        &synthetic::default_pattern(),
        config.synthetic,
    );
    let mut agent = Agent::new(config, source, LogRenderer::new(), catalog(10)).unwrap();

    let outcome = agent.run(&AtomicBool::new(false), &fast(None)).unwrap();
    assert_eq!(outcome.reason, StopReason::SourceOffline);

    let rows = outcome.session.rows();
    assert_eq!(rows.len(), 280);
    assert_eq!(rows.iter().filter(|r| r.presence).count(), 190);
    assert!(rows[149].presence);
    assert!(!rows[150].presence);

    let summary = outcome.session.summary();
    assert_eq!(summary.min_vitality, Some(0.0));
    // 60 s of recovery at 3/s from zero saturates again
    assert_eq!(summary.final_vitality, Some(100.0));
    assert_eq!(summary.hunched_ticks, 0);
    assert_eq!(outcome.last_report.unwrap().asset_index, 9);
}

#[test]
fn test_waveform_alternates() {
    let config = Config::default().with_preset(Preset::Synthetic);
    let source = SyntheticSource::waveform(
        synthetic::WAVEFORM_LENGTH,
        synthetic::WAVEFORM_FREQUENCY,
        config.synthetic,
    );
    let mut agent = Agent::new(config, source, LogRenderer::new(), catalog(10)).unwrap();

    let outcome = agent.run(&AtomicBool::new(false), &fast(None)).unwrap();
    let rows = outcome.session.rows();
    assert_eq!(rows.len(), synthetic::WAVEFORM_LENGTH);

    let present = rows.iter().filter(|r| r.presence).count();
    assert!(present > 0 && present < rows.len());
    // sin(0) = 0 is not present
    assert!(!rows[0].presence);
}

#[test]
fn test_lidar_replay_run() {
    let dir = test_dir("replay");
    let recording = dir.join("scans.jsonl");

    let sweep = |range: f64| {
        let points: Vec<String> = (0..8)
            .map(|i| format!(r#"{{"angle":{}.0,"range":{range}}}"#, i * 45))
            .collect();
        format!(r#"{{"points":[{}]}}"#, points.join(","))
    };
    let lines = [
        sweep(0.4),
        sweep(0.4),
        sweep(0.4),
        r#"{"error":"checksum mismatch"}"#.to_string(),
        sweep(1.0),
        sweep(1.0),
    ];
    std::fs::write(&recording, lines.join("\n")).unwrap();

    let config = Config::default().with_preset(Preset::Lidar);
    let source = LidarSource::new(ReplayDevice::open(&recording), config.lidar);
    let mut agent = Agent::new(config, source, LogRenderer::new(), catalog(11)).unwrap();

    let outcome = agent.run(&AtomicBool::new(false), &fast(None)).unwrap();
    assert_eq!(outcome.reason, StopReason::SourceOffline);

    let presence: Vec<bool> = outcome.session.rows().iter().map(|r| r.presence).collect();
    // Smoothed: 40, 40, 40, 40 (failed read), 55, 64
    assert_eq!(presence, vec![true, true, true, true, true, false]);

    let summary = outcome.session.summary();
    assert_eq!(summary.read_failures, 1);
    assert_eq!(summary.no_data_ticks, 0);
    assert!(!agent.source().is_online());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_recording_fails_to_start() {
    let config = Config::default().with_preset(Preset::Lidar);
    let source = LidarSource::new(
        ReplayDevice::open("/nonexistent/bloom/scans.jsonl"),
        config.lidar,
    );
    let mut agent = Agent::new(config, source, LogRenderer::new(), catalog(3)).unwrap();

    let result = agent.run(&AtomicBool::new(false), &fast(None));
    assert!(matches!(
        result,
        Err(AgentError::Source(SourceError::Init(_)))
    ));
}

#[test]
fn test_interactive_point_on_target() {
    let mut config = Config::default().with_preset(Preset::Interactive);
    config.interactive.start = config.interactive.target();
    let (sender, receiver) = bounded(8);
    let source = InteractiveSource::new(config.interactive, receiver);
    let mut agent = Agent::new(config, source, LogRenderer::new(), catalog(11)).unwrap();

    let outcome = agent.run(&AtomicBool::new(false), &fast(Some(30))).unwrap();
    assert_eq!(outcome.reason, StopReason::TickLimit);

    let last = outcome.last_report.unwrap();
    assert!(last.classification.presence);
    assert!(last.classification.hunched);
    assert!((last.vitality - 90.0).abs() < 1e-6);
    assert!((last.occupancy.duration - 1.0).abs() < 1e-6);

    sender.send(MoveCommand::Quit).unwrap();
}

#[test]
fn test_interactive_quit_before_first_tick() {
    let config = Config::default().with_preset(Preset::Interactive);
    let (sender, receiver) = bounded(8);
    sender.send(MoveCommand::Quit).unwrap();
    let source = InteractiveSource::new(config.interactive, receiver);
    let mut agent = Agent::new(config, source, LogRenderer::new(), catalog(2)).unwrap();

    let outcome = agent.run(&AtomicBool::new(false), &fast(None)).unwrap();
    assert_eq!(outcome.reason, StopReason::SourceOffline);
    assert!(outcome.session.rows().is_empty());
    assert!(outcome.last_report.is_none());
}

#[test]
fn test_detection_mode_two_assets() {
    let mut config = Config::default().with_preset(Preset::Synthetic);
    config.pipeline.selection = SelectionMode::Detection;
    let source = SyntheticSource::from_presence(
        "pattern",
        &synthetic::pattern_presence(&[(false, 2), (true, 3), (false, 1)]),
        config.synthetic,
    );
    let mut agent = Agent::new(config, source, LogRenderer::new(), catalog(2)).unwrap();

    let outcome = agent.run(&AtomicBool::new(false), &fast(None)).unwrap();
    // absent -> asset 0, present -> asset 1
    assert_eq!(agent.renderer().switches(), 3);
    assert_eq!(outcome.session.summary().asset_switches, 3);
}

#[test]
fn test_session_export() {
    let dir = test_dir("export");
    let config = Config::default().with_preset(Preset::Synthetic);
    let source = SyntheticSource::from_presence(
        "pattern",
        &synthetic::pattern_presence(&[(true, 2), (false, 2)]),
        config.synthetic,
    );
    let mut agent = Agent::new(config, source, LogRenderer::new(), catalog(5)).unwrap();
    let outcome = agent.run(&AtomicBool::new(false), &fast(None)).unwrap();

    let csv_path = dir.join("presence.csv");
    outcome.session.write_csv(&csv_path).unwrap();
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "time(sec),presence(1=True)",
            "1.000,1",
            "2.000,1",
            "3.000,0",
            "4.000,0"
        ]
    );

    let summary = outcome.session.summary();
    let saved = summary.save(&dir).unwrap();
    assert!(saved.exists());

    let loaded = SessionSummary::load_latest(&dir).unwrap().unwrap();
    assert_eq!(loaded.session_id, summary.session_id);
    assert_eq!(loaded.ticks, 4);
    assert_eq!(loaded.present_ticks, 2);
    assert!((loaded.presence_ratio - 0.5).abs() < 1e-9);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_catalog_discovery_drives_selection() {
    let dir = test_dir("catalog");
    for name in ["segment_02.png", "segment_00.png", "segment_01.png", "notes.txt"] {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    let catalog = AssetCatalog::discover(&dir, &AssetPattern::default()).unwrap();
    assert_eq!(catalog.len(), 3);

    let config = Config::default().with_preset(Preset::Synthetic);
    let source = SyntheticSource::from_samples("raw", vec![None]);
    let mut agent = Agent::new(config, source, LogRenderer::new(), catalog).unwrap();
    agent.run(&AtomicBool::new(false), &fast(None)).unwrap();

    // Closed renderer forgets the asset, but a switch to the top image was made
    assert_eq!(agent.renderer().switches(), 1);

    std::fs::remove_dir_all(&dir).unwrap();
}
