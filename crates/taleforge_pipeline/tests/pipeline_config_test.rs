//! Configuration loading and validation tests.

use std::io::Write;
use taleforge_core::ArtifactKind;
use taleforge_pipeline::PipelineConfig;

#[test]
fn test_defaults_match_policy() {
    let config = PipelineConfig::default();
    assert_eq!(config.deadline(ArtifactKind::Text).as_secs(), 30);
    assert_eq!(config.deadline(ArtifactKind::Image).as_secs(), 60);
    assert_eq!(config.deadline(ArtifactKind::Audio).as_secs(), 90);
    assert_eq!(config.deadline(ArtifactKind::Video).as_secs(), 120);
    assert_eq!(config.attempts(ArtifactKind::Text), 3);
    assert_eq!(config.attempts(ArtifactKind::Image), 2);
    assert!(!config.video_requires_narration);
    config.validate().unwrap();
}

#[test]
fn test_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "text_attempts = 5\nbackoff_base_ms = 10\nvideo_requires_narration = true"
    )
    .unwrap();

    let config = PipelineConfig::from_file(&path).unwrap();
    assert_eq!(config.attempts(ArtifactKind::Text), 5);
    assert_eq!(config.backoff_base_ms, 10);
    assert!(config.video_requires_narration);
    // Unset fields keep their defaults.
    assert_eq!(config.attempts(ArtifactKind::Audio), 2);
}

#[test]
fn test_zero_attempts_rejected() {
    let config = PipelineConfig {
        image_attempts: 0,
        ..PipelineConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_inverted_backoff_rejected() {
    let config = PipelineConfig {
        backoff_base_ms: 100,
        backoff_max_ms: 50,
        ..PipelineConfig::default()
    };
    assert!(config.validate().is_err());
}
