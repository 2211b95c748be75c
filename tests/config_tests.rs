use std::time::Duration;

use texture_compressor::config::{CompressionSettings, Configuration};

#[test]
fn empty_document_uses_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    assert_eq!(cfg.target_size, 512);
    assert_eq!(cfg.poll_interval, Duration::from_millis(250));
    assert_eq!(cfg.tick_interval, Duration::from_millis(16));
    assert_eq!(cfg.jpeg_quality, 75);
    assert_eq!(
        cfg.settings(),
        CompressionSettings {
            target_size: 512,
            jpeg_quality: 75
        }
    );
}

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
target-size: 256
poll-interval: 1s
tick-interval: 5ms
jpeg-quality: 90
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.target_size, 256);
    assert_eq!(cfg.poll_interval, Duration::from_secs(1));
    assert_eq!(cfg.tick_interval, Duration::from_millis(5));
    assert_eq!(cfg.jpeg_quality, 90);
}

#[test]
fn rejects_zero_target_size() {
    let cfg: Configuration = serde_yaml::from_str("target-size: 0").unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(err.to_string().contains("target-size"), "{err}");
}

#[test]
fn rejects_out_of_range_jpeg_quality() {
    for q in [0, 101] {
        let cfg: Configuration = serde_yaml::from_str(&format!("jpeg-quality: {q}")).unwrap();
        assert!(cfg.validated().is_err(), "quality {q} should be rejected");
    }
}

#[test]
fn rejects_zero_intervals() {
    let cfg: Configuration = serde_yaml::from_str("poll-interval: 0s").unwrap();
    assert!(cfg.validated().is_err());
    let cfg: Configuration = serde_yaml::from_str("tick-interval: 0s").unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "target-size: 128\n").unwrap();
    let cfg = Configuration::from_yaml_file(&path).unwrap();
    assert_eq!(cfg.target_size, 128);
    assert!(Configuration::from_yaml_file(dir.path().join("missing.yaml")).is_err());
}
