//! Loading configuration files from disk.

use std::path::PathBuf;
use std::time::Duration;

use homelink::Error;
use homelink::config::{ConfigError, LinkConfig};

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("homelink-{}-{name}", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn partial_file_keeps_defaults() {
    let path = temp_file(
        "partial.json",
        r#"{ "shading": { "line": { "port": "COM4" }, "exchange_gap_ms": 25 } }"#,
    );

    let c = LinkConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(c.shading.line.port, "COM4");
    assert_eq!(c.shading.line.read_timeout_ms, 200);
    assert_eq!(c.shading.line.poll_interval_ms, 900);
    assert_eq!(c.shading.timing().exchange_gap, Duration::from_millis(25));
    assert_eq!(c.shading.timing().response_settle, Duration::from_millis(30));
    assert_eq!(c.climate, LinkConfig::default().climate);
}

#[test]
fn invalid_values_are_rejected_not_clamped() {
    let path = temp_file(
        "bad.json",
        r#"{ "climate": { "line": { "baud_rate": 0 } } }"#,
    );

    let err = LinkConfig::load(&path).unwrap_err();
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(err, Error::Config(ConfigError::ValidationFailed(_))));
    assert!(err.to_string().starts_with("config: "));
}

#[test]
fn missing_file_is_io_error() {
    let err = LinkConfig::load("/nonexistent/homelink.json").unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Io(_))));
}
