#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use reqmeter_core::ErrorKind;
use reqmeter_server::config::{self, ServerConfig, UnmatchedPaths};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
metrics:
  pth: "/metrics" # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.server.port, 3001);
    assert_eq!(cfg.metrics.path, "/metrics");
    assert_eq!(cfg.metrics.namespace, "backend");
    assert_eq!(cfg.metrics.unmatched_paths, UnmatchedPaths::Collapse);
    assert!(cfg.metrics.process_metrics);
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
server:
  host: "127.0.0.1"
  port: 9000
  request_timeout_ms: 5000
metrics:
  path: /internal/metrics
  namespace: api
  buckets: [0.1, 0.5, 1.0]
  unmatched_paths: raw
  process_metrics: false
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.server.listen_addr().unwrap().to_string(), "127.0.0.1:9000");
    assert_eq!(cfg.metrics.buckets, vec![0.1, 0.5, 1.0]);
    assert_eq!(cfg.metrics.unmatched_paths, UnmatchedPaths::Raw);
}

#[test]
fn non_ascending_buckets_rejected() {
    let bad = r#"
version: 1
metrics:
  buckets: [0.5, 0.1]
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn wrong_version_rejected() {
    assert!(config::load_from_str("version: 2\n").is_err());
}

#[test]
fn bad_metrics_path_rejected() {
    for path in [
        "metrics",
        "/",
        "/metrics/",
        "/health",
        "/metrics/:shard",
        "/*rest",
        "/metrics/{shard}",
    ] {
        let yaml = format!("version: 1\nmetrics:\n  path: \"{path}\"\n");
        assert!(config::load_from_str(&yaml).is_err(), "path {path:?} must be rejected");
    }
}

#[test]
fn port_override() {
    let mut cfg = ServerConfig::default();
    config::apply_port_override(&mut cfg, None).unwrap();
    assert_eq!(cfg.server.port, 3001);

    config::apply_port_override(&mut cfg, Some("")).unwrap();
    assert_eq!(cfg.server.port, 3001);

    config::apply_port_override(&mut cfg, Some("8080")).unwrap();
    assert_eq!(cfg.server.port, 8080);

    let err = config::apply_port_override(&mut cfg, Some("http")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(cfg.server.port, 8080);
}
