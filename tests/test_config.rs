use std::io::Write;
use std::time::Duration;

use sluice::config::Config;
use sluice::net::ConnectionConfig;
use sluice::reactor::ReactorConfig;

// Every test touching LISTEN lives here; tests in one binary share the
// process environment.
#[test]
fn test_config_listen_env_override() {
    unsafe {
        std::env::remove_var("LISTEN");
    }
    assert_eq!(Config::load().server.listen_addr, "0.0.0.0:8080");

    unsafe {
        std::env::set_var("LISTEN", "127.0.0.1:3000");
    }
    assert_eq!(Config::load().server.listen_addr, "127.0.0.1:3000");

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "server:\n  listen_addr: \"10.0.0.1:80\"").unwrap();
    let cfg = Config::load_from(file.path()).unwrap();
    assert_eq!(cfg.server.listen_addr, "127.0.0.1:3000");

    unsafe {
        std::env::remove_var("LISTEN");
    }
}

#[test]
fn test_config_defaults_match_runtime_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.connection_config(), ConnectionConfig::default());
    assert_eq!(cfg.reactor_config(), ReactorConfig::default());
    assert_eq!(cfg.log_level, "info");
}

#[test]
fn test_config_empty_yaml_is_default() {
    assert_eq!(Config::from_yaml_str("").unwrap(), Config::default());
    assert_eq!(Config::from_yaml_str("  \n").unwrap(), Config::default());
}

#[test]
fn test_config_partial_yaml_keeps_other_defaults() {
    let cfg = Config::from_yaml_str(
        "
reactor:
  tick_ms: 250
connection:
  io_timeout_ms: 1500
  max_frame_bytes: 4096
log_level: debug
",
    )
    .unwrap();

    assert_eq!(cfg.reactor_config().tick, Duration::from_millis(250));
    let conn = cfg.connection_config();
    assert_eq!(conn.io_timeout, Duration::from_millis(1500));
    assert_eq!(conn.max_frame_bytes, 4096);
    assert_eq!(conn.read_chunk, ConnectionConfig::default().read_chunk);
    assert_eq!(cfg.max_level().unwrap(), tracing::Level::DEBUG);
    assert_eq!(cfg.server.listen_addr, "0.0.0.0:8080");
}

#[test]
fn test_config_rejects_unknown_types() {
    assert!(Config::from_yaml_str("reactor:\n  tick_ms: soon\n").is_err());
}

#[test]
fn test_config_rejects_unknown_keys() {
    // The document root is a command line argument, not a config setting.
    assert!(Config::from_yaml_str("server:\n  docroot: /srv/www\n").is_err());
    assert!(Config::from_yaml_str("reactor:\n  tick: 5\n").is_err());
    assert!(Config::from_yaml_str("verbose: true\n").is_err());
}

#[test]
fn test_config_invalid_log_level() {
    let cfg = Config {
        log_level: "chatty".to_string(),
        ..Config::default()
    };

    assert!(cfg.max_level().is_err());
}

#[test]
fn test_config_listen_on_replaces_port() {
    let cfg = Config::default();

    assert_eq!(cfg.listen_on(9090).unwrap().to_string(), "0.0.0.0:9090");

    let mut bad = Config::default();
    bad.server.listen_addr = "localhost".to_string();
    assert!(bad.listen_on(80).is_err());
}

#[test]
fn test_config_load_from_missing_file() {
    assert!(Config::load_from("/definitely/not/here.yaml").is_err());
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::default();
    let cfg2 = cfg1.clone();
    assert_eq!(cfg1, cfg2);
}
