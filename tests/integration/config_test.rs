//! Configuration file integration tests.

use adls_proxy::cli::Cli;
use adls_proxy::config::{AuthConfig, Config};
use clap::Parser;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_load_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[server]
listen = "127.0.0.1:7072"

[sql]
trust_server_certificate = true

[sql.auth]
method = "managed_identity"
client_id = "11111111-2222-3333-4444-555555555555"
"#,
    )
    .unwrap();

    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.server.listen.port(), 7072);
    assert_eq!(config.server.route_prefix, "/api");
    assert!(config.sql.trust_server_certificate);
    assert_eq!(
        config.sql.auth,
        AuthConfig::ManagedIdentity {
            client_id: Some("11111111-2222-3333-4444-555555555555".to_string())
        }
    );
}

#[test]
fn test_invalid_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[server]\nlisten = 12").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));
}

#[test]
fn test_cli_overrides_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[sql]\nport = 1444\n").unwrap();

    let cli = Cli::parse_from([
        "adls-proxy",
        "--config",
        path.to_str().unwrap(),
        "--sql-port",
        "1500",
    ]);
    let mut config = Config::load_from_file(&cli.config_path()).unwrap();
    assert_eq!(config.sql.port, 1444);

    cli.apply_overrides(&mut config).unwrap();
    assert_eq!(config.sql.port, 1500);
}
