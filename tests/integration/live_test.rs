//! Live endpoint tests.
//!
//! These need a reachable SQL Server-compatible endpoint and credentials from
//! the environment (see `AuthConfig::apply_env_defaults`). Set
//! ADLS_PROXY_TEST_SERVER and ADLS_PROXY_TEST_DATABASE to run them.

use adls_proxy::config::{AuthConfig, SqlConfig};
use adls_proxy::db::{Connector, MssqlConnector, Value};
use adls_proxy::request::Target;

/// Helper to get the test target from the environment.
fn get_test_target() -> Option<Target> {
    Some(Target {
        server: std::env::var("ADLS_PROXY_TEST_SERVER").ok()?,
        database: std::env::var("ADLS_PROXY_TEST_DATABASE").ok()?,
        entity: String::new(),
    })
}

fn test_connector() -> MssqlConnector {
    let mut auth = match std::env::var("SqlConnectionString_Auth_User") {
        Ok(_) => AuthConfig::SqlLogin {
            user: None,
            password: None,
        },
        Err(_) => AuthConfig::default(),
    };
    auth.apply_env_defaults();

    MssqlConnector::new(SqlConfig {
        trust_server_certificate: true,
        auth,
        ..SqlConfig::default()
    })
}

#[tokio::test]
async fn test_execute_scalar_select() {
    let Some(target) = get_test_target() else {
        eprintln!("Skipping test: ADLS_PROXY_TEST_SERVER not set");
        return;
    };

    let client = test_connector().connect(&target).await.unwrap();
    let result = client
        .execute_query("SELECT 1 AS num, 'hello' AS greeting, NULL AS nothing;")
        .await
        .unwrap();

    assert_eq!(result.columns.len(), 3);
    assert_eq!(result.columns[0].name, "num");
    assert_eq!(
        result.rows,
        vec![vec![Value::Int(1), Value::from("hello"), Value::Null]]
    );

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_is_empty_statement_returns_one_row() {
    let Some(target) = get_test_target() else {
        eprintln!("Skipping test: ADLS_PROXY_TEST_SERVER not set");
        return;
    };

    let client = test_connector().connect(&target).await.unwrap();
    let result = client
        .execute_query("IF EXISTS (SELECT TOP 1 1 FROM sys.objects) SELECT 0 ELSE SELECT 1;")
        .await
        .unwrap();

    assert_eq!(result.first_value(), Some(&Value::Int(0)));
    client.close().await.unwrap();
}

#[tokio::test(flavor = "current_thread")]
async fn test_connect_with_invalid_host() {
    let connector = MssqlConnector::new(SqlConfig {
        connect_timeout_secs: 5,
        auth: AuthConfig::SqlLogin {
            user: Some("reader".to_string()),
            password: Some("secret".to_string()),
        },
        ..SqlConfig::default()
    });
    let target = Target {
        server: "invalid.host.that.does.not.exist.local".to_string(),
        database: "db".to_string(),
        entity: "t".to_string(),
    };

    let err = connector.connect(&target).await.err().unwrap();
    assert_eq!(err.category(), "Connection Error");
}
