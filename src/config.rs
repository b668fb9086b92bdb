//! Configuration management for adls-proxy.
//!
//! Handles loading configuration from TOML files and environment variables.
//! The request body names the SQL endpoint and database; everything else the
//! proxy needs to reach them (port, TLS, credentials, timeouts) lives here.

use crate::error::{ProxyError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Environment variable Azure Functions sets for custom handlers.
pub const CUSTOM_HANDLER_PORT_ENV: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";

/// Main configuration structure for adls-proxy.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// SQL endpoint settings.
    #[serde(default)]
    pub sql: SqlConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Prefix for the operation routes.
    #[serde(default = "default_route_prefix")]
    pub route_prefix: String,
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 7071))
}

fn default_route_prefix() -> String {
    "/api".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            route_prefix: default_route_prefix(),
        }
    }
}

/// SQL endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SqlConfig {
    /// TDS port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Require an encrypted connection.
    #[serde(default = "default_true")]
    pub encrypt: bool,

    /// Accept any server certificate (local testing only).
    #[serde(default)]
    pub trust_server_certificate: bool,

    /// Seconds to wait for the TCP connection and login.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Seconds to wait for a statement to complete.
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,

    /// How the proxy authenticates against the endpoint.
    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_port() -> u16 {
    1433
}

fn default_true() -> bool {
    true
}

fn default_connect_timeout() -> u64 {
    15
}

fn default_query_timeout() -> u64 {
    30
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            encrypt: true,
            trust_server_certificate: false,
            connect_timeout_secs: default_connect_timeout(),
            query_timeout_secs: default_query_timeout(),
            auth: AuthConfig::default(),
        }
    }
}

/// Authentication method for the SQL endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AuthConfig {
    /// Azure AD token from the host's managed identity.
    ManagedIdentity {
        /// Client ID of a user-assigned identity; system-assigned if absent.
        #[serde(default)]
        client_id: Option<String>,
    },

    /// Azure AD token from a service principal's client secret.
    ServicePrincipal {
        #[serde(default)]
        tenant_id: Option<String>,
        #[serde(default)]
        client_id: Option<String>,
        #[serde(default)]
        client_secret: Option<String>,
    },

    /// SQL login with user name and password.
    SqlLogin {
        #[serde(default)]
        user: Option<String>,
        #[serde(default)]
        password: Option<String>,
    },
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::ManagedIdentity { client_id: None }
    }
}

impl AuthConfig {
    /// Returns the method name for log output.
    pub fn method_name(&self) -> &'static str {
        match self {
            Self::ManagedIdentity { .. } => "managed_identity",
            Self::ServicePrincipal { .. } => "service_principal",
            Self::SqlLogin { .. } => "sql_login",
        }
    }

    /// Fills unset credentials from environment variables.
    ///
    /// Service principal credentials fall back to `SqlConnectionString_Auth_User`
    /// / `SqlConnectionString_Auth_Password` (the Functions app settings) and
    /// then `AZURE_CLIENT_ID` / `AZURE_CLIENT_SECRET`.
    pub fn apply_env_defaults(&mut self) {
        match self {
            Self::ManagedIdentity { client_id } => {
                if client_id.is_none() {
                    *client_id = env_var("AZURE_CLIENT_ID");
                }
            }
            Self::ServicePrincipal {
                tenant_id,
                client_id,
                client_secret,
            } => {
                if tenant_id.is_none() {
                    *tenant_id = env_var("AZURE_TENANT_ID");
                }
                if client_id.is_none() {
                    *client_id = env_var("SqlConnectionString_Auth_User")
                        .or_else(|| env_var("AZURE_CLIENT_ID"));
                }
                if client_secret.is_none() {
                    *client_secret = env_var("SqlConnectionString_Auth_Password")
                        .or_else(|| env_var("AZURE_CLIENT_SECRET"));
                }
            }
            Self::SqlLogin { user, password } => {
                if user.is_none() {
                    *user = env_var("SqlConnectionString_Auth_User");
                }
                if password.is_none() {
                    *password = env_var("SqlConnectionString_Auth_Password");
                }
            }
        }
    }

    /// Checks that every credential the method needs is present.
    pub fn validate(&self) -> Result<()> {
        let missing = match self {
            Self::ManagedIdentity { .. } => None,
            Self::ServicePrincipal {
                tenant_id,
                client_id,
                client_secret,
            } => {
                if tenant_id.is_none() {
                    Some("tenant_id")
                } else if client_id.is_none() {
                    Some("client_id")
                } else if client_secret.is_none() {
                    Some("client_secret")
                } else {
                    None
                }
            }
            Self::SqlLogin { user, password } => {
                if user.is_none() {
                    Some("user")
                } else if password.is_none() {
                    Some("password")
                } else {
                    None
                }
            }
        };

        match missing {
            Some(field) => Err(ProxyError::config(format!(
                "sql.auth method '{}' requires '{field}'",
                self.method_name()
            ))),
            None => Ok(()),
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("adls-proxy")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ProxyError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            ProxyError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies environment variables as defaults and overrides.
    ///
    /// `FUNCTIONS_CUSTOMHANDLER_PORT` replaces the listen port, since the
    /// Functions host decides where the handler must listen.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(listen) = env_var("ADLS_PROXY_LISTEN") {
            self.server.listen = listen.parse().map_err(|e| {
                ProxyError::config(format!("Invalid ADLS_PROXY_LISTEN '{listen}': {e}"))
            })?;
        }
        if let Some(port) = env_var(CUSTOM_HANDLER_PORT_ENV) {
            let port: u16 = port.parse().map_err(|e| {
                ProxyError::config(format!("Invalid {CUSTOM_HANDLER_PORT_ENV} '{port}': {e}"))
            })?;
            self.server.listen.set_port(port);
        }
        self.sql.auth.apply_env_defaults();
        Ok(())
    }
}
