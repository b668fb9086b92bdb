//! Command-line argument parsing for adls-proxy.

use crate::config::Config;
use crate::error::{ProxyError, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Serverless HTTP-to-SQL proxy for ADLS exports behind a Synapse SQL endpoint.
#[derive(Parser, Debug)]
#[command(name = "adls-proxy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH", env = "ADLS_PROXY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on (overrides the config file)
    #[arg(short = 'l', long, value_name = "ADDR")]
    pub listen: Option<SocketAddr>,

    /// TDS port of the SQL endpoint (overrides the config file)
    #[arg(short = 'p', long, value_name = "PORT")]
    pub sql_port: Option<u16>,

    /// Route prefix for the operation endpoints (overrides the config file)
    #[arg(long, value_name = "PREFIX")]
    pub route_prefix: Option<String>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, value_name = "FILTER", default_value = "info")]
    pub log_level: String,

    /// Disable ANSI colors in log output (also set by NO_COLOR)
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns true if log output should be uncolored.
    pub fn no_color(&self) -> bool {
        self.no_color || std::env::var_os("NO_COLOR").is_some()
    }

    /// Returns the config file path (from CLI or default).
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Applies CLI overrides to a loaded config. CLI flags win over the file
    /// and the environment.
    pub fn apply_overrides(&self, config: &mut Config) -> Result<()> {
        if let Some(listen) = self.listen {
            config.server.listen = listen;
        }
        if let Some(port) = self.sql_port {
            if port == 0 {
                return Err(ProxyError::config("--sql-port must be non-zero"));
            }
            config.sql.port = port;
        }
        if let Some(prefix) = &self.route_prefix {
            config.server.route_prefix = prefix.clone();
        }
        Ok(())
    }
}
