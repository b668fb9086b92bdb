//! adls-proxy - A serverless HTTP-to-SQL proxy.
//!
//! Translates JSON request documents into SQL statements for a SQL
//! Server-compatible endpoint and returns the results as JSON. This library
//! exposes the core modules for use by the binary and integration tests.

pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod query;
pub mod request;
pub mod server;
