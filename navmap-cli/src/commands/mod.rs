//! CLI subcommand implementations.

pub mod common;
pub mod config;
pub mod query;
