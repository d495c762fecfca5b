//! Command-line interface for the custodian tooling

pub mod commands;

pub use commands::CliResult;
