//! CLI module for mirrordb
//!
//! Provides command-line access to:
//! - init: create the data directory and seed the table
//! - count/find/find-one/distinct/aggregate/upsert: one store call per run
//! - stats/search/recent/top: catalogue queries

mod args;
mod commands;
mod config;
mod errors;
mod io;
mod requests;

pub use args::{Cli, Command};
pub use commands::{execute, init, run, run_command, run_operation, Operation};
pub use config::{Config, REMOTE_URI_ENV};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_request, read_request, write_error, write_response};
