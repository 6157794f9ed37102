//! CLI command implementations
//!
//! Every store command runs the same sequence:
//! 1. Load and validate configuration
//! 2. Set the log threshold
//! 3. Acquire a store through the selector
//! 4. Read the request (if the command takes one), execute, respond

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::{json, Value};

use crate::catalog::{Catalog, SearchParams};
use crate::cursor::SortSpec;
use crate::document::Document;
use crate::observability::{Event, Logger};
use crate::store::{LocalStore, StoreError};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};
use super::requests::{
    decode, AggregateRequest, CountRequest, DistinctRequest, FindOneRequest, FindRequest,
    UpsertRequest,
};

/// A store command with its non-stdin arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Count,
    Find,
    FindOne,
    Distinct,
    Aggregate,
    Upsert { raw: bool },
    Stats,
    Search,
    Recent { limit: usize, channel: Option<String> },
    Top { sort_by: String, limit: usize },
}

impl Operation {
    /// Whether a request object is read from stdin
    pub fn reads_request(&self) -> bool {
        !matches!(
            self,
            Operation::Stats | Operation::Recent { .. } | Operation::Top { .. }
        )
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command. Failures are
/// also reported as an error response on stdout.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    let result = run_command(cli.command);
    if let Err(e) = &result {
        write_error(e.code_str(), e.message())?;
    }
    result
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let config_path = cmd.config().to_path_buf();
    let operation = match cmd {
        Command::Init { .. } => return init(&config_path),
        Command::Count { .. } => Operation::Count,
        Command::Find { .. } => Operation::Find,
        Command::FindOne { .. } => Operation::FindOne,
        Command::Distinct { .. } => Operation::Distinct,
        Command::Aggregate { .. } => Operation::Aggregate,
        Command::Upsert { raw, .. } => Operation::Upsert { raw },
        Command::Stats { .. } => Operation::Stats,
        Command::Search { .. } => Operation::Search,
        Command::Recent { limit, channel, .. } => Operation::Recent { limit, channel },
        Command::Top { sort_by, limit, .. } => Operation::Top { sort_by, limit },
    };
    run_operation(&config_path, operation)
}

fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.min_severity()?);

    let shown_path = config_path.display().to_string();
    Logger::info(
        Event::ConfigLoaded,
        &[
            ("path", shown_path.as_str()),
            ("data_dir", config.data_dir.as_str()),
            ("unsupported_operators", config.unsupported_operators.as_str()),
        ],
    );
    Ok(config)
}

/// Create the data directory and bootstrap the table
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let data_dir = config.data_path();

    fs::create_dir_all(data_dir).map_err(|e| {
        CliError::config_error(format!("Failed to create directory {:?}: {}", data_dir, e))
    })?;

    let options = config.selector_options()?;
    let store = LocalStore::open(data_dir, &options.seed, options.policy)?;
    let records = store.table().len()?;

    write_response(json!({
        "initialized": true,
        "path": store.table().path().display().to_string(),
        "records": records,
    }))
}

/// Load config, acquire a store, execute one operation and respond
pub fn run_operation(config_path: &Path, operation: Operation) -> CliResult<()> {
    let config = load_config(config_path)?;
    let selector = config.build_selector()?;
    let catalog = Catalog::new(selector.acquire_with_indexes()?);

    let request = if operation.reads_request() {
        read_request()?
    } else {
        Value::Null
    };

    let data = execute(&catalog, &operation, request)?;
    write_response(data)
}

/// Executes `operation` against `catalog`'s store and returns the response
/// payload.
pub fn execute(catalog: &Catalog, operation: &Operation, request: Value) -> CliResult<Value> {
    let store = catalog.store();

    match operation {
        Operation::Count => {
            let request: CountRequest = decode(request)?;
            Ok(json!(store.count(&request.filter)?))
        }
        Operation::Find => {
            let request: FindRequest = decode(request)?;
            let mut cursor = store.find(&request.filter)?.skip(request.skip);
            if let Some(sort) = &request.sort {
                cursor = cursor.sort_by(parse_sort(sort)?);
            }
            if let Some(limit) = request.limit {
                cursor = cursor.limit(limit);
            }
            documents(cursor.fetch()?)
        }
        Operation::FindOne => {
            let request: FindOneRequest = decode(request)?;
            let sort = request.sort.as_ref().map(parse_sort).transpose()?;
            let found = store.find_one(&request.filter, sort.as_ref())?;
            Ok(found.map(Value::Object).unwrap_or(Value::Null))
        }
        Operation::Distinct => {
            let request: DistinctRequest = decode(request)?;
            Ok(Value::Array(store.distinct(&request.field)?))
        }
        Operation::Aggregate => {
            let request: AggregateRequest = decode(request)?;
            documents(store.aggregate(&request.pipeline)?)
        }
        Operation::Upsert { raw } => {
            let request: UpsertRequest = decode(request)?;
            let inserted = if *raw {
                catalog.ingest(&request.document)?
            } else {
                store.upsert(request.document)?
            };
            Ok(json!({"inserted": inserted}))
        }
        Operation::Stats => to_value(&catalog.statistics()?),
        Operation::Search => {
            let params: SearchParams = decode(request)?;
            to_value(&catalog.search(&params)?)
        }
        Operation::Recent { limit, channel } => {
            documents(catalog.recent(*limit, channel.as_deref())?)
        }
        Operation::Top { sort_by, limit } => documents(catalog.top(sort_by, *limit)?),
    }
}

fn parse_sort(sort: &Value) -> CliResult<SortSpec> {
    SortSpec::from_value(sort).map_err(|reason| StoreError::InvalidSort(reason).into())
}

fn documents(docs: Vec<Document>) -> CliResult<Value> {
    Ok(Value::Array(docs.into_iter().map(Value::Object).collect()))
}

fn to_value<T: Serialize>(value: &T) -> CliResult<Value> {
    Ok(serde_json::to_value(value)?)
}
