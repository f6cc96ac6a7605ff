// SQLite backend for the statement executor
//
// - config: options and the fluent options builder
// - params: conversion of bound values to rusqlite values
// - query: result-set extraction
// - executor: the `StatementExecutor` implementation and sequence emulation

pub mod config;
pub mod executor;
pub mod params;
pub mod query;

pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use executor::SqliteExecutor;
pub use params::Params;
pub use query::build_result_set;
