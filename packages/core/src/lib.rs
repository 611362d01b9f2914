// Library root — exposes the pipeline pieces for integration tests in
// `tests/`. Production entry point remains `src/main.rs`.

pub mod alerts;
pub mod db;
pub mod dedup;
pub mod error;
pub mod filter;
pub mod orchestrator;
pub mod repository;
pub mod services;
pub mod types;
pub mod watcher;

// Startup glue used by the binary.
pub mod config;
pub mod logging;
