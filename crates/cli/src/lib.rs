//! `qcbingo-cli` library crate.
//!
//! Re-exports the configuration, script and runner modules for integration
//! testing. The binary entrypoint lives in `main.rs`.

pub mod config;
pub mod runner;
pub mod script;
