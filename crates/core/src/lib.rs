//! `qcbingo-core` -- domain logic for the quality-control bingo board.
//!
//! Everything here is synchronous and free of I/O. Hosts supply catalogs
//! and compatibility rules, drive a [`session::GameSession`] with placement
//! and mark triggers, and decide for themselves how to persist the
//! serialisable snapshots it returns.

pub mod board;
pub mod catalog;
pub mod compatibility;
pub mod error;
pub mod lines;
pub mod metrics;
pub mod review;
pub mod session;
pub mod types;
