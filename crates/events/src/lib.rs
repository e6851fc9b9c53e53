//! Bingo event bus.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`BingoEvent`] -- the event envelope hosts fan out to score boards,
//!   progress widgets and any realtime channel they maintain.

pub mod bus;

pub use bus::{BingoEvent, EventBus};
