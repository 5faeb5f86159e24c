//! CLI command implementations.

pub mod display;

pub mod cycles;
pub mod deps;
pub mod impact;
pub mod index;
pub mod order;
pub mod search;
pub mod stale;
pub mod stats;
