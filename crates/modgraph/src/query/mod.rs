//! Read-only queries over a [`Graph`](crate::graph::Graph).
//!
//! Every query is a pure function of the graph and its arguments.

mod impact;
mod order;
mod search;

pub use impact::{dependencies, dependents, impact};
pub use order::{cycles, topo_sort};
pub use search::{search, tokenize};
