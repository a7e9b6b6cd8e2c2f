#![forbid(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]
pub mod hypergraph;
pub mod order;
pub mod pomset;

pub use hypergraph::{BipartiteVertex, Direction, EdgeStatistic, Hypergraph};
pub use order::{Order, Relation};
pub use pomset::{Label, Pomset};
