//! From loaded records to a drawable map.
//!
//! - [`aggregator`]: per-partner sums, outer merge, balance classification
//! - [`pipeline`]: selection handling and the full build of one map view

pub mod aggregator;
pub mod pipeline;

pub use aggregator::aggregate;
pub use pipeline::{build_map, build_map_cached, BalanceMap, MapView};
