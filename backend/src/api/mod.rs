//! HTTP API: router, wire types and the log stream.

pub mod logs;
pub mod server;
pub mod types;

pub use server::{build_router, start_server, AppState};
pub use types::*;
