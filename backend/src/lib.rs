//! # petmap - PET trade balance map
//!
//! Loads WITS trade statistics, aggregates imports and exports per trading
//! partner for the selected reporting countries, and draws each partner's
//! trade balance on a world map.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ XLSX / CSV  │────▶│   Loader    │────▶│ Aggregator  │────▶│ Geo + Plotly│
//! │ (WITS dump) │     │ (memoized)  │     │ (per pair)  │     │  (figure)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use petmap::{build_map, loader, DataSource, MapView};
//!
//! let dataset = loader::load(&DataSource::new("Allcountries_export_WITS.xlsx", "By-HS6Product"))?;
//! if let MapView::Ready(map) = build_map(&dataset, &["Austria", "Slovenia"])? {
//!     println!("{}: {} partners", map.title, map.aggregates.len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per stage
//! - [`models`] - Records, aggregates, selection, map points
//! - [`loader`] - Spreadsheet and CSV loading with row filters
//! - [`cache`] - Once-per-process dataset cache
//! - [`transform`] - Aggregation and the map pipeline
//! - [`geo`] - Coordinates and hover text
//! - [`render`] - Plotly figure and standalone HTML
//! - [`config`] - Environment and CLI configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Loading
pub mod cache;
pub mod loader;

// Aggregation and presentation
pub mod geo;
pub mod render;
pub mod transform;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{
    AggregateError, AggregateResult, ConfigError, LoadError, LoadResult, PipelineError,
    PipelineResult, RenderError, RenderResult, SelectionError, ServerError, ServerResult,
};

pub use models::{
    Coordinate, Direction, HomeMarker, PartnerAggregate, PlottablePoint, Selection, TradeFlow,
    TradeRecord,
};

pub use cache::DatasetCache;
pub use config::AppConfig;
pub use loader::{DataSource, Dataset, LoadReport};
pub use transform::{aggregate, build_map, build_map_cached, BalanceMap, MapView};

pub use api::types::{error_response, CountriesResponse, MapRequest, MapResponse};

// Server
pub mod server {
    pub use crate::api::server::{build_router, start_server, AppState};
}
