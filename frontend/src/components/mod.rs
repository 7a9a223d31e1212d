//! UI Components for the trade balance dashboard.
//!
//! # Layout Components
//! - [`Hero`] - Page heading and description
//! - [`Footer`] - Page footer
//!
//! # Feature Components
//! - [`CountrySelect`] - Multi-select over the reporting countries
//! - [`BalanceMap`] - Plotly map, prompt, and partners without coordinates
//! - [`LogsPanel`] - Real-time backend logs (SSE)

mod balance_map;
mod country_select;
mod footer;
mod hero;
mod logs;

pub use balance_map::*;
pub use country_select::*;
pub use footer::*;
pub use hero::*;
pub use logs::*;
