//! Backend and browser services.
//!
//! # Services
//!
//! - [`api`] - Country list and map requests to the petmap backend
//! - [`plotly`] - Drawing the returned figure with Plotly.js
//!
//! Plotly itself is loaded by `index.html`; only the bindings live here.

pub mod api;
pub mod plotly;

pub use api::*;
pub use plotly::*;
