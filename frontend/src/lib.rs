//! petmap dashboard - Leptos WebAssembly frontend
//!
//! Picks reporting countries, asks the backend for the aggregated trade
//! balance and draws the returned Plotly figure.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        App                                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Hero (heading)                                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  MainContent                                                │
//! │  ├── CountrySelect  ──selected──▶  BalanceMap               │
//! │  │                                 ├── prompt / map         │
//! │  │                                 └── UnplottedPartners    │
//! │  └── LogsPanel (SSE)                                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Footer                                                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`types`] - Wire types and errors
//! - [`components`] - UI components
//! - [`services`] - Backend calls and Plotly bindings

use leptos::*;
use leptos_meta::*;
use leptos_router::*;

// =============================================================================
// Module declarations
// =============================================================================

pub mod components;
pub mod config;
pub mod services;
pub mod types;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::*;

pub use types::{
    // Logs
    LogEntry, LogLevel,
    // API
    CountriesResponse, MapResponse, MapStatus, PartnerAggregate,
    // Errors
    AppError, AppResult,
};

pub use components::*;

pub use services::*;

// =============================================================================
// Application
// =============================================================================

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text=MAP_HEADING/>
        <Router>
            <main>
                <Routes>
                    <Route path="/" view=MainContent/>
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn MainContent() -> impl IntoView {
    let (selected, set_selected) = create_signal(Vec::<String>::new());
    let (logs, set_logs) = create_signal(Vec::<LogEntry>::new());

    // one SSE connection for the app's lifetime
    init_sse_logs(set_logs);

    view! {
        <div class="container">
            <Hero/>
            <CountrySelect set_selected=set_selected/>
            <BalanceMap selected=selected/>
            <Show when=move || !logs.get().is_empty() fallback=|| view! {}>
                <LogsPanel logs=logs set_logs=set_logs/>
            </Show>
        </div>

        <Footer/>
    }
}
