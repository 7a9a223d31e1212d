//! Application configuration.
//!
//! Hardcoded for local development: the dashboard talks to a backend
//! started with `petmap serve`.

/// Backend API base URL.
pub const BACKEND_URL: &str = "http://localhost:3000";

/// Page heading.
pub const MAP_HEADING: &str = "PET Trade Balance Map (Europe + World)";

/// Shown while no country is selected.
pub const SELECTION_PROMPT: &str = "Select one or more countries to analyze";

/// Element the Plotly figure is drawn into.
pub const MAP_ELEMENT_ID: &str = "balance-map";

/// Maximum logs to keep in memory.
pub const MAX_LOG_ENTRIES: usize = 100;
