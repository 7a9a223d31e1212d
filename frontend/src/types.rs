//! Common types used across the frontend application.
//!
//! # Categories
//!
//! - **Log Types** - Real-time log streaming
//! - **API Types** - Mirrors of the backend's JSON bodies
//! - **Error Types** - Frontend error handling

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Log Types
// =============================================================================

/// Log severity level, as sent by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    /// Get CSS class for styling.
    pub fn css_class(&self) -> &'static str {
        match self {
            LogLevel::Info => "log-info",
            LogLevel::Success => "log-success",
            LogLevel::Warning => "log-warning",
            LogLevel::Error => "log-error",
        }
    }
}

/// A single log entry, received via SSE from `/api/logs`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    #[serde(default)]
    pub indent: u8,
    /// Timestamp string (HH:MM:SS)
    pub timestamp: String,
}

// =============================================================================
// API Types
// =============================================================================

/// Summary of the dataset load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub source: String,
    pub sheet: Option<String>,
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
}

/// Response from `GET /api/countries`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountriesResponse {
    pub countries: Vec<String>,
    pub report: LoadReport,
}

/// Body of `POST /api/map`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRequest {
    pub countries: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MapStatus {
    Ready,
    AwaitingSelection,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Direction {
    ExportSurplus,
    ImportSurplus,
    Balanced,
}

/// One (Country, Partner) row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerAggregate {
    pub country: String,
    pub partner: String,
    pub import_quantity: f64,
    pub import_value: f64,
    pub export_quantity: f64,
    pub export_value: f64,
    pub balance: f64,
    pub direction: Direction,
    pub total_trade: f64,
    pub marker_size: f64,
}

/// Response from `POST /api/map`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapResponse {
    pub request_id: String,
    pub status: MapStatus,
    pub prompt: Option<String>,
    pub title: Option<String>,
    pub aggregates: Vec<PartnerAggregate>,
    pub unplotted: Vec<String>,
    /// Plotly figure, handed to `Plotly.react` untouched.
    pub figure: Option<serde_json::Value>,
}

/// Error body returned by every endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// =============================================================================
// Error Types
// =============================================================================

/// Frontend application errors.
#[derive(Clone, Debug)]
pub enum AppError {
    /// Network/HTTP error.
    Network(String),
    /// The backend answered with an error status.
    Server { status: u16, message: String },
    /// Unexpected response body.
    Parse(String),
    /// Plotly rejected the figure.
    Render(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Server { status, message } => write!(f, "Server error ({}): {}", status, message),
            AppError::Parse(msg) => write!(f, "Invalid response: {}", msg),
            AppError::Render(msg) => write!(f, "Map error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Result type alias for frontend operations.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_response_deserialization() {
        let json = r#"{
            "requestId": "123e4567-e89b-12d3-a456-426614174000",
            "status": "ready",
            "prompt": null,
            "title": "PET Trade Balance – Austria",
            "aggregates": [{
                "country": "Austria",
                "partner": "Germany",
                "importQuantity": 400.0,
                "importValue": 8.0,
                "exportQuantity": 1000.0,
                "exportValue": 20.0,
                "balance": 600.0,
                "direction": "ExportSurplus",
                "totalTrade": 1400.0,
                "markerSize": 0.374
            }],
            "points": [],
            "homeMarkers": [],
            "unplotted": ["China"],
            "figure": {"data": [], "layout": {}}
        }"#;

        let response: MapResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, MapStatus::Ready);
        assert_eq!(response.aggregates[0].direction, Direction::ExportSurplus);
        assert_eq!(response.aggregates[0].balance, 600.0);
        assert_eq!(response.unplotted, vec!["China".to_string()]);
        assert!(response.figure.is_some());
    }

    #[test]
    fn test_awaiting_selection_deserialization() {
        let json = r#"{
            "requestId": "r",
            "status": "awaitingSelection",
            "prompt": "Select one or more countries to analyze",
            "title": null,
            "aggregates": [],
            "points": [],
            "homeMarkers": [],
            "unplotted": [],
            "figure": null
        }"#;

        let response: MapResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, MapStatus::AwaitingSelection);
        assert!(response.figure.is_none());
    }

    #[test]
    fn test_countries_response_ignores_extra_report_fields() {
        let json = r#"{
            "countries": ["Austria", "Slovenia"],
            "report": {
                "source": "Allcountries_export_WITS.xlsx",
                "format": "spreadsheet",
                "sheet": "By-HS6Product",
                "encoding": null,
                "delimiter": null,
                "rowsRead": 10,
                "rowsKept": 8,
                "rowsDropped": 2,
                "loadedAt": "2025-01-01T00:00:00Z"
            }
        }"#;

        let response: CountriesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.countries.len(), 2);
        assert_eq!(response.report.rows_dropped, 2);
    }

    #[test]
    fn test_map_request_wire_format() {
        let request = MapRequest {
            countries: vec!["Austria".into()],
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"countries":["Austria"]}"#
        );
    }

    #[test]
    fn test_log_level_wire_format() {
        let level: LogLevel = serde_json::from_str(r#""warning""#).unwrap();
        assert_eq!(level, LogLevel::Warning);
        assert_eq!(level.css_class(), "log-warning");
    }
}
