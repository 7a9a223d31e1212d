//! Request and response bodies for the dashboard API.
//!
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::loader::LoadReport;
use crate::models::{HomeMarker, PartnerAggregate, PlottablePoint};
use crate::transform::pipeline::MapView;

/// `GET /api/countries`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountriesResponse {
    /// Selectable reporting countries, ascending.
    pub countries: Vec<String>,
    pub report: LoadReport,
}

/// `POST /api/map` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRequest {
    #[serde(default)]
    pub countries: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MapStatus {
    Ready,
    AwaitingSelection,
}

/// `POST /api/map` response.
///
/// While awaiting a selection only `prompt` is set and the collections are
/// empty. A ready map carries the Plotly figure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapResponse {
    pub request_id: String,
    pub status: MapStatus,
    pub prompt: Option<String>,
    pub title: Option<String>,
    pub aggregates: Vec<PartnerAggregate>,
    pub points: Vec<PlottablePoint>,
    pub home_markers: Vec<HomeMarker>,
    pub unplotted: Vec<String>,
    pub figure: Option<Value>,
}

impl From<MapView> for MapResponse {
    fn from(view: MapView) -> Self {
        let request_id = Uuid::new_v4().to_string();

        match view {
            MapView::AwaitingSelection { prompt, .. } => MapResponse {
                request_id,
                status: MapStatus::AwaitingSelection,
                prompt: Some(prompt.to_string()),
                title: None,
                aggregates: Vec::new(),
                points: Vec::new(),
                home_markers: Vec::new(),
                unplotted: Vec::new(),
                figure: None,
            },
            MapView::Ready(map) => {
                let figure = map.figure();
                MapResponse {
                    request_id,
                    status: MapStatus::Ready,
                    prompt: None,
                    title: Some(map.title),
                    aggregates: map.aggregates,
                    points: map.points,
                    home_markers: map.home_markers,
                    unplotted: map.unplotted,
                    figure: Some(figure),
                }
            }
        }
    }
}

/// Error body shared by every endpoint.
pub fn error_response(error: &str) -> Value {
    json!({
        "requestId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Dataset;
    use crate::models::{TradeFlow, TradeRecord};
    use crate::transform::pipeline::build_map;
    use rust_decimal::Decimal;

    fn dataset() -> Dataset {
        Dataset::from_records(vec![TradeRecord {
            country: "Austria".into(),
            partner: "Germany".into(),
            trade_flow: TradeFlow::Export,
            quantity: Decimal::from(1000),
            trade_value: Decimal::from(20),
        }])
    }

    #[test]
    fn test_ready_response_wire_format() {
        let view = build_map(&dataset(), &["Austria"]).unwrap();
        let json = serde_json::to_value(MapResponse::from(view)).unwrap();

        assert_eq!(json["status"], "ready");
        assert_eq!(json["title"], "PET Trade Balance – Austria");
        assert!(json["prompt"].is_null());
        assert_eq!(json["aggregates"][0]["exportQuantity"], 1000.0);
        assert_eq!(json["points"][0]["partner"], "Germany");
        assert_eq!(json["homeMarkers"][0]["country"], "Austria");
        assert_eq!(json["figure"]["data"][0]["type"], "scattergeo");
        assert!(!json["requestId"].as_str().unwrap().is_empty());
    }

    #[test]
    fn test_awaiting_response_wire_format() {
        let view = build_map::<String>(&dataset(), &[]).unwrap();
        let json = serde_json::to_value(MapResponse::from(view)).unwrap();

        assert_eq!(json["status"], "awaitingSelection");
        assert_eq!(json["prompt"], "Select one or more countries to analyze");
        assert!(json["figure"].is_null());
        assert_eq!(json["points"], json!([]));
    }

    #[test]
    fn test_map_request_defaults_to_empty() {
        let request: MapRequest = serde_json::from_str("{}").unwrap();
        assert!(request.countries.is_empty());
    }

    #[test]
    fn test_error_response() {
        let json = error_response("Missing column: Partner");
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "Missing column: Partner");
    }
}
