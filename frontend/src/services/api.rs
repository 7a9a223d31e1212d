//! HTTP calls to the petmap backend.

use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;

use crate::types::{AppError, AppResult, CountriesResponse, ErrorBody, MapRequest, MapResponse};

/// Selectable reporting countries. Triggers the dataset load on the backend.
pub async fn fetch_countries(backend_url: &str) -> AppResult<CountriesResponse> {
    let url = format!("{}/api/countries", backend_url);
    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| AppError::Network(e.to_string()))?;

    read_json(response).await
}

/// Aggregates and figure for the given countries. An empty list is valid and
/// comes back as `awaitingSelection`.
pub async fn fetch_map(backend_url: &str, countries: Vec<String>) -> AppResult<MapResponse> {
    let url = format!("{}/api/map", backend_url);
    let response = Request::post(&url)
        .json(&MapRequest { countries })
        .map_err(|e| AppError::Network(format!("Failed to build request: {}", e)))?
        .send()
        .await
        .map_err(|e| AppError::Network(e.to_string()))?;

    read_json(response).await
}

async fn read_json<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    if !response.ok() {
        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(AppError::Server {
            status,
            message: error_message(&text),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| AppError::Parse(e.to_string()))
}

/// The `error` field of an error body, or the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.to_string())
}
