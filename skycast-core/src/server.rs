//! HTTP surface of the proxy: a single `GET /api/weather` route.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::proxy::{ProxyError, ProxyPayload, ProxyQuery, ProxyService};

pub const WEATHER_ROUTE: &str = "/api/weather";

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self, "Error in weather route");
        } else {
            tracing::debug!(error = %self, "Rejected weather request");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router(service: Arc<ProxyService>) -> Router {
    Router::new().route(WEATHER_ROUTE, get(weather)).with_state(service)
}

/// Serve the proxy on an already bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, service: Arc<ProxyService>) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, route = WEATHER_ROUTE, "Weather proxy listening");

    axum::serve(listener, router(service)).await?;
    Ok(())
}

async fn weather(
    State(service): State<Arc<ProxyService>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<ProxyPayload>, ProxyError> {
    let Query(pairs) =
        query.map_err(|rejection| ProxyError::MalformedQuery(rejection.body_text()))?;
    service.handle(&ProxyQuery::from_pairs(pairs)).await.map(Json)
}
