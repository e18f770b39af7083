//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use roundfeed_shared::round::{RoundId, RoundRecord};

use crate::{
    infrastructure::dto::http::{RoundDetailDto, TableSummaryDto},
    ui::state::AppState,
    usecase::GetRoundError,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Tables this server runs rounds for
pub async fn get_tables(State(state): State<Arc<AppState>>) -> Json<Vec<TableSummaryDto>> {
    Json(state.tables.iter().map(TableSummaryDto::from).collect())
}

/// Round record by id
pub async fn get_round(
    State(state): State<Arc<AppState>>,
    Path(round_id): Path<String>,
) -> Result<Json<RoundDetailDto>, StatusCode> {
    let result = state
        .get_round_usecase
        .execute(&RoundId::new(round_id))
        .await;
    into_response(result)
}

/// Latest round of a table
pub async fn current_round(
    State(state): State<Arc<AppState>>,
    Path(namespace): Path<String>,
) -> Result<Json<RoundDetailDto>, StatusCode> {
    let result = state.get_round_usecase.current(&namespace).await;
    into_response(result)
}

fn into_response(
    result: Result<RoundRecord, GetRoundError>,
) -> Result<Json<RoundDetailDto>, StatusCode> {
    match result {
        // Domain Model から DTO への変換
        Ok(round) => Ok(Json(RoundDetailDto::from(round))),
        Err(GetRoundError::RoundNotFound) => Err(StatusCode::NOT_FOUND),
        Err(GetRoundError::Repository(e)) => {
            tracing::error!("Failed to read round: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
