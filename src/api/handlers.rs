use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::AppState;
use crate::error::StreetError;
use crate::models::*;

// ============================================================
// Error Handling
// ============================================================

/// Map a street error to a response.
///
/// Client mistakes are returned verbatim. Anything else is logged in full and
/// the client gets a generic message.
fn error_response(e: StreetError) -> (StatusCode, String) {
    let status = match &e {
        StreetError::InvalidId(_) | StreetError::Validation(_) => StatusCode::BAD_REQUEST,
        StreetError::NotFound(_) => StatusCode::NOT_FOUND,
        StreetError::Configuration(_)
        | StreetError::Database(_)
        | StreetError::Serialization(_) => {
            tracing::error!("Internal error: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            );
        }
    };

    tracing::warn!("Request rejected: {}", e);
    (status, e.to_string())
}

// ============================================================
// Health
// ============================================================

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let strategy = state.operations.selected_name();
    Json(serde_json::json!({ "status": "ok", "strategy": strategy }))
}

// ============================================================
// Streets
// ============================================================

pub async fn list_streets(
    State(state): State<AppState>,
) -> Result<Json<Vec<Street>>, (StatusCode, String)> {
    state.db.list_streets().map(Json).map_err(error_response)
}

pub async fn create_street(
    State(state): State<AppState>,
    Json(input): Json<CreateStreetInput>,
) -> Result<(StatusCode, Json<Street>), (StatusCode, String)> {
    state
        .db
        .create_street(input)
        .map(|s| (StatusCode::CREATED, Json(s)))
        .map_err(error_response)
}

pub async fn get_street(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Street>, (StatusCode, String)> {
    state
        .db
        .fetch_street(id)
        .map(Json)
        .map_err(error_response)
}

pub async fn delete_street(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    if id <= 0 {
        return Err(error_response(StreetError::InvalidId(id)));
    }

    if state.db.delete_street(id).map_err(error_response)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(error_response(StreetError::NotFound(id)))
    }
}

pub async fn add_point(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<AddPointInput>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .operations
        .add_point(id, input.point(), input.add_to_end)
        .await
        .map_err(error_response)?;

    tracing::info!("Point added to street {}", id);
    Ok(StatusCode::NO_CONTENT)
}
