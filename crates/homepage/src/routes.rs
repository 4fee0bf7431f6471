use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{StatusCode, Uri},
    Json,
};
use shared::{
    error::ApiError,
    protocol::{CommandRecord, StoreCommandRequest, StoreCommandResponse, StoreStatus},
};
use tracing::{error, info};

use crate::app_state::AppState;

fn internal_error(err: anyhow::Error) -> (StatusCode, Json<ApiError>) {
    error!(error = %err, "storage request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::internal(err.to_string())),
    )
}

fn validation_error(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::validation(message)),
    )
}

pub(crate) async fn healthz(
    State(state): State<Arc<AppState>>,
) -> Result<&'static str, (StatusCode, Json<ApiError>)> {
    state.storage.health_check().await.map_err(internal_error)?;
    Ok("ok")
}

pub(crate) async fn store_command(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StoreCommandRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StoreCommandResponse>), (StatusCode, Json<ApiError>)> {
    let Json(req) = payload.map_err(|rejection| validation_error(rejection.body_text()))?;

    let command = req
        .command
        .filter(|command| !command.trim().is_empty())
        .ok_or_else(|| validation_error("command is required"))?;

    let command_id = state
        .storage
        .store_command(&command)
        .await
        .map_err(internal_error)?;
    info!(command_id = command_id.0, command = %command, "command stored");

    Ok((
        StatusCode::CREATED,
        Json(StoreCommandResponse {
            status: StoreStatus::Success,
            command,
        }),
    ))
}

pub(crate) async fn list_commands(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CommandRecord>>, (StatusCode, Json<ApiError>)> {
    let commands = state
        .storage
        .list_commands()
        .await
        .map_err(internal_error)?;
    Ok(Json(commands.into_iter().map(CommandRecord::from).collect()))
}

pub(crate) async fn not_found(uri: Uri) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::not_found(format!("no page at {}", uri.path()))),
    )
}
