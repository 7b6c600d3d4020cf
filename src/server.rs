//! Inbound HTTP surface: one endpoint that runs a sync for a tenant user.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::types::SyncResult;
use crate::ToolSync;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub tenant_id: String,
    pub user_id: String,
}

pub fn router(sync: Arc<ToolSync>) -> Router {
    Router::new()
        .route("/api/tools/sync", post(sync_tools))
        .with_state(sync)
}

/// Runs the sync and returns `{toolIds, errors}`. Per-tool failures come
/// back in `errors` with a 200; only a malformed request is rejected.
pub async fn sync_tools(
    State(sync): State<Arc<ToolSync>>,
    Json(request): Json<SyncRequest>,
) -> Result<Json<SyncResult>, (StatusCode, Json<Value>)> {
    let tenant_id = request.tenant_id.trim();
    let user_id = request.user_id.trim();
    if tenant_id.is_empty() || user_id.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "tenantId and userId are required"})),
        ));
    }

    info!(tenant = tenant_id, user = user_id, "sync requested");
    Ok(Json(sync.sync(tenant_id, user_id).await))
}
