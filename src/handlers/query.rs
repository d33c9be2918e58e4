use axum::{Json, extract::State};
use serde_json::Value as JsonValue;
use tokio::task;

use crate::db::session::QueryOutput;
use crate::error::GateError;
use crate::middleware::auth::RequireApiKey;
use crate::router::GateState;

/// Run one SQL statement over a fresh read-only session.
///
/// The `sql` field is validated before any database work: an absent body,
/// absent field, non-string field, or whitespace-only statement is a 400 and
/// opens no session. The session lives and dies inside the blocking closure,
/// so it is released on every exit path.
pub async fn query_handler(
    State(state): State<GateState>,
    _auth: RequireApiKey,
    body: Option<Json<JsonValue>>,
) -> Result<Json<QueryOutput>, GateError> {
    let body = body.map(|Json(v)| v).unwrap_or(JsonValue::Null);
    let sql = body
        .get("sql")
        .and_then(JsonValue::as_str)
        .unwrap_or("")
        .trim()
        .to_owned();
    if sql.is_empty() {
        return Err(GateError::BadRequest(
            "request body must contain a non-empty 'sql' string".into(),
        ));
    }

    let sessions = state.sessions.clone();
    let output = task::spawn_blocking(move || {
        let session = sessions.acquire()?;
        session.run(&sql)
    })
    .await
    .map_err(|e| GateError::Internal(format!("query task failed: {e}")))??;

    Ok(Json(output))
}
