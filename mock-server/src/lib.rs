//! In-memory stand-in for the feedsme build-orchestration service.
//!
//! Records change events per environment and exposes diagnostic routes:
//! `/echo` describes the request it received, `/reply/{status}` answers with
//! whatever status and body the query string asks for, and `/blob/{size}`
//! returns a JSON object carrying `size` bytes of filler.

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// A change event accepted for an environment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Change {
    pub id: Uuid,
    pub environment: String,
    pub payload: Value,
}

pub type Db = Arc<RwLock<HashMap<String, Vec<Change>>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/change/{env}", get(list_changes).post(create_change))
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/reply/{status}", any(reply))
        .route("/blob/{size}", get(blob))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

type Rejection = (StatusCode, Json<Value>);

fn unprocessable(message: impl Into<String>) -> Rejection {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "message": message.into() })),
    )
}

async fn create_change(
    State(db): State<Db>,
    Path(env): Path<String>,
    body: Bytes,
) -> Result<Json<Change>, Rejection> {
    let payload = if body.is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_slice::<Value>(&body)
            .map_err(|e| unprocessable(format!("invalid JSON payload: {e}")))?
    };
    if !payload.is_object() {
        return Err(unprocessable("change payload must be a JSON object"));
    }

    let change = Change {
        id: Uuid::new_v4(),
        environment: env.clone(),
        payload,
    };
    tracing::info!(environment = %env, id = %change.id, "change recorded");
    db.write().await.entry(env).or_default().push(change.clone());
    Ok(Json(change))
}

async fn list_changes(State(db): State<Db>, Path(env): Path<String>) -> Json<Vec<Change>> {
    let changes = db.read().await;
    Json(changes.get(&env).cloned().unwrap_or_default())
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "content_type": headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        "body": serde_json::from_slice::<Value>(&body).ok(),
    }))
}

async fn reply(Path(status): Path<u16>, Query(params): Query<HashMap<String, String>>) -> Response {
    let Ok(status) = StatusCode::from_u16(status) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "invalid status" })),
        )
            .into_response();
    };
    if let Some(raw) = params.get("raw") {
        return (status, raw.clone()).into_response();
    }
    match params.get("message") {
        Some(message) => (status, Json(json!({ "message": message }))).into_response(),
        None => (status, Json(json!({}))).into_response(),
    }
}

async fn blob(Path(size): Path<usize>) -> Json<Value> {
    Json(json!({ "data": "x".repeat(size) }))
}
