use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::db::gateway::StoreStatus;
use crate::state::AppState;

const ERROR_PREVIEW_CHARS: usize = 50;

/// GET / — liveness acknowledgement
pub async fn index() -> Json<Value> {
    Json(json!({ "message": "SaaS Starter Backend running" }))
}

/// Flat status map reported by `GET /test`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub backend: String,
    pub database: String,
    pub database_url: String,
    pub database_name: String,
    pub connection_status: String,
    pub collections: Vec<String>,
}

fn presence(is_set: bool) -> String {
    let label = if is_set { "✅ Set" } else { "❌ Not Set" };
    label.to_string()
}

/// GET /test — readiness probe for the backend and its document store
pub async fn diagnostics(State(state): State<AppState>) -> Json<Diagnostics> {
    let (database, connection_status, collections) = match state.gateway.status().await {
        StoreStatus::Disconnected => (
            "⚠️  Available but not initialized".to_string(),
            "Not Connected",
            Vec::new(),
        ),
        StoreStatus::Connected {
            collections: Ok(names),
        } => ("✅ Connected & Working".to_string(), "Connected", names),
        StoreStatus::Connected {
            collections: Err(e),
        } => {
            let preview: String = e.chars().take(ERROR_PREVIEW_CHARS).collect();
            (
                format!("⚠️  Connected but Error: {}", preview),
                "Connected",
                Vec::new(),
            )
        }
    };

    Json(Diagnostics {
        backend: "✅ Running".to_string(),
        database,
        database_url: presence(state.config.env.database_url),
        database_name: presence(state.config.env.database_name),
        connection_status: connection_status.to_string(),
        collections,
    })
}
