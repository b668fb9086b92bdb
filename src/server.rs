//! HTTP surface of the proxy.
//!
//! One POST route per operation, laid out the way an Azure Functions custom
//! handler receives forwarded HTTP triggers (`/api/FindSet`, ...). Success
//! bodies are JSON; failures are plain text.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, MethodRouter};
use axum::{Json, Router};
use tracing::{error, info, warn};

use crate::error::{ErrorClass, ProxyError};
use crate::query::{OperationKind, QueryExecutor};

/// Message returned for every failure that is not the caller's fault.
pub const INTERNAL_ERROR_MESSAGE: &str =
    "The server encountered an error processing your request. Please take a look at the server logs.";

const JSON_CONTENT_TYPE: &str = "text/json; charset=utf-8";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub executor: QueryExecutor,
}

/// Builds the router with operation routes under `route_prefix`.
pub fn router(state: AppState, route_prefix: &str) -> Router {
    let mut router = Router::new().route("/healthz", get(healthz));
    for kind in OperationKind::ALL {
        router = router.route(&route_path(route_prefix, kind), operation(kind));
    }
    router.with_state(state)
}

/// POST handler for one operation.
fn operation(kind: OperationKind) -> MethodRouter<AppState> {
    post(move |State(state): State<AppState>, body: String| async move {
        handle(&state, kind, &body).await
    })
}

/// Joins the prefix and operation name into a route path.
pub fn route_path(prefix: &str, kind: OperationKind) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("/{kind}")
    } else {
        format!("/{prefix}/{kind}")
    }
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn handle(state: &AppState, kind: OperationKind, body: &str) -> Response {
    let output = match state.executor.process(kind, body).await {
        Ok(output) => output,
        Err(e) => return e.into_response(),
    };

    let text = match serde_json::to_string_pretty(&output) {
        Ok(text) => text,
        Err(e) => return ProxyError::internal(format!("Cannot serialize result: {e}")).into_response(),
    };

    info!("{kind} request processed. Length of the response: {}.", text.len());
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)],
        text,
    )
        .into_response()
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, message) = match self.class() {
            ErrorClass::BadRequest => {
                warn!("Invalid input presented. {self}");
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ErrorClass::Internal => {
                error!("{}: {}", self.category(), self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };

        (status, [(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], message).into_response()
    }
}
