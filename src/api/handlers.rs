//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::AppState;
use super::types::ErrorResponse;
use crate::pipeline::run_pipeline;
use crate::user_config::UserConfig;

fn error(status: StatusCode, message: impl ToString) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

/// Runs the pipeline for one override document.
///
/// `POST /run_analysis` → 200 + run summary JSON
/// malformed document → 400 + `ErrorResponse`
/// setup failure (inventory, pool, output directory) → 500 + `ErrorResponse`
pub async fn run_analysis(
    State(state): State<Arc<AppState>>,
    body: Result<Json<UserConfig>, JsonRejection>,
) -> Response {
    let Json(user) = match body {
        Ok(doc) => doc,
        Err(rejection) => {
            log::warn!("rejected override document: {rejection}");
            return error(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let joined = tokio::task::spawn_blocking(move || {
        run_pipeline(&state.config, &user, state.store.as_ref())
    })
    .await;

    match joined {
        Ok(Ok(summary)) => (StatusCode::OK, Json(summary)).into_response(),
        Ok(Err(e)) => {
            log::error!("run failed: {e}");
            error(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
        Err(e) => {
            log::error!("run aborted: {e}");
            error(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}
