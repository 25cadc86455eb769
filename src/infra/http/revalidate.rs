//! The revalidation webhook.
//!
//! Answers exactly one of: 401 before any work, 500 when the body is not
//! JSON, and 200 after best-effort invalidation regardless of individual
//! path outcomes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::application::error::ErrorReport;

use super::public::HttpState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RevalidateQuery {
    secret: Option<String>,
}

pub async fn handle(
    State(state): State<HttpState>,
    Query(query): Query<RevalidateQuery>,
    body: Bytes,
) -> Response {
    if !state.revalidate.authorize(query.secret.as_deref()) {
        let mut response = (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        ErrorReport::from_message(
            "infra::http::revalidate",
            StatusCode::UNAUTHORIZED,
            "revalidation secret missing or mismatched",
        )
        .attach(&mut response);
        return response;
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(error) => {
            warn!(
                target = "vetrina::http::revalidate",
                error = %error,
                "notification body is not valid JSON"
            );
            let mut response = (StatusCode::INTERNAL_SERVER_ERROR, "Error").into_response();
            ErrorReport::from_error(
                "infra::http::revalidate",
                StatusCode::INTERNAL_SERVER_ERROR,
                &error,
            )
            .attach(&mut response);
            return response;
        }
    };

    let _outcome = state.revalidate.process(&payload).await;
    (StatusCode::OK, "Revalidated").into_response()
}
