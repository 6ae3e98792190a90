//! API models for the flex-starter runtime adapter.
//!
//! Handler responses are not modelled here: a [`Completed`] renders itself
//! as the handler's status and JSON body, plus the `X-Flex-Continue` header
//! telling the platform whether the hook chain goes on.

use axum::{
    Json,
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::handlers::{Completed, RegistrySummary};
use crate::observability::MetricsSnapshot;

pub const CONTINUE_HEADER: &str = "x-flex-continue";

impl IntoResponse for Completed {
    fn into_response(self) -> Response {
        let (status, body, continue_chain) = self.into_parts();
        let flag = if continue_chain { "true" } else { "false" };

        let mut response = match body {
            Some(body) => (status, Json(body)).into_response(),
            None => status.into_response(),
        };
        response.headers_mut().insert(
            HeaderName::from_static(CONTINUE_HEADER),
            HeaderValue::from_static(flag),
        );
        response
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub handlers: RegistrySummary,
    pub metrics: MetricsSnapshot,
}
