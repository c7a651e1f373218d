use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::errors::PipelineError;

/// Uniform result of a unit invocation: a status code plus a JSON-encoded body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    pub fn new(status: StatusCode, body: &Value) -> Self {
        Self {
            status_code: status.as_u16(),
            body: body.to_string(),
        }
    }

    pub fn ok(body: &Value) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Error text goes into the body verbatim, as a JSON string.
    pub fn from_error(err: &PipelineError) -> Self {
        Self::new(err.status_code(), &Value::String(err.to_string()))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn body_json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_else(|_| Value::String(self.body.clone()))
    }
}

impl IntoResponse for InvocationResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}
