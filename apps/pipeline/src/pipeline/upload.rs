//! Upload validator: checks an upload request and simulates accepting it.
//! Nothing is stored; the decoded file content is discarded.

use axum::http::{header, HeaderName, Method, StatusCode};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::models::response::InvocationResponse;

/// Sent with every validator response, preflight or not.
pub const CORS_HEADERS: [(HeaderName, &str); 3] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "OPTIONS,POST"),
    (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
];

const REQUIRED_FIELDS: [&str; 3] = ["email", "filename", "fileContent"];

/// Strict standard-alphabet decoding. Padding is added by the caller, so it is
/// required here; non-zero trailing bits are tolerated.
const STRICT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical)
        .with_decode_allow_trailing_bits(true),
);

pub fn validate_upload(method: &Method, body: &str) -> InvocationResponse {
    if *method == Method::OPTIONS {
        return InvocationResponse::ok(&json!({"message": "CORS preflight"}));
    }

    let request = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(other) => return processing_error(&format!("expected a JSON object, got {other}")),
        Err(e) => return processing_error(&e.to_string()),
    };

    let missing: Vec<&str> = REQUIRED_FIELDS
        .into_iter()
        .filter(|field| !request.get(*field).is_some_and(is_truthy))
        .collect();
    if !missing.is_empty() {
        warn!("Upload rejected, missing fields: {}", missing.join(", "));
        return InvocationResponse::new(
            StatusCode::BAD_REQUEST,
            &json!({"error": "Missing required fields"}),
        );
    }

    let decodes = request
        .get("fileContent")
        .and_then(Value::as_str)
        .is_some_and(|content| STRICT_BASE64.decode(pad_base64(content)).is_ok());
    if !decodes {
        warn!("Upload rejected, fileContent is not valid base64");
        return InvocationResponse::new(
            StatusCode::BAD_REQUEST,
            &json!({"error": "Invalid file content"}),
        );
    }

    info!("Upload validated (simulated)");
    InvocationResponse::ok(&json!({
        "message": "Validation successful (simulated upload)",
        "email": request["email"],
        "filename": request["filename"],
    }))
}

/// Appends `=` until the length is a multiple of four.
pub fn pad_base64(content: &str) -> String {
    let remainder = content.len() % 4;
    if remainder == 0 {
        content.to_string()
    } else {
        format!("{content}{}", "=".repeat(4 - remainder))
    }
}

/// JSON truthiness: null, false, 0, "" and empty collections count as missing.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn processing_error(details: &str) -> InvocationResponse {
    warn!("Upload processing error: {details}");
    InvocationResponse::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        &json!({"error": "Processing error", "details": details}),
    )
}
