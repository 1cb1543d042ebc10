//! awsJson 1.0 / 1.1: `POST /` with an `X-Amz-Target` header.

use serde_json::{Map, Value};

use crate::error::AwsError;
use crate::transport::{HttpMethod, HttpRequest, HttpResponse};

pub fn encode(
    endpoint: &str,
    version: &str,
    target_prefix: &str,
    operation: &str,
    params: &Map<String, Value>,
) -> Result<HttpRequest, AwsError> {
    let mut request = HttpRequest::new(HttpMethod::Post, endpoint);
    request.set_header("content-type", format!("application/x-amz-json-{version}"));
    request.set_header("x-amz-target", format!("{target_prefix}.{operation}"));
    request.body = serde_json::to_vec(params)
        .map_err(|e| AwsError::InvalidParameter(format!("params are not serializable: {e}")))?;
    Ok(request)
}

/// Parse a JSON body. An empty body is an empty object.
pub fn decode(body: &[u8]) -> Result<Value, AwsError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(|e| AwsError::Parse(format!("invalid JSON response: {e}")))
}

/// `(name, message)` of a JSON error response. The name comes from the
/// `x-amzn-errortype` header, then `__type`, then `code`.
pub fn error_fields(response: &HttpResponse) -> (Option<String>, Option<String>) {
    let body: Value = serde_json::from_slice(&response.body).unwrap_or(Value::Null);

    let name = response
        .header("x-amzn-errortype")
        .map(|h| h.split(':').next().unwrap_or(h).to_string())
        .or_else(|| {
            body.get("__type")
                .and_then(Value::as_str)
                .map(|t| t.rsplit('#').next().unwrap_or(t).to_string())
        })
        .or_else(|| {
            ["code", "Code"]
                .iter()
                .find_map(|k| body.get(*k).and_then(Value::as_str))
                .map(String::from)
        })
        .filter(|n| !n.is_empty());

    let message = ["message", "Message", "errorMessage"]
        .iter()
        .find_map(|k| body.get(*k).and_then(Value::as_str))
        .map(String::from);

    (name, message)
}
