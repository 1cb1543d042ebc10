//! Wire protocols: turn an [`OperationSpec`] plus params into an HTTP request,
//! and an HTTP response into output data or a [`ServiceError`].

pub mod json;
pub mod query;
pub mod rest;
pub mod xml;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AwsError, ErrorCode, ServiceError};
use crate::operations::{Binding, OperationSpec};
use crate::service::{Protocol, Service};
use crate::transport::{HttpRequest, HttpResponse};

/// Decoded result of one successful call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiOutput {
    pub data: Value,
    pub request_id: Option<String>,
    pub http_status: u16,
}

pub fn encode_request(
    service: Service,
    endpoint: &str,
    spec: &OperationSpec,
    params: &Map<String, Value>,
) -> Result<HttpRequest, AwsError> {
    match (service.protocol(), &spec.binding) {
        (Protocol::AwsJson { version, target_prefix }, Binding::Rpc) => {
            json::encode(endpoint, version, target_prefix, spec.name, params)
        }
        (Protocol::AwsQuery { version }, Binding::Rpc) => {
            Ok(query::encode(endpoint, version, spec.name, params))
        }
        (Protocol::RestJson | Protocol::RestXml, Binding::Rest(binding)) => {
            rest::encode(binding, endpoint, params)
        }
        (protocol, _) => Err(AwsError::InvalidParameter(format!(
            "{service} operation {} has no {protocol:?} binding",
            spec.name
        ))),
    }
}

/// Decode a response. Non-2xx statuses become [`AwsError::Service`].
pub fn decode_response(
    service: Service,
    spec: &OperationSpec,
    response: &HttpResponse,
) -> Result<ApiOutput, AwsError> {
    if !response.is_success() {
        return Err(AwsError::Service(service_error(service.protocol(), response)));
    }

    let mut request_id = header_request_id(response);
    let data = match (service.protocol(), &spec.binding) {
        (Protocol::AwsQuery { .. }, _) => {
            let (data, body_request_id) = query::decode(spec.name, spec.lists, &response.body_text())?;
            request_id = request_id.or(body_request_id);
            data
        }
        (_, Binding::Rest(binding)) => rest::decode(binding, response)?,
        _ => json::decode(&response.body)?,
    };

    Ok(ApiOutput {
        data,
        request_id,
        http_status: response.status,
    })
}

/// JSON protocols report the HTTP status as `code`; XML protocols carry
/// their own `<Code>`.
pub fn service_error(protocol: Protocol, response: &HttpResponse) -> ServiceError {
    let (name, message, code) = match protocol {
        Protocol::AwsJson { .. } | Protocol::RestJson => {
            let (name, message) = json::error_fields(response);
            (name, message, None)
        }
        Protocol::AwsQuery { .. } | Protocol::RestXml => {
            match xml::parse(&response.body_text()) {
                Ok(root) => {
                    let code = root.find_text("Code").map(String::from);
                    (code.clone(), root.find_text("Message").map(String::from), code)
                }
                Err(_) => (None, None, None),
            }
        }
    };

    let reason = reqwest::StatusCode::from_u16(response.status)
        .ok()
        .and_then(|s| s.canonical_reason());

    ServiceError {
        name: name.unwrap_or_else(|| status_error_name(response.status).to_string()),
        message: message
            .or_else(|| reason.map(String::from))
            .unwrap_or_else(|| "Unknown error".to_string()),
        code: code
            .map(ErrorCode::Text)
            .unwrap_or(ErrorCode::Status(response.status)),
        request_id: header_request_id(response).or_else(|| {
            xml::parse(&response.body_text())
                .ok()
                .and_then(|root| root.find_text("RequestId").map(String::from))
        }),
    }
}

/// Name for errors without a body, e.g. a failed HEAD.
fn status_error_name(status: u16) -> &'static str {
    match status {
        301 => "PermanentRedirect",
        400 => "BadRequest",
        403 => "Forbidden",
        404 => "NotFound",
        409 => "Conflict",
        429 => "TooManyRequests",
        500..=599 => "InternalError",
        _ => "UnknownError",
    }
}

fn header_request_id(response: &HttpResponse) -> Option<String> {
    ["x-amzn-requestid", "x-amz-request-id", "x-amzn-request-id"]
        .iter()
        .find_map(|h| response.header(h))
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::operations::{sts, DynamoDbCommand, IamCommand, OperationSet, S3Command};

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn rpc_json_round() {
        let spec = DynamoDbCommand::ListTables.spec();
        let request = encode_request(
            Service::DynamoDb,
            "http://localhost:4566",
            spec,
            &params(json!({"Limit": 5})),
        )
        .unwrap();
        assert_eq!(request.header("x-amz-target"), Some("DynamoDB_20120810.ListTables"));

        let response = HttpResponse::new(200, r#"{"TableNames":["a","b"]}"#)
            .with_header("x-amzn-RequestId", "req-1");
        let output = decode_response(Service::DynamoDb, spec, &response).unwrap();
        assert_eq!(output.data["TableNames"], json!(["a", "b"]));
        assert_eq!(output.request_id.as_deref(), Some("req-1"));
        assert_eq!(output.http_status, 200);
    }

    #[test]
    fn query_request_id_comes_from_body() {
        let body = "<GetCallerIdentityResponse><GetCallerIdentityResult><Account>1</Account>\
                    </GetCallerIdentityResult><ResponseMetadata><RequestId>abc</RequestId>\
                    </ResponseMetadata></GetCallerIdentityResponse>";
        let output = decode_response(
            Service::Sts,
            &sts::GET_CALLER_IDENTITY,
            &HttpResponse::new(200, body),
        )
        .unwrap();
        assert_eq!(output.data, json!({"Account": "1"}));
        assert_eq!(output.request_id.as_deref(), Some("abc"));
    }

    #[test]
    fn json_error_uses_status_code() {
        let response = HttpResponse::new(
            400,
            r#"{"__type":"com.amazonaws.dynamodb.v20120810#ResourceNotFoundException","message":"Requested resource not found"}"#,
        );
        let err = decode_response(Service::DynamoDb, DynamoDbCommand::DescribeTable.spec(), &response)
            .unwrap_err();
        let AwsError::Service(err) = err else {
            panic!("expected service error");
        };
        assert_eq!(err.name, "ResourceNotFoundException");
        assert_eq!(err.message, "Requested resource not found");
        assert_eq!(err.code, ErrorCode::Status(400));
    }

    #[test]
    fn xml_error_uses_service_code() {
        let body = "<ErrorResponse><Error><Type>Sender</Type><Code>NoSuchEntity</Code>\
                    <Message>The role with name x cannot be found.</Message></Error>\
                    <RequestId>r-9</RequestId></ErrorResponse>";
        let err = service_error(
            Service::Iam.protocol(),
            &HttpResponse::new(404, body),
        );
        assert_eq!(err.name, "NoSuchEntity");
        assert_eq!(err.message, "The role with name x cannot be found.");
        assert_eq!(err.code, ErrorCode::Text("NoSuchEntity".into()));
        assert_eq!(err.request_id.as_deref(), Some("r-9"));
    }

    #[test]
    fn bodyless_error_falls_back_to_status() {
        let err = decode_response(
            Service::S3,
            S3Command::HeadBucket.spec(),
            &HttpResponse::new(404, ""),
        )
        .unwrap_err();
        let AwsError::Service(err) = err else {
            panic!("expected service error");
        };
        assert_eq!(err.name, "NotFound");
        assert_eq!(err.message, "Not Found");
        assert_eq!(err.code, ErrorCode::Status(404));
    }

    #[test]
    fn mismatched_binding_is_rejected() {
        let err = encode_request(
            Service::S3,
            "http://localhost",
            IamCommand::ListRoles.spec(),
            &Map::new(),
        )
        .unwrap_err();
        assert!(matches!(err, AwsError::InvalidParameter(_)));
    }
}
