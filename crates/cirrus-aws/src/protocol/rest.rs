//! restJson / restXml: per-operation method, path, query and header bindings.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::{json, xml};
use crate::error::AwsError;
use crate::operations::{BodyShape, Payload, RestBinding};
use crate::transport::{HttpRequest, HttpResponse};

pub fn encode(
    binding: &RestBinding,
    endpoint: &str,
    params: &Map<String, Value>,
) -> Result<HttpRequest, AwsError> {
    let mut bound: HashSet<&'static str> = HashSet::new();
    let mut request = HttpRequest::new(binding.method, endpoint);
    request.path = expand_path(binding.path, params, &mut bound)?;

    for (name, value) in binding.static_query {
        request.query.push((name.to_string(), value.to_string()));
    }
    for &(param, name) in binding.query {
        let Some(value) = present(params, param) else {
            continue;
        };
        bound.insert(param);
        match value {
            Value::Array(items) => {
                for item in items {
                    request.query.push((name.to_string(), scalar(item)));
                }
            }
            other => request.query.push((name.to_string(), scalar(other))),
        }
    }

    for &(param, header) in binding.headers {
        if let Some(value) = present(params, param) {
            bound.insert(param);
            request.set_header(header, scalar(value));
        }
    }
    if let Some((param, prefix)) = binding.prefix_headers {
        if let Some(Value::Object(entries)) = present(params, param) {
            bound.insert(param);
            for (key, value) in entries {
                request.set_header(format!("{prefix}{key}"), scalar(value));
            }
        }
    }

    match binding.payload {
        Payload::None => {}
        Payload::Json => {
            let rest: Map<String, Value> = params
                .iter()
                .filter(|(k, _)| !bound.contains(k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            request.body = serde_json::to_vec(&rest).map_err(|e| {
                AwsError::InvalidParameter(format!("params are not serializable: {e}"))
            })?;
            request.set_header("content-type", "application/json");
        }
        Payload::Raw(param) => {
            if let Some(value) = present(params, param) {
                request.body = match value {
                    Value::String(s) => s.clone().into_bytes(),
                    other => serde_json::to_vec(other).map_err(|e| {
                        AwsError::InvalidParameter(format!("{param} is not serializable: {e}"))
                    })?,
                };
            }
        }
    }

    Ok(request)
}

pub fn decode(binding: &RestBinding, response: &HttpResponse) -> Result<Value, AwsError> {
    let mut data = match binding.output {
        BodyShape::Empty => Map::new(),
        BodyShape::Json => match json::decode(&response.body)? {
            Value::Object(map) => map,
            other => Map::from_iter([("Body".to_string(), other)]),
        },
        BodyShape::Xml(shape) => {
            let text = response.body_text();
            if text.trim().is_empty() {
                Map::new()
            } else {
                xml::document_to_json(&xml::parse(&text)?, &shape)
            }
        }
        BodyShape::Text(field) => {
            Map::from_iter([(field.to_string(), Value::String(response.body_text()))])
        }
    };

    for &(header, field) in binding.output_headers {
        if let Some(value) = response.header(header) {
            data.insert(field.to_string(), Value::String(value.to_string()));
        }
    }
    if let Some(field) = binding.status_field {
        data.insert(field.to_string(), Value::from(response.status));
    }
    Ok(Value::Object(data))
}

/// Substitute `{Label}` (one encoded segment) and `{Label+}` (slashes kept).
fn expand_path(
    template: &'static str,
    params: &Map<String, Value>,
    bound: &mut HashSet<&'static str>,
) -> Result<String, AwsError> {
    let mut path = String::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let close = rest[open..]
            .find('}')
            .map(|i| open + i)
            .ok_or_else(|| AwsError::InvalidParameter(format!("bad path template {template}")))?;
        path.push_str(&rest[..open]);

        let label = &rest[open + 1..close];
        let (name, greedy) = match label.strip_suffix('+') {
            Some(name) => (name, true),
            None => (label, false),
        };
        let value = present(params, name)
            .map(scalar)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AwsError::InvalidParameter(format!("Missing required parameter(s): {name}"))
            })?;
        bound.insert(name);

        if greedy {
            let segments: Vec<_> = value.split('/').map(urlencoding::encode).collect();
            path.push_str(&segments.join("/"));
        } else {
            path.push_str(&urlencoding::encode(&value));
        }
        rest = &rest[close + 1..];
    }
    path.push_str(rest);
    Ok(path)
}

fn present<'a>(params: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    params.get(name).filter(|v| !v.is_null())
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::operations::{LambdaCommand, OperationSet, S3Command, Binding};
    use crate::transport::HttpMethod;

    const ENDPOINT: &str = "https://s3.us-east-1.amazonaws.com";

    fn rest_of(spec: &crate::operations::OperationSpec) -> RestBinding {
        match spec.binding {
            Binding::Rest(rest) => rest,
            Binding::Rpc => panic!("{} is not a REST operation", spec.name),
        }
    }

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn greedy_key_keeps_slashes() {
        let binding = rest_of(S3Command::PutObject.spec());
        let request = encode(
            &binding,
            ENDPOINT,
            &params(json!({
                "Bucket": "my-bucket",
                "Key": "reports/2024 q1/summary.csv",
                "Body": "a,b\n1,2",
                "ContentType": "text/csv",
                "Metadata": {"owner": "ops"}
            })),
        )
        .unwrap();

        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.path, "/my-bucket/reports/2024%20q1/summary.csv");
        assert_eq!(request.header("Content-Type"), Some("text/csv"));
        assert_eq!(request.header("x-amz-meta-owner"), Some("ops"));
        assert_eq!(request.body, b"a,b\n1,2");
    }

    #[test]
    fn static_and_bound_query() {
        let binding = rest_of(S3Command::ListObjectsV2.spec());
        let request = encode(
            &binding,
            ENDPOINT,
            &params(json!({"Bucket": "b", "Prefix": "logs/", "MaxKeys": 5})),
        )
        .unwrap();
        assert_eq!(request.path, "/b");
        assert_eq!(
            request.query,
            vec![
                ("list-type".to_string(), "2".to_string()),
                ("prefix".to_string(), "logs/".to_string()),
                ("max-keys".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn missing_label_is_rejected() {
        let binding = rest_of(S3Command::HeadBucket.spec());
        let err = encode(&binding, ENDPOINT, &params(json!({"Bucket": ""}))).unwrap_err();
        assert!(matches!(err, AwsError::InvalidParameter(_)));
    }

    #[test]
    fn json_payload_excludes_bound_params() {
        let binding = rest_of(LambdaCommand::TagResource.spec());
        let request = encode(
            &binding,
            "https://lambda.us-east-1.amazonaws.com",
            &params(json!({
                "Resource": "arn:aws:lambda:us-east-1:123:function:f",
                "Tags": {"team": "data"}
            })),
        )
        .unwrap();
        assert_eq!(
            request.path,
            "/2017-03-31/tags/arn%3Aaws%3Alambda%3Aus-east-1%3A123%3Afunction%3Af"
        );
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body, json!({"Tags": {"team": "data"}}));
    }

    #[test]
    fn array_query_params_repeat() {
        let binding = rest_of(LambdaCommand::UntagResource.spec());
        let request = encode(
            &binding,
            "https://lambda.us-east-1.amazonaws.com",
            &params(json!({"Resource": "f", "TagKeys": ["a", "b"]})),
        )
        .unwrap();
        assert_eq!(request.query_string(), "tagKeys=a&tagKeys=b");
    }

    #[test]
    fn invoke_sends_object_payload_as_json_and_decodes_text() {
        let binding = rest_of(LambdaCommand::Invoke.spec());
        let request = encode(
            &binding,
            "https://lambda.us-east-1.amazonaws.com",
            &params(json!({"FunctionName": "f", "Payload": {"n": 1}, "LogType": "Tail"})),
        )
        .unwrap();
        assert_eq!(request.body, br#"{"n":1}"#);
        assert_eq!(request.header("X-Amz-Log-Type"), Some("Tail"));

        let response = HttpResponse::new(200, r#"{"result":2}"#)
            .with_header("X-Amz-Executed-Version", "$LATEST");
        let data = decode(&binding, &response).unwrap();
        assert_eq!(data["Payload"], r#"{"result":2}"#);
        assert_eq!(data["StatusCode"], 200);
        assert_eq!(data["ExecutedVersion"], "$LATEST");
    }

    #[test]
    fn head_output_comes_from_headers() {
        let binding = rest_of(S3Command::HeadObject.spec());
        let response = HttpResponse::new(200, "")
            .with_header("Content-Length", "42")
            .with_header("ETag", "\"abc\"");
        let data = decode(&binding, &response).unwrap();
        assert_eq!(data, json!({"ContentLength": "42", "ETag": "\"abc\""}));
    }
}
