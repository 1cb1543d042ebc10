//! awsQuery: form-encoded requests, XML responses wrapped in
//! `<{Operation}Response><{Operation}Result>`.

use serde_json::{Map, Value};

use super::xml;
use crate::error::AwsError;
use crate::operations::XmlShape;
use crate::transport::{HttpMethod, HttpRequest};

pub fn encode(
    endpoint: &str,
    version: &str,
    operation: &str,
    params: &Map<String, Value>,
) -> HttpRequest {
    let mut fields = vec![
        ("Action".to_string(), operation.to_string()),
        ("Version".to_string(), version.to_string()),
    ];
    for (key, value) in params {
        flatten(key, value, &mut fields);
    }

    let body = fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let mut request = HttpRequest::new(HttpMethod::Post, endpoint);
    request.set_header(
        "content-type",
        "application/x-www-form-urlencoded; charset=utf-8",
    );
    request.body = body.into_bytes();
    request
}

/// Objects nest with `.`, lists use `.member.N` (1-based).
fn flatten(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push((prefix.to_string(), s.clone())),
        Value::Bool(_) | Value::Number(_) => out.push((prefix.to_string(), value.to_string())),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten(&format!("{prefix}.member.{}", i + 1), item, out);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                flatten(&format!("{prefix}.{key}"), item, out);
            }
        }
    }
}

/// Returns the `<{Operation}Result>` fields and the request id. Elements
/// named in `lists` are always arrays.
pub fn decode(
    operation: &str,
    lists: &'static [&'static str],
    body: &str,
) -> Result<(Value, Option<String>), AwsError> {
    let root = xml::parse(body)?;
    let request_id = root.find_text("RequestId").map(String::from);
    let result_name = format!("{operation}Result");
    let data = root
        .child(&result_name)
        .map(|result| xml::object_to_json(result, &XmlShape::wrapped(lists)))
        .unwrap_or_default();
    Ok((Value::Object(data), request_id))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn encodes_action_version_and_nested_params() {
        let params = json!({
            "RoleName": "app role",
            "MaxItems": 10,
            "Tags": [{"Key": "env", "Value": "dev"}]
        });
        let request = encode(
            "https://iam.amazonaws.com",
            "2010-05-08",
            "ListRoleTags",
            params.as_object().unwrap(),
        );
        let body = String::from_utf8(request.body).unwrap();
        assert!(body.starts_with("Action=ListRoleTags&Version=2010-05-08"));
        assert!(body.contains("RoleName=app%20role"));
        assert!(body.contains("MaxItems=10"));
        assert!(body.contains("Tags.member.1.Key=env"));
        assert!(body.contains("Tags.member.1.Value=dev"));
    }

    #[test]
    fn decodes_result_and_request_id() {
        let body = r#"<GetCallerIdentityResponse xmlns="https://sts.amazonaws.com/doc/2011-06-15/">
  <GetCallerIdentityResult>
    <Arn>arn:aws:iam::123456789012:user/alice</Arn>
    <UserId>AIDAEXAMPLE</UserId>
    <Account>123456789012</Account>
  </GetCallerIdentityResult>
  <ResponseMetadata><RequestId>01234567-89ab</RequestId></ResponseMetadata>
</GetCallerIdentityResponse>"#;
        let (data, request_id) = decode("GetCallerIdentity", &[], body).unwrap();
        assert_eq!(data["Account"], "123456789012");
        assert_eq!(data["Arn"], "arn:aws:iam::123456789012:user/alice");
        assert_eq!(request_id.as_deref(), Some("01234567-89ab"));
    }

    #[test]
    fn missing_result_element_is_empty_object() {
        let body = "<DeleteRoleResponse><ResponseMetadata><RequestId>r</RequestId></ResponseMetadata></DeleteRoleResponse>";
        let (data, _) = decode("DeleteRole", &[], body).unwrap();
        assert_eq!(data, json!({}));
    }

    #[test]
    fn declared_lists_are_arrays_when_empty_or_single() {
        let empty = "<ListRolesResponse><ListRolesResult><IsTruncated>false</IsTruncated>\
                     <Roles/></ListRolesResult>\
                     <ResponseMetadata><RequestId>r-1</RequestId></ResponseMetadata></ListRolesResponse>";
        let (data, _) = decode("ListRoles", &["Roles"], empty).unwrap();
        assert_eq!(data["Roles"], json!([]));
        assert_eq!(data["IsTruncated"], "false");

        let single = "<ListRolesResponse><ListRolesResult><Roles><member>\
                      <RoleName>app</RoleName><Path>/</Path></member></Roles>\
                      </ListRolesResult></ListRolesResponse>";
        let (data, _) = decode("ListRoles", &["Roles"], single).unwrap();
        assert_eq!(data["Roles"], json!([{"RoleName": "app", "Path": "/"}]));
    }
}
