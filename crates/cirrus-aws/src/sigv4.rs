//! AWS Signature Version 4 request signing.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::credentials::Credentials;
use crate::error::AwsError;
use crate::transport::HttpRequest;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

pub struct SigningParams<'a> {
    pub credentials: &'a Credentials,
    pub region: &'a str,
    /// Service name in the credential scope (`s3`, `dynamodb`, `states`, ...).
    pub service: &'a str,
    pub time: DateTime<Utc>,
    /// Re-encode the already-encoded path (every service except S3).
    pub double_encode_path: bool,
    /// Send `x-amz-content-sha256` (required by S3).
    pub payload_hash_header: bool,
}

/// Add `host`, `x-amz-date`, optional token headers and `Authorization`.
pub fn sign(request: &mut HttpRequest, params: &SigningParams<'_>) -> Result<(), AwsError> {
    let endpoint = reqwest::Url::parse(&request.endpoint)
        .map_err(|e| AwsError::Signing(format!("invalid endpoint '{}': {e}", request.endpoint)))?;
    let host = endpoint
        .host_str()
        .ok_or_else(|| AwsError::Signing(format!("endpoint '{}' has no host", request.endpoint)))?;
    let host = match endpoint.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    let amz_date = params.time.format("%Y%m%dT%H%M%SZ").to_string();
    let date = params.time.format("%Y%m%d").to_string();
    let payload_hash = sha256_hex(&request.body);

    request.set_header("host", host);
    request.set_header("x-amz-date", amz_date.clone());
    if params.payload_hash_header {
        request.set_header("x-amz-content-sha256", payload_hash.clone());
    }
    if let Some(ref token) = params.credentials.session_token {
        request.set_header("x-amz-security-token", token.clone());
    }

    let full_path = format!("{}{}", endpoint.path().trim_end_matches('/'), request.path);
    let canonical_uri = if params.double_encode_path {
        full_path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    } else {
        full_path
    };

    let (canonical_headers, signed_headers) = canonical_headers(request);
    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        request.method.as_str(),
        canonical_uri,
        canonical_query(request),
        canonical_headers,
        signed_headers,
        payload_hash
    );

    let scope = format!("{date}/{}/{}/aws4_request", params.region, params.service);
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        sha256_hex(canonical_request.as_bytes())
    );

    let key = derive_signing_key(
        &params.credentials.secret_access_key,
        &date,
        params.region,
        params.service,
    )?;
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);

    request.set_header(
        "authorization",
        format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            params.credentials.access_key_id
        ),
    );
    Ok(())
}

/// `kSigning = HMAC(HMAC(HMAC(HMAC("AWS4" + secret, date), region), service), "aws4_request")`
pub fn derive_signing_key(
    secret: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, AwsError> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

fn canonical_query(request: &HttpRequest) -> String {
    let mut pairs: Vec<(String, String)> = request
        .query
        .iter()
        .map(|(k, v)| {
            (
                urlencoding::encode(k).into_owned(),
                urlencoding::encode(v).into_owned(),
            )
        })
        .collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Returns `(canonical header block, signed header list)`.
fn canonical_headers(request: &HttpRequest) -> (String, String) {
    let mut headers: Vec<(String, String)> = request
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_ascii_lowercase(),
                value.split_whitespace().collect::<Vec<_>>().join(" "),
            )
        })
        .collect();
    headers.sort();

    let block = headers
        .iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect::<String>();
    let signed = headers
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");
    (block, signed)
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, AwsError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AwsError::Signing(format!("invalid HMAC key: {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::transport::HttpMethod;

    const SECRET: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

    fn example_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap()
    }

    #[test]
    fn signing_key_matches_published_example() {
        let key = derive_signing_key(SECRET, "20150830", "us-east-1", "iam").unwrap();
        assert_eq!(
            hex::encode(key),
            "c4afb1cc5771d871763a393e44b703571b55cc28424d1a5e86da6ed3c154a4b9"
        );
    }

    #[test]
    fn iam_list_users_example() {
        let credentials = Credentials::new("AKIDEXAMPLE", SECRET);
        let mut request = HttpRequest::new(HttpMethod::Get, "https://iam.amazonaws.com");
        request.query = vec![
            ("Action".into(), "ListUsers".into()),
            ("Version".into(), "2010-05-08".into()),
        ];
        request.set_header(
            "Content-Type",
            "application/x-www-form-urlencoded; charset=utf-8",
        );

        sign(
            &mut request,
            &SigningParams {
                credentials: &credentials,
                region: "us-east-1",
                service: "iam",
                time: example_time(),
                double_encode_path: true,
                payload_hash_header: false,
            },
        )
        .unwrap();

        assert_eq!(request.header("x-amz-date"), Some("20150830T123600Z"));
        assert_eq!(request.header("host"), Some("iam.amazonaws.com"));
        assert_eq!(
            request.header("authorization"),
            Some(
                "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/iam/aws4_request, \
                 SignedHeaders=content-type;host;x-amz-date, \
                 Signature=5d672d79c15b13162d9279b0855cfba6789a8edb4c82c400e06b5924a6f2b5d7"
            )
        );
    }

    #[test]
    fn session_token_and_payload_hash_are_signed() {
        let credentials = Credentials::new("AKID", SECRET).with_session_token("token");
        let mut request = HttpRequest::new(HttpMethod::Put, "http://localhost:4566");
        request.path = "/bucket/key".into();
        request.body = b"hello".to_vec();

        sign(
            &mut request,
            &SigningParams {
                credentials: &credentials,
                region: "us-east-1",
                service: "s3",
                time: example_time(),
                double_encode_path: false,
                payload_hash_header: true,
            },
        )
        .unwrap();

        assert_eq!(request.header("host"), Some("localhost:4566"));
        assert_eq!(request.header("x-amz-security-token"), Some("token"));
        assert_eq!(
            request.header("x-amz-content-sha256"),
            Some("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")
        );
        let auth = request.header("authorization").unwrap();
        assert!(auth.contains(
            "SignedHeaders=host;x-amz-content-sha256;x-amz-date;x-amz-security-token"
        ));
    }
}
