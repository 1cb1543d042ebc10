//! Service families, their endpoints and wire protocols.

use std::fmt;

/// One cache slot and one endpoint per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    S3,
    DynamoDb,
    CloudWatchLogs,
    Lambda,
    Glue,
    Iam,
    StepFunctions,
    Sts,
}

/// How requests are encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// `POST /` with `X-Amz-Target` and a JSON body.
    AwsJson {
        version: &'static str,
        target_prefix: &'static str,
    },
    /// Form-encoded `Action` + `Version`, XML responses.
    AwsQuery { version: &'static str },
    /// Per-operation method and path, JSON bodies.
    RestJson,
    /// Per-operation method and path, XML bodies.
    RestXml,
}

impl Service {
    pub const ALL: [Service; 8] = [
        Service::S3,
        Service::DynamoDb,
        Service::CloudWatchLogs,
        Service::Lambda,
        Service::Glue,
        Service::Iam,
        Service::StepFunctions,
        Service::Sts,
    ];

    /// Service name in the SigV4 credential scope.
    pub fn signing_name(self) -> &'static str {
        match self {
            Service::S3 => "s3",
            Service::DynamoDb => "dynamodb",
            Service::CloudWatchLogs => "logs",
            Service::Lambda => "lambda",
            Service::Glue => "glue",
            Service::Iam => "iam",
            Service::StepFunctions => "states",
            Service::Sts => "sts",
        }
    }

    pub fn protocol(self) -> Protocol {
        match self {
            Service::S3 => Protocol::RestXml,
            Service::Lambda => Protocol::RestJson,
            Service::DynamoDb => Protocol::AwsJson {
                version: "1.0",
                target_prefix: "DynamoDB_20120810",
            },
            Service::StepFunctions => Protocol::AwsJson {
                version: "1.0",
                target_prefix: "AWSStepFunctions",
            },
            Service::CloudWatchLogs => Protocol::AwsJson {
                version: "1.1",
                target_prefix: "Logs_20140328",
            },
            Service::Glue => Protocol::AwsJson {
                version: "1.1",
                target_prefix: "AWSGlue",
            },
            Service::Iam => Protocol::AwsQuery {
                version: "2010-05-08",
            },
            Service::Sts => Protocol::AwsQuery {
                version: "2011-06-15",
            },
        }
    }

    /// Base URL for requests. A custom endpoint replaces the regional one
    /// for every service.
    pub fn endpoint(self, region: &str, custom: Option<&str>) -> String {
        if let Some(custom) = custom {
            return custom.trim_end_matches('/').to_string();
        }
        let suffix = if region.starts_with("cn-") {
            "amazonaws.com.cn"
        } else {
            "amazonaws.com"
        };
        match self {
            Service::Iam => format!("https://iam.{suffix}"),
            _ => format!("https://{}.{region}.{suffix}", self.signing_name()),
        }
    }

    /// IAM is global and always signs for `us-east-1`.
    pub fn signing_region(self, region: &str) -> String {
        match self {
            Service::Iam => "us-east-1".to_string(),
            _ => region.to_string(),
        }
    }

    /// S3 signs the path as sent; every other service encodes it again.
    pub fn double_encode_path(self) -> bool {
        self != Service::S3
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Service::S3 => "S3",
            Service::DynamoDb => "DynamoDB",
            Service::CloudWatchLogs => "CloudWatchLogs",
            Service::Lambda => "Lambda",
            Service::Glue => "Glue",
            Service::Iam => "IAM",
            Service::StepFunctions => "StepFunctions",
            Service::Sts => "STS",
        };
        f.write_str(name)
    }
}
