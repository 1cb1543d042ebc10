//! Connectivity check and bucket listing.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::{string_field, Tool, ToolResult};
use crate::context::AwsContext;
use crate::error::ErrorInfo;
use crate::operations::{sts, OperationSet, S3Command};
use crate::service::Service;

/// `aws_test_connection`: STS GetCallerIdentity in the given or active region.
pub struct TestConnectionTool {
    context: Arc<AwsContext>,
}

impl TestConnectionTool {
    pub fn new(context: Arc<AwsContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Tool for TestConnectionTool {
    fn name(&self) -> &str {
        "aws_test_connection"
    }

    fn description(&self) -> &str {
        "Tests AWS connectivity using STS GetCallerIdentity. Returns true if the connection is successful."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "region": {
                    "type": "string",
                    "description": "The AWS region to test. If not specified, uses the current session region.",
                    "default": "us-east-1",
                },
            },
        })
    }

    async fn invoke(&self, input: &Value) -> ToolResult {
        let session = self.context.session().get();
        let region = string_field(input, "region")
            .map(String::from)
            .unwrap_or_else(|| session.region.clone());
        let endpoint = session.endpoint.clone().unwrap_or_else(|| "default".into());
        info!(profile = %session.profile, %region, %endpoint, "testing AWS connectivity");

        let result = self
            .context
            .call_in_region(Service::Sts, &region, &sts::GET_CALLER_IDENTITY, &Map::new())
            .await;

        let result = match result {
            Ok(output) => {
                info!("AWS connectivity test successful");
                ToolResult {
                    data: Some(output.data),
                    ..ToolResult::ok("AWS connectivity test successful")
                }
            }
            Err(e) => {
                warn!("AWS connectivity test failed: {e}");
                ToolResult::fail("AWS connectivity test failed").with_error(e.to_string())
            }
        };
        result
            .with_field("profile", session.profile)
            .with_field("region", region)
            .with_field("endpoint", endpoint)
    }
}

/// `aws_list_buckets`: S3 ListBuckets with an optional name filter.
pub struct ListBucketsTool {
    context: Arc<AwsContext>,
}

impl ListBucketsTool {
    pub fn new(context: Arc<AwsContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Tool for ListBucketsTool {
    fn name(&self) -> &str {
        "aws_list_buckets"
    }

    fn description(&self) -> &str {
        "Lists S3 buckets with optional filtering by bucket name."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "bucketName": {
                    "type": "string",
                    "description": "Optional bucket name to filter results. If not specified, lists all buckets.",
                },
            },
        })
    }

    async fn invoke(&self, input: &Value) -> ToolResult {
        let filter = string_field(input, "bucketName").map(str::to_lowercase);

        let output = match self
            .context
            .call(Service::S3, S3Command::ListBuckets.spec(), &Map::new())
            .await
        {
            Ok(output) => output,
            Err(e) => {
                warn!("listing buckets failed: {e}");
                let error = serde_json::to_value(ErrorInfo::from(&e)).unwrap_or(Value::Null);
                return ToolResult::fail("Failed to list buckets").with_error(error);
            }
        };

        let buckets: Vec<Value> = output
            .data
            .get("Buckets")
            .and_then(Value::as_array)
            .map(|all| {
                all.iter()
                    .filter(|bucket| match (&filter, bucket["Name"].as_str()) {
                        (Some(filter), Some(name)) => name.to_lowercase().contains(filter),
                        (Some(_), None) => false,
                        (None, _) => true,
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        info!(count = buckets.len(), "buckets listed");
        let count = buckets.len();
        ToolResult::ok("Buckets list retrieved successfully")
            .with_field("buckets", buckets)
            .with_field("count", count)
    }
}
