//! Local tools that read and change the active session.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use super::{command_input, string_field, Tool, ToolResult};
use crate::context::AwsContext;
use crate::error::ErrorInfo;
use crate::session::{AwsSession, SessionUpdate};

const DEFAULT_ENDPOINT_LABEL: &str = "default (AWS)";

fn session_data(session: &AwsSession) -> Value {
    let mut data = Map::new();
    data.insert("AwsProfile".into(), json!(session.profile));
    if let Some(ref endpoint) = session.endpoint {
        data.insert("AwsEndPoint".into(), json!(endpoint));
    }
    data.insert("AwsRegion".into(), json!(session.region));
    Value::Object(data)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
enum SessionCommand {
    GetSession,
    SetSession,
}

impl SessionCommand {
    fn name(self) -> &'static str {
        match self {
            SessionCommand::GetSession => "GetSession",
            SessionCommand::SetSession => "SetSession",
        }
    }
}

/// `aws_session`: get or merge-update the whole session.
pub struct SessionTool {
    context: Arc<AwsContext>,
}

impl SessionTool {
    pub fn new(context: Arc<AwsContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Tool for SessionTool {
    fn name(&self) -> &str {
        "aws_session"
    }

    fn description(&self) -> &str {
        "Get or set the AWS session (profile, region and endpoint) used by every AWS tool. \
         SetSession only changes the fields given; an empty value resets that field."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "enum": ["GetSession", "SetSession"],
                },
                "params": {
                    "type": "object",
                    "properties": {
                        "AwsProfile": {"type": "string", "description": "Profile name from the shared credentials file."},
                        "AwsRegion": {"type": "string", "description": "Region, e.g. us-east-1."},
                        "AwsEndPoint": {"type": "string", "description": "Custom endpoint URL, e.g. http://localhost:4566. Empty for the AWS default."},
                    },
                },
            },
            "required": ["command"],
        })
    }

    async fn invoke(&self, input: &Value) -> ToolResult {
        let (name, params) = command_input(input);
        let Some(name) = name else {
            return ToolResult::missing(None, &["command"]);
        };
        let Ok(command) = serde_json::from_value::<SessionCommand>(json!(name)) else {
            return ToolResult::unsupported(name);
        };

        let session = match command {
            SessionCommand::GetSession => self.context.session().get(),
            SessionCommand::SetSession => {
                let update: SessionUpdate = match serde_json::from_value(Value::Object(params)) {
                    Ok(update) => update,
                    Err(e) => {
                        return ToolResult::failed(
                            command.name(),
                            ErrorInfo::new("ValidationError", e.to_string()),
                        )
                    }
                };
                let session = self.context.session().set(update);
                info!(?session, "session set by tool");
                session
            }
        };
        ToolResult::executed_locally(command.name(), session_data(&session))
    }
}

/// `aws_get_session`
pub struct GetSessionTool {
    context: Arc<AwsContext>,
}

impl GetSessionTool {
    pub fn new(context: Arc<AwsContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Tool for GetSessionTool {
    fn name(&self) -> &str {
        "aws_get_session"
    }

    fn description(&self) -> &str {
        "Show the active AWS profile, region and endpoint."
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn invoke(&self, _input: &Value) -> ToolResult {
        let session = self.context.session().get();
        ToolResult::ok("Current session information")
            .with_field("awsProfile", session.profile)
            .with_field("awsRegion", session.region)
            .with_field(
                "awsEndpoint",
                session.endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT_LABEL.into()),
            )
    }
}

/// `aws_set_region`
pub struct SetRegionTool {
    context: Arc<AwsContext>,
}

impl SetRegionTool {
    pub fn new(context: Arc<AwsContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Tool for SetRegionTool {
    fn name(&self) -> &str {
        "aws_set_region"
    }

    fn description(&self) -> &str {
        "Set the active AWS region."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "region": {"type": "string", "description": "AWS region, e.g. eu-west-1."},
            },
            "required": ["region"],
        })
    }

    async fn invoke(&self, input: &Value) -> ToolResult {
        let Some(region) = string_field(input, "region") else {
            return ToolResult::fail("Region parameter is required");
        };
        let session = self.context.session().set_region(region);
        info!(region = %session.region, "region set by tool");
        ToolResult::ok("AWS region updated successfully").with_field("awsRegion", session.region)
    }
}

/// `aws_set_endpoint`
pub struct SetEndpointTool {
    context: Arc<AwsContext>,
}

impl SetEndpointTool {
    pub fn new(context: Arc<AwsContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Tool for SetEndpointTool {
    fn name(&self) -> &str {
        "aws_set_endpoint"
    }

    fn description(&self) -> &str {
        "Set a custom AWS endpoint URL (LocalStack, MinIO, ...) used by every AWS tool."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "endpoint": {"type": "string", "description": "Endpoint URL, e.g. http://localhost:4566."},
            },
            "required": ["endpoint"],
        })
    }

    async fn invoke(&self, input: &Value) -> ToolResult {
        let Some(endpoint) = string_field(input, "endpoint") else {
            return ToolResult::fail("Endpoint parameter is required");
        };
        let session = self.context.session().set_endpoint(endpoint);
        info!(endpoint, "endpoint set by tool");
        ToolResult::ok("AWS endpoint updated successfully").with_field(
            "awsEndpoint",
            session.endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT_LABEL.into()),
        )
    }
}

/// `aws_set_profile`
pub struct SetProfileTool {
    context: Arc<AwsContext>,
}

impl SetProfileTool {
    pub fn new(context: Arc<AwsContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Tool for SetProfileTool {
    fn name(&self) -> &str {
        "aws_set_profile"
    }

    fn description(&self) -> &str {
        "Set the active AWS profile from the shared credentials file."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "profile": {"type": "string", "description": "Profile name."},
            },
            "required": ["profile"],
        })
    }

    async fn invoke(&self, input: &Value) -> ToolResult {
        let Some(profile) = string_field(input, "profile") else {
            return ToolResult::fail("Profile parameter is required");
        };
        let session = self.context.session().set_profile(profile);
        info!(profile = %session.profile, "profile set by tool");
        ToolResult::ok("AWS profile updated successfully")
            .with_field("awsProfile", session.profile)
            .with_field(
                "note",
                "Clients already created keep their previous credentials until the cache is refreshed",
            )
    }
}
