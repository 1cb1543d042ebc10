//! Name-to-tool lookup, and the [`ToolInvoker`] seam the conversation loop
//! drives.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use cirrus_ai::{ToolDefinition, ToolInvokeError, ToolInvoker};
use serde_json::Value;
use tracing::{debug, warn};

use crate::context::AwsContext;
use crate::operations::{
    DynamoDbCommand, GlueCommand, IamCommand, LambdaCommand, LogsCommand, S3Command,
    StepFunctionsCommand,
};
use crate::tools::{
    FileOperationsTool, FileSandbox, GetSessionTool, ListBucketsTool, ServiceTool, SessionTool,
    SetEndpointTool, SetProfileTool, SetRegionTool, TestConnectionTool, Tool, ToolResult,
};

/// Tools in registration order, addressable by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full catalogue: every service tool, the session tools, the
    /// connectivity helpers and the sandboxed file tool.
    pub fn aws_defaults(context: Arc<AwsContext>, sandbox: FileSandbox) -> Self {
        let mut registry = Self::new();
        registry.register(ServiceTool::<S3Command>::new(context.clone()));
        registry.register(ServiceTool::<DynamoDbCommand>::new(context.clone()));
        registry.register(ServiceTool::<LogsCommand>::new(context.clone()));
        registry.register(ServiceTool::<LambdaCommand>::new(context.clone()));
        registry.register(ServiceTool::<GlueCommand>::new(context.clone()));
        registry.register(ServiceTool::<IamCommand>::new(context.clone()));
        registry.register(ServiceTool::<StepFunctionsCommand>::new(context.clone()));
        registry.register(SessionTool::new(context.clone()));
        registry.register(GetSessionTool::new(context.clone()));
        registry.register(SetRegionTool::new(context.clone()));
        registry.register(SetEndpointTool::new(context.clone()));
        registry.register(SetProfileTool::new(context.clone()));
        registry.register(TestConnectionTool::new(context.clone()));
        registry.register(ListBucketsTool::new(context));
        registry.register(FileOperationsTool::new(sandbox));
        registry
    }

    /// Add a tool. A tool with the same name replaces the earlier one in place.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        let tool: Arc<dyn Tool> = Arc::new(tool);
        let name = tool.name().to_string();
        match self.by_name.get(&name) {
            Some(&index) => {
                warn!(tool = %name, "replacing registered tool");
                self.tools[index] = tool;
            }
            None => {
                self.by_name.insert(name, self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.by_name.get(name).map(|&i| &self.tools[i])
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Run a tool by name. `None` when no such tool is registered.
    pub async fn invoke(&self, name: &str, input: &Value) -> Option<ToolResult> {
        let tool = self.get(name)?;
        debug!(tool = name, "invoking tool");
        Some(tool.invoke(input).await)
    }
}

#[async_trait]
impl ToolInvoker for ToolRegistry {
    fn definitions(&self) -> Vec<ToolDefinition> {
        ToolRegistry::definitions(self)
    }

    async fn invoke(&self, name: &str, input: &Value) -> Result<String, ToolInvokeError> {
        match ToolRegistry::invoke(self, name, input).await {
            Some(result) => Ok(result.to_text()),
            None => Err(ToolInvokeError::NotFound(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    struct Echo {
        name: &'static str,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "echo"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }

        async fn invoke(&self, input: &Value) -> ToolResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ToolResult::ok(format!("{} {}", self.name, input))
        }
    }

    fn echo(name: &'static str, calls: &Arc<AtomicUsize>) -> Echo {
        Echo {
            name,
            calls: calls.clone(),
        }
    }

    #[test]
    fn keeps_registration_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry.register(echo("b", &calls));
        registry.register(echo("a", &calls));
        assert_eq!(registry.names(), ["b", "a"]);
        let defs = registry.definitions();
        assert_eq!(defs[0].name, "b");
        assert_eq!(defs[1].parameters["type"], "object");
    }

    #[test]
    fn same_name_replaces_in_place() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry.register(echo("a", &calls));
        registry.register(echo("b", &calls));
        registry.register(echo("a", &calls));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), ["a", "b"]);
    }

    #[tokio::test]
    async fn invoker_returns_result_text() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry.register(echo("a", &calls));

        let text = ToolInvoker::invoke(&registry, "a", &json!({"x": 1}))
            .await
            .unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["success"], true);
        assert_eq!(parsed["message"], "a {\"x\":1}");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_tool_is_not_found() {
        let registry = ToolRegistry::new();
        let err = ToolInvoker::invoke(&registry, "aws_ec2", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolInvokeError::NotFound(ref n) if n == "aws_ec2"));
        assert!(registry.invoke("aws_ec2", &json!({})).await.is_none());
    }
}
