//! Generic multi-command AWS tool.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{command_input, missing_required, Tool, ToolResult};
use crate::context::AwsContext;
use crate::operations::{command_schema, OperationSet};

/// One tool per [`OperationSet`]: decode the command, check required
/// params, make exactly one backend call.
pub struct ServiceTool<C: OperationSet> {
    context: Arc<AwsContext>,
    commands: PhantomData<fn() -> C>,
}

impl<C: OperationSet> ServiceTool<C> {
    pub fn new(context: Arc<AwsContext>) -> Self {
        Self {
            context,
            commands: PhantomData,
        }
    }
}

#[async_trait]
impl<C: OperationSet> Tool for ServiceTool<C> {
    fn name(&self) -> &str {
        C::TOOL_NAME
    }

    fn description(&self) -> &str {
        C::DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        command_schema::<C>()
    }

    async fn invoke(&self, input: &Value) -> ToolResult {
        let (name, params) = command_input(input);
        let Some(name) = name else {
            return ToolResult::missing(None, &["command"]);
        };
        let Ok(command) = serde_json::from_value::<C>(Value::String(name.to_string())) else {
            warn!(tool = C::TOOL_NAME, command = name, "unsupported command");
            return ToolResult::unsupported(name);
        };

        let spec = command.spec();
        let missing = missing_required(&params, spec.required);
        if !missing.is_empty() {
            warn!(tool = C::TOOL_NAME, command = spec.name, ?missing, "missing parameters");
            return ToolResult::missing(Some(spec.name), &missing);
        }

        info!(tool = C::TOOL_NAME, command = spec.name, "executing");
        let params_json = Value::Object(params.clone());
        debug!(tool = C::TOOL_NAME, params = %params_json, "command parameters");

        match self.context.call(C::SERVICE, spec, &params).await {
            Ok(output) => {
                info!(
                    tool = C::TOOL_NAME,
                    command = spec.name,
                    status = output.http_status,
                    "completed"
                );
                ToolResult::executed(spec.name, output)
            }
            Err(e) => {
                warn!(tool = C::TOOL_NAME, command = spec.name, "failed: {e}");
                ToolResult::aws_failed(spec.name, &e)
            }
        }
    }
}
