//! Step Functions (awsJson 1.0). Parameter names are camelCase.

use crate::service::Service;

rpc_operations! {
    pub enum StepFunctionsCommand {
        tool = "aws_stepfunctions",
        service = Service::StepFunctions,
        description = "Run an AWS Step Functions command: list and describe state machines and \
            executions, start executions and update state machine definitions.",
        DescribeExecution => ["executionArn"],
        DescribeStateMachine => ["stateMachineArn"],
        ListExecutions => [],
        ListStateMachines => [],
        StartExecution => ["stateMachineArn"],
        UpdateStateMachine => ["stateMachineArn"],
    }
}
