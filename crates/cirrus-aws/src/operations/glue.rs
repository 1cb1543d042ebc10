//! AWS Glue (awsJson 1.1).

use crate::service::Service;

rpc_operations! {
    pub enum GlueCommand {
        tool = "aws_glue",
        service = Service::Glue,
        description = "Run an AWS Glue command: create, inspect, list and start jobs, read job runs, \
            triggers and resource tags.",
        CreateJob => ["Name", "Role", "Command"],
        GetJob => ["JobName"],
        GetJobRun => ["JobName", "RunId"],
        GetJobRuns => ["JobName"],
        GetTags => ["ResourceArn"],
        GetTrigger => ["Name"],
        GetTriggers => [],
        ListJobs => [],
        ListTriggers => [],
        StartJobRun => ["JobName"],
    }
}
