//! CloudWatch Logs (awsJson 1.1). Parameter names are camelCase.

use crate::service::Service;

rpc_operations! {
    pub enum LogsCommand {
        tool = "aws_cloudwatch_logs",
        service = Service::CloudWatchLogs,
        description = "Run an Amazon CloudWatch Logs command: describe log groups and streams, read \
            and filter log events, and run Logs Insights queries. Times are epoch milliseconds for \
            events and epoch seconds for queries.",
        DescribeLogGroups => [],
        DescribeLogStreams => ["logGroupName"],
        GetLogEvents => ["logGroupName", "logStreamName"],
        FilterLogEvents => ["logGroupName"],
        StartQuery => ["queryString", "startTime", "endTime"],
        GetQueryResults => ["queryId"],
    }
}
