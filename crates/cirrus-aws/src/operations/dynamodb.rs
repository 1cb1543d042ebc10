//! DynamoDB (awsJson 1.0). Items use the typed attribute-value format.

use crate::service::Service;

rpc_operations! {
    pub enum DynamoDbCommand {
        tool = "aws_dynamodb",
        service = Service::DynamoDb,
        description = "Run an Amazon DynamoDB command: list, describe, create, update and delete tables, \
            read and write items, query and scan, and manage TTL and tags. Items and keys use the \
            DynamoDB attribute-value format, e.g. {\"id\": {\"S\": \"42\"}}.",
        ListTables => [],
        DescribeTable => ["TableName"],
        CreateTable => ["TableName", "KeySchema", "AttributeDefinitions"],
        DeleteTable => ["TableName"],
        Query => ["TableName"],
        Scan => ["TableName"],
        PutItem => ["TableName", "Item"],
        UpdateItem => ["TableName", "Key"],
        DeleteItem => ["TableName", "Key"],
        GetItem => ["TableName", "Key"],
        UpdateTable => ["TableName"],
        UpdateTimeToLive => ["TableName", "TimeToLiveSpecification"],
        ListTagsOfResource => ["ResourceArn"],
    }
}
