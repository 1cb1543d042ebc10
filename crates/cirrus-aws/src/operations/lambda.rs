//! Lambda (restJson).

use serde::Deserialize;

use super::{BodyShape, OperationSet, OperationSpec, Payload, RestBinding};
use crate::service::Service;
use crate::transport::HttpMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum LambdaCommand {
    ListFunctions,
    GetFunction,
    GetFunctionConfiguration,
    UpdateFunctionCode,
    ListTags,
    TagResource,
    UntagResource,
    Invoke,
}

impl OperationSet for LambdaCommand {
    const TOOL_NAME: &'static str = "aws_lambda";
    const SERVICE: Service = Service::Lambda;
    const DESCRIPTION: &'static str = "Run an AWS Lambda command: list and describe functions, \
        update function code, manage tags and invoke functions. Invoke returns the response \
        payload as text.";
    const ALL: &'static [Self] = &[
        LambdaCommand::ListFunctions,
        LambdaCommand::GetFunction,
        LambdaCommand::GetFunctionConfiguration,
        LambdaCommand::UpdateFunctionCode,
        LambdaCommand::ListTags,
        LambdaCommand::TagResource,
        LambdaCommand::UntagResource,
        LambdaCommand::Invoke,
    ];

    fn spec(self) -> &'static OperationSpec {
        match self {
            LambdaCommand::ListFunctions => &LIST_FUNCTIONS,
            LambdaCommand::GetFunction => &GET_FUNCTION,
            LambdaCommand::GetFunctionConfiguration => &GET_FUNCTION_CONFIGURATION,
            LambdaCommand::UpdateFunctionCode => &UPDATE_FUNCTION_CODE,
            LambdaCommand::ListTags => &LIST_TAGS,
            LambdaCommand::TagResource => &TAG_RESOURCE,
            LambdaCommand::UntagResource => &UNTAG_RESOURCE,
            LambdaCommand::Invoke => &INVOKE,
        }
    }
}

static LIST_FUNCTIONS: OperationSpec = OperationSpec::rest(
    "ListFunctions",
    &[],
    RestBinding::new(HttpMethod::Get, "/2015-03-31/functions/").query(&[
        ("Marker", "Marker"),
        ("MaxItems", "MaxItems"),
        ("FunctionVersion", "FunctionVersion"),
        ("MasterRegion", "MasterRegion"),
    ]),
);

static GET_FUNCTION: OperationSpec = OperationSpec::rest(
    "GetFunction",
    &["FunctionName"],
    RestBinding::new(HttpMethod::Get, "/2015-03-31/functions/{FunctionName}")
        .query(&[("Qualifier", "Qualifier")]),
);

static GET_FUNCTION_CONFIGURATION: OperationSpec = OperationSpec::rest(
    "GetFunctionConfiguration",
    &["FunctionName"],
    RestBinding::new(
        HttpMethod::Get,
        "/2015-03-31/functions/{FunctionName}/configuration",
    )
    .query(&[("Qualifier", "Qualifier")]),
);

/// `ZipFile` is base64 text; `S3Bucket`/`S3Key` and `ImageUri` pass through.
static UPDATE_FUNCTION_CODE: OperationSpec = OperationSpec::rest(
    "UpdateFunctionCode",
    &["FunctionName"],
    RestBinding::new(HttpMethod::Put, "/2015-03-31/functions/{FunctionName}/code")
        .payload(Payload::Json),
);

static LIST_TAGS: OperationSpec = OperationSpec::rest(
    "ListTags",
    &["Resource"],
    RestBinding::new(HttpMethod::Get, "/2017-03-31/tags/{Resource}"),
);

static TAG_RESOURCE: OperationSpec = OperationSpec::rest(
    "TagResource",
    &["Resource", "Tags"],
    RestBinding::new(HttpMethod::Post, "/2017-03-31/tags/{Resource}").payload(Payload::Json),
);

static UNTAG_RESOURCE: OperationSpec = OperationSpec::rest(
    "UntagResource",
    &["Resource", "TagKeys"],
    RestBinding::new(HttpMethod::Delete, "/2017-03-31/tags/{Resource}")
        .query(&[("TagKeys", "tagKeys")]),
);

static INVOKE: OperationSpec = OperationSpec::rest(
    "Invoke",
    &["FunctionName"],
    RestBinding::new(
        HttpMethod::Post,
        "/2015-03-31/functions/{FunctionName}/invocations",
    )
    .query(&[("Qualifier", "Qualifier")])
    .headers(&[
        ("InvocationType", "X-Amz-Invocation-Type"),
        ("LogType", "X-Amz-Log-Type"),
        ("ClientContext", "X-Amz-Client-Context"),
    ])
    .payload(Payload::Raw("Payload"))
    .output(BodyShape::Text("Payload"))
    .output_headers(&[
        ("x-amz-function-error", "FunctionError"),
        ("x-amz-log-result", "LogResult"),
        ("x-amz-executed-version", "ExecutedVersion"),
    ])
    .status_field("StatusCode"),
);
