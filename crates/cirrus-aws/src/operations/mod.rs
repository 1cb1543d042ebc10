//! Static request descriptors for every supported command.
//!
//! Each service exposes a command enum implementing [`OperationSet`]. The
//! enum is decoded from the tool input with serde and mapped by an
//! exhaustive `match` to an [`OperationSpec`], which one generic executor
//! turns into a signed request.

/// Declares an RPC command enum and its [`OperationSet`] impl from
/// `Variant => [required params]` lines. An optional `lists [..]` suffix names
/// the XML elements that always decode to arrays.
macro_rules! rpc_operations {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            tool = $tool:literal,
            service = $service:expr,
            description = $description:literal,
            $(
                $variant:ident => [$($required:literal),* $(,)?]
                $(lists [$($list:literal),* $(,)?])?
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
        pub enum $name {
            $( $variant ),+
        }

        impl $crate::operations::OperationSet for $name {
            const TOOL_NAME: &'static str = $tool;
            const SERVICE: $crate::service::Service = $service;
            const DESCRIPTION: &'static str = $description;
            const ALL: &'static [Self] = &[$( $name::$variant ),+];

            fn spec(self) -> &'static $crate::operations::OperationSpec {
                match self {
                    $(
                        $name::$variant => {
                            static SPEC: $crate::operations::OperationSpec =
                                $crate::operations::OperationSpec::rpc(
                                    stringify!($variant),
                                    &[$($required),*],
                                )
                                .lists(&[$($($list),*)?]);
                            &SPEC
                        }
                    )+
                }
            }
        }
    };
}

pub mod dynamodb;
pub mod glue;
pub mod iam;
pub mod lambda;
pub mod logs;
pub mod s3;
pub mod stepfunctions;
pub mod sts;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::service::Service;
use crate::transport::HttpMethod;

pub use dynamodb::DynamoDbCommand;
pub use glue::GlueCommand;
pub use iam::IamCommand;
pub use lambda::LambdaCommand;
pub use logs::LogsCommand;
pub use s3::S3Command;
pub use stepfunctions::StepFunctionsCommand;

/// One backend operation.
#[derive(Debug, Clone, Copy)]
pub struct OperationSpec {
    /// Wire name, also the command name the model uses.
    pub name: &'static str,
    /// Parameters that must be present and non-empty.
    pub required: &'static [&'static str],
    pub binding: Binding,
    /// awsQuery list elements; empty or single-member lists still decode to arrays.
    pub lists: &'static [&'static str],
}

impl OperationSpec {
    /// An RPC-style operation (awsJson or awsQuery): params go straight to the body.
    pub const fn rpc(name: &'static str, required: &'static [&'static str]) -> Self {
        Self {
            name,
            required,
            binding: Binding::Rpc,
            lists: &[],
        }
    }

    pub const fn lists(mut self, lists: &'static [&'static str]) -> Self {
        self.lists = lists;
        self
    }

    pub const fn rest(
        name: &'static str,
        required: &'static [&'static str],
        binding: RestBinding,
    ) -> Self {
        Self {
            name,
            required,
            binding: Binding::Rest(binding),
            lists: &[],
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Binding {
    Rpc,
    Rest(RestBinding),
}

/// HTTP bindings of a REST operation. Pairs are `(param, wire name)`.
#[derive(Debug, Clone, Copy)]
pub struct RestBinding {
    pub method: HttpMethod,
    /// Path template with `{Label}` and greedy `{Label+}` segments.
    pub path: &'static str,
    /// Query pairs sent on every call (`list-type=2`, `versions`).
    pub static_query: &'static [(&'static str, &'static str)],
    pub query: &'static [(&'static str, &'static str)],
    pub headers: &'static [(&'static str, &'static str)],
    /// A map param sent as prefixed headers (`Metadata` as `x-amz-meta-*`).
    pub prefix_headers: Option<(&'static str, &'static str)>,
    pub payload: Payload,
    pub output: BodyShape,
    /// `(header, field)` pairs copied into the output.
    pub output_headers: &'static [(&'static str, &'static str)],
    /// Output field that receives the HTTP status.
    pub status_field: Option<&'static str>,
}

impl RestBinding {
    pub const fn new(method: HttpMethod, path: &'static str) -> Self {
        Self {
            method,
            path,
            static_query: &[],
            query: &[],
            headers: &[],
            prefix_headers: None,
            payload: Payload::None,
            output: BodyShape::Json,
            output_headers: &[],
            status_field: None,
        }
    }

    pub const fn static_query(self, static_query: &'static [(&'static str, &'static str)]) -> Self {
        Self {
            static_query,
            ..self
        }
    }

    pub const fn query(self, query: &'static [(&'static str, &'static str)]) -> Self {
        Self { query, ..self }
    }

    pub const fn headers(self, headers: &'static [(&'static str, &'static str)]) -> Self {
        Self { headers, ..self }
    }

    pub const fn prefix_headers(self, param: &'static str, prefix: &'static str) -> Self {
        Self {
            prefix_headers: Some((param, prefix)),
            ..self
        }
    }

    pub const fn payload(self, payload: Payload) -> Self {
        Self { payload, ..self }
    }

    pub const fn output(self, output: BodyShape) -> Self {
        Self { output, ..self }
    }

    pub const fn output_headers(
        self,
        output_headers: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            output_headers,
            ..self
        }
    }

    pub const fn status_field(self, field: &'static str) -> Self {
        Self {
            status_field: Some(field),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    None,
    /// Params not bound elsewhere, as a JSON object.
    Json,
    /// One param as the raw body. Strings are sent as-is, anything else as JSON.
    Raw(&'static str),
}

/// How a REST response body maps to output fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyShape {
    Empty,
    Json,
    Xml(XmlShape),
    /// The whole body as UTF-8 text under one field.
    Text(&'static str),
}

/// List hints for XML to JSON conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XmlShape {
    /// Keep the document element as the single top-level key.
    pub keep_root: bool,
    /// Elements whose children form a list (`<Buckets><Bucket/>...</Buckets>`).
    pub wrapped: &'static [&'static str],
    /// Elements that repeat in place and always form a list (`<Contents/>`).
    pub flattened: &'static [&'static str],
}

impl XmlShape {
    pub const PLAIN: XmlShape = XmlShape {
        keep_root: false,
        wrapped: &[],
        flattened: &[],
    };

    pub const fn wrapped(wrapped: &'static [&'static str]) -> Self {
        Self {
            wrapped,
            ..Self::PLAIN
        }
    }

    pub const fn flattened(flattened: &'static [&'static str]) -> Self {
        Self {
            flattened,
            ..Self::PLAIN
        }
    }

    pub const fn keep_root() -> Self {
        Self {
            keep_root: true,
            ..Self::PLAIN
        }
    }
}

/// The command family of one multi-command tool.
pub trait OperationSet: Copy + DeserializeOwned + Send + Sync + 'static {
    const TOOL_NAME: &'static str;
    const SERVICE: Service;
    const DESCRIPTION: &'static str;
    const ALL: &'static [Self];

    fn spec(self) -> &'static OperationSpec;

    fn name(self) -> &'static str {
        self.spec().name
    }
}

/// `{command, params}` input schema advertised for an [`OperationSet`].
pub fn command_schema<C: OperationSet>() -> Value {
    let commands: Vec<&str> = C::ALL.iter().map(|c| c.name()).collect();
    let required = C::ALL
        .iter()
        .filter(|c| !c.spec().required.is_empty())
        .map(|c| format!("{}: {}", c.name(), c.spec().required.join(", ")))
        .collect::<Vec<_>>()
        .join("; ");

    json!({
        "type": "object",
        "properties": {
            "command": {
                "type": "string",
                "enum": commands,
                "description": format!("The {} command to execute.", C::SERVICE),
            },
            "params": {
                "type": "object",
                "description": format!(
                    "Parameters for the command, using the AWS API field names. Required: {required}."
                ),
                "default": {},
            },
        },
        "required": ["command"],
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn assert_unique_names<C: OperationSet>() {
        let names: HashSet<&str> = C::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), C::ALL.len(), "{} has duplicate commands", C::TOOL_NAME);
    }

    fn assert_decodes_by_name<C: OperationSet + PartialEq + std::fmt::Debug>() {
        for command in C::ALL {
            let decoded: C = serde_json::from_value(json!(command.name())).unwrap();
            assert_eq!(&decoded, command);
        }
    }

    fn assert_rest_labels_required<C: OperationSet>() {
        for command in C::ALL {
            let spec = command.spec();
            if let Binding::Rest(rest) = spec.binding {
                for label in rest
                    .path
                    .split('{')
                    .skip(1)
                    .filter_map(|s| s.split('}').next())
                {
                    let label = label.trim_end_matches('+');
                    assert!(
                        spec.required.contains(&label),
                        "{}: path label {label} is not required",
                        spec.name
                    );
                }
            }
        }
    }

    #[test]
    fn command_tables_are_consistent() {
        assert_unique_names::<S3Command>();
        assert_unique_names::<DynamoDbCommand>();
        assert_unique_names::<LogsCommand>();
        assert_unique_names::<LambdaCommand>();
        assert_unique_names::<GlueCommand>();
        assert_unique_names::<IamCommand>();
        assert_unique_names::<StepFunctionsCommand>();

        assert_decodes_by_name::<S3Command>();
        assert_decodes_by_name::<DynamoDbCommand>();
        assert_decodes_by_name::<LogsCommand>();
        assert_decodes_by_name::<LambdaCommand>();
        assert_decodes_by_name::<GlueCommand>();
        assert_decodes_by_name::<IamCommand>();
        assert_decodes_by_name::<StepFunctionsCommand>();

        assert_rest_labels_required::<S3Command>();
        assert_rest_labels_required::<LambdaCommand>();
    }

    #[test]
    fn command_counts() {
        assert_eq!(S3Command::ALL.len(), 12);
        assert_eq!(DynamoDbCommand::ALL.len(), 13);
        assert_eq!(LogsCommand::ALL.len(), 6);
        assert_eq!(LambdaCommand::ALL.len(), 8);
        assert_eq!(GlueCommand::ALL.len(), 10);
        assert_eq!(IamCommand::ALL.len(), 10);
        assert_eq!(StepFunctionsCommand::ALL.len(), 6);
    }

    #[test]
    fn rpc_services_use_rpc_bindings() {
        fn check<C: OperationSet>() {
            for command in C::ALL {
                assert!(matches!(command.spec().binding, Binding::Rpc), "{}", command.name());
            }
        }
        check::<DynamoDbCommand>();
        check::<LogsCommand>();
        check::<GlueCommand>();
        check::<IamCommand>();
        check::<StepFunctionsCommand>();
    }

    #[test]
    fn iam_list_operations_declare_their_lists() {
        assert_eq!(IamCommand::ListRoles.spec().lists, ["Roles"]);
        assert_eq!(IamCommand::ListPolicies.spec().lists, ["Policies"]);
        assert_eq!(IamCommand::ListAttachedRolePolicies.spec().lists, ["AttachedPolicies"]);
        assert_eq!(IamCommand::ListRolePolicies.spec().lists, ["PolicyNames"]);
        assert!(IamCommand::GetRole.spec().lists.is_empty());
        assert!(S3Command::ListBuckets.spec().lists.is_empty());
    }

    #[test]
    fn schema_lists_commands_and_requirements() {
        let schema = command_schema::<DynamoDbCommand>();
        let commands = schema["properties"]["command"]["enum"].as_array().unwrap();
        assert_eq!(commands.len(), 13);
        assert_eq!(commands[0], "ListTables");
        let params = schema["properties"]["params"]["description"].as_str().unwrap();
        assert!(params.contains("PutItem: TableName, Item"));
        assert!(!params.contains("ListTables:"));
    }
}
