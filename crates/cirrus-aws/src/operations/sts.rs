//! STS (awsQuery). Only the identity check used by the connection test.

use super::OperationSpec;

pub static GET_CALLER_IDENTITY: OperationSpec = OperationSpec::rpc("GetCallerIdentity", &[]);
