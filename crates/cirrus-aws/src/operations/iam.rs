//! IAM (awsQuery, global endpoint).

use crate::service::Service;

rpc_operations! {
    pub enum IamCommand {
        tool = "aws_iam",
        service = Service::Iam,
        description = "Run a read-only AWS IAM command on roles and managed policies: get roles and \
            their inline or attached policies and tags, and inspect policies and policy versions.",
        GetRole => ["RoleName"],
        GetRolePolicy => ["RoleName", "PolicyName"],
        ListAttachedRolePolicies => ["RoleName"] lists ["AttachedPolicies"],
        ListRolePolicies => ["RoleName"] lists ["PolicyNames"],
        ListRoles => [] lists ["Roles"],
        ListRoleTags => ["RoleName"] lists ["Tags"],
        GetPolicy => ["PolicyArn"],
        GetPolicyVersion => ["PolicyArn", "VersionId"],
        ListPolicies => [] lists ["Policies"],
        ListPolicyVersions => ["PolicyArn"] lists ["Versions"],
    }
}
