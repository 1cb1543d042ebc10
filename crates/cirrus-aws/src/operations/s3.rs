//! S3 (restXml, path-style addressing).

use serde::Deserialize;

use super::{BodyShape, OperationSet, OperationSpec, Payload, RestBinding, XmlShape};
use crate::service::Service;
use crate::transport::HttpMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum S3Command {
    PutObject,
    DeleteObject,
    CopyObject,
    HeadBucket,
    HeadObject,
    ListBuckets,
    ListObjectsV2,
    ListObjectVersions,
    GetBucketPolicy,
    GetBucketTagging,
    GetBucketVersioning,
    GetBucketLocation,
}

impl OperationSet for S3Command {
    const TOOL_NAME: &'static str = "aws_s3";
    const SERVICE: Service = Service::S3;
    const DESCRIPTION: &'static str = "Run an Amazon S3 command: upload, copy, delete and inspect \
        objects, list buckets and object versions, and read bucket policy, tags, versioning and location.";
    const ALL: &'static [Self] = &[
        S3Command::PutObject,
        S3Command::DeleteObject,
        S3Command::CopyObject,
        S3Command::HeadBucket,
        S3Command::HeadObject,
        S3Command::ListBuckets,
        S3Command::ListObjectsV2,
        S3Command::ListObjectVersions,
        S3Command::GetBucketPolicy,
        S3Command::GetBucketTagging,
        S3Command::GetBucketVersioning,
        S3Command::GetBucketLocation,
    ];

    fn spec(self) -> &'static OperationSpec {
        match self {
            S3Command::PutObject => &PUT_OBJECT,
            S3Command::DeleteObject => &DELETE_OBJECT,
            S3Command::CopyObject => &COPY_OBJECT,
            S3Command::HeadBucket => &HEAD_BUCKET,
            S3Command::HeadObject => &HEAD_OBJECT,
            S3Command::ListBuckets => &LIST_BUCKETS,
            S3Command::ListObjectsV2 => &LIST_OBJECTS_V2,
            S3Command::ListObjectVersions => &LIST_OBJECT_VERSIONS,
            S3Command::GetBucketPolicy => &GET_BUCKET_POLICY,
            S3Command::GetBucketTagging => &GET_BUCKET_TAGGING,
            S3Command::GetBucketVersioning => &GET_BUCKET_VERSIONING,
            S3Command::GetBucketLocation => &GET_BUCKET_LOCATION,
        }
    }
}

const OBJECT: &str = "/{Bucket}/{Key+}";
const BUCKET: &str = "/{Bucket}";

/// Headers shared by the object-writing commands.
const WRITE_HEADERS: &[(&str, &str)] = &[
    ("ContentType", "Content-Type"),
    ("CacheControl", "Cache-Control"),
    ("ContentDisposition", "Content-Disposition"),
    ("ContentEncoding", "Content-Encoding"),
    ("ACL", "x-amz-acl"),
    ("StorageClass", "x-amz-storage-class"),
    ("ServerSideEncryption", "x-amz-server-side-encryption"),
    ("Tagging", "x-amz-tagging"),
];

static PUT_OBJECT: OperationSpec = OperationSpec::rest(
    "PutObject",
    &["Bucket", "Key"],
    RestBinding::new(HttpMethod::Put, OBJECT)
        .headers(WRITE_HEADERS)
        .prefix_headers("Metadata", "x-amz-meta-")
        .payload(Payload::Raw("Body"))
        .output(BodyShape::Empty)
        .output_headers(&[
            ("etag", "ETag"),
            ("x-amz-version-id", "VersionId"),
            ("x-amz-server-side-encryption", "ServerSideEncryption"),
        ]),
);

static DELETE_OBJECT: OperationSpec = OperationSpec::rest(
    "DeleteObject",
    &["Bucket", "Key"],
    RestBinding::new(HttpMethod::Delete, OBJECT)
        .query(&[("VersionId", "versionId")])
        .output(BodyShape::Empty)
        .output_headers(&[
            ("x-amz-delete-marker", "DeleteMarker"),
            ("x-amz-version-id", "VersionId"),
        ]),
);

static COPY_OBJECT: OperationSpec = OperationSpec::rest(
    "CopyObject",
    &["Bucket", "Key", "CopySource"],
    RestBinding::new(HttpMethod::Put, OBJECT)
        .headers(&[
            ("CopySource", "x-amz-copy-source"),
            ("MetadataDirective", "x-amz-metadata-directive"),
            ("TaggingDirective", "x-amz-tagging-directive"),
            ("ContentType", "Content-Type"),
            ("ACL", "x-amz-acl"),
            ("StorageClass", "x-amz-storage-class"),
        ])
        .prefix_headers("Metadata", "x-amz-meta-")
        .output(BodyShape::Xml(XmlShape::keep_root()))
        .output_headers(&[
            ("x-amz-version-id", "VersionId"),
            ("x-amz-copy-source-version-id", "CopySourceVersionId"),
        ]),
);

static HEAD_BUCKET: OperationSpec = OperationSpec::rest(
    "HeadBucket",
    &["Bucket"],
    RestBinding::new(HttpMethod::Head, BUCKET)
        .output(BodyShape::Empty)
        .output_headers(&[
            ("x-amz-bucket-region", "BucketRegion"),
            ("x-amz-access-point-alias", "AccessPointAlias"),
        ]),
);

static HEAD_OBJECT: OperationSpec = OperationSpec::rest(
    "HeadObject",
    &["Bucket", "Key"],
    RestBinding::new(HttpMethod::Head, OBJECT)
        .query(&[("VersionId", "versionId"), ("PartNumber", "partNumber")])
        .output(BodyShape::Empty)
        .output_headers(&[
            ("content-length", "ContentLength"),
            ("content-type", "ContentType"),
            ("etag", "ETag"),
            ("last-modified", "LastModified"),
            ("cache-control", "CacheControl"),
            ("content-encoding", "ContentEncoding"),
            ("x-amz-version-id", "VersionId"),
            ("x-amz-storage-class", "StorageClass"),
            ("x-amz-server-side-encryption", "ServerSideEncryption"),
        ]),
);

static LIST_BUCKETS: OperationSpec = OperationSpec::rest(
    "ListBuckets",
    &[],
    RestBinding::new(HttpMethod::Get, "/")
        .query(&[
            ("MaxBuckets", "max-buckets"),
            ("ContinuationToken", "continuation-token"),
            ("Prefix", "prefix"),
        ])
        .output(BodyShape::Xml(XmlShape::wrapped(&["Buckets"]))),
);

static LIST_OBJECTS_V2: OperationSpec = OperationSpec::rest(
    "ListObjectsV2",
    &["Bucket"],
    RestBinding::new(HttpMethod::Get, BUCKET)
        .static_query(&[("list-type", "2")])
        .query(&[
            ("Prefix", "prefix"),
            ("Delimiter", "delimiter"),
            ("MaxKeys", "max-keys"),
            ("ContinuationToken", "continuation-token"),
            ("StartAfter", "start-after"),
            ("FetchOwner", "fetch-owner"),
        ])
        .output(BodyShape::Xml(XmlShape::flattened(&[
            "Contents",
            "CommonPrefixes",
        ]))),
);

static LIST_OBJECT_VERSIONS: OperationSpec = OperationSpec::rest(
    "ListObjectVersions",
    &["Bucket"],
    RestBinding::new(HttpMethod::Get, BUCKET)
        .static_query(&[("versions", "")])
        .query(&[
            ("Prefix", "prefix"),
            ("Delimiter", "delimiter"),
            ("MaxKeys", "max-keys"),
            ("KeyMarker", "key-marker"),
            ("VersionIdMarker", "version-id-marker"),
        ])
        .output(BodyShape::Xml(XmlShape::flattened(&[
            "Version",
            "DeleteMarker",
            "CommonPrefixes",
        ]))),
);

static GET_BUCKET_POLICY: OperationSpec = OperationSpec::rest(
    "GetBucketPolicy",
    &["Bucket"],
    RestBinding::new(HttpMethod::Get, BUCKET)
        .static_query(&[("policy", "")])
        .output(BodyShape::Text("Policy")),
);

static GET_BUCKET_TAGGING: OperationSpec = OperationSpec::rest(
    "GetBucketTagging",
    &["Bucket"],
    RestBinding::new(HttpMethod::Get, BUCKET)
        .static_query(&[("tagging", "")])
        .output(BodyShape::Xml(XmlShape::wrapped(&["TagSet"]))),
);

static GET_BUCKET_VERSIONING: OperationSpec = OperationSpec::rest(
    "GetBucketVersioning",
    &["Bucket"],
    RestBinding::new(HttpMethod::Get, BUCKET)
        .static_query(&[("versioning", "")])
        .output(BodyShape::Xml(XmlShape::PLAIN)),
);

static GET_BUCKET_LOCATION: OperationSpec = OperationSpec::rest(
    "GetBucketLocation",
    &["Bucket"],
    RestBinding::new(HttpMethod::Get, BUCKET)
        .static_query(&[("location", "")])
        .output(BodyShape::Xml(XmlShape::PLAIN)),
);
