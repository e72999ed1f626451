//! Bodies of the JSON API calls the client makes.
use serde::{Deserialize, Serialize};

use super::{BucketTypes, Int};

pub const B2_API_HOST: &str = "https://api.backblazeb2.com";
pub const B2_VERSION: &str = "v2";

/// The largest page a single listing call may ask for.
pub const MAX_FILE_COUNT: Int = 1000;

/// Lists the buckets of an account, optionally narrowed to one bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBucketsRequest {
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
    #[serde(default)]
    pub bucket_types: BucketTypes,
}

/// One page of the latest version of each file, in name order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFileNamesRequest {
    pub bucket_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_count: Option<Int>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
}

/// One page of every version of every file, in name order and newest first.
///
/// A page may end part way through the versions of a file, the next page then
/// continues from `start_file_name` and `start_file_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFileVersionsRequest {
    pub bucket_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_count: Option<Int>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUploadUrlRequest {
    pub bucket_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileVersionRequest {
    pub file_name: String,
    pub file_id: String,
}
