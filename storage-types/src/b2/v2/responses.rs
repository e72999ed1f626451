//! Bodies of the JSON responses B2 sends back.
//!
//! Only the fields the client reads are declared, anything else B2 sends is
//! ignored.
use serde::{Deserialize, Serialize};

use super::{BucketType, FileAction, Int, Map};

/// The body of every failed API call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status: Int,
    pub code: String,
    pub message: String,
}

/// An authorization session. The token is valid for at most 24 hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeAccountResponse {
    pub account_id: String,
    pub authorization_token: String,
    pub api_url: String,
    pub download_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub account_id: String,
    pub bucket_id: String,
    pub bucket_name: String,
    pub bucket_type: BucketType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBucketsResponse {
    pub buckets: Vec<Bucket>,
}

/// A single file (or file version) as B2 reports it.
///
/// Folder entries returned for delimited listings carry neither an id nor an
/// upload timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub action: FileAction,
    pub content_length: Int,
    #[serde(default)]
    pub content_sha1: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub file_info: Map,
    pub file_name: String,
    #[serde(default)]
    pub upload_timestamp: Option<Int>,
}

/// `b2_upload_file` answers with the new file version.
pub type UploadFileResponse = FileInfo;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFileNamesResponse {
    pub files: Vec<FileInfo>,
    pub next_file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFileVersionsResponse {
    pub files: Vec<FileInfo>,
    pub next_file_name: Option<String>,
    pub next_file_id: Option<String>,
}

/// Where and with which token a single upload may be sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUploadUrlResponse {
    pub bucket_id: String,
    pub upload_url: String,
    pub authorization_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileVersionResponse {
    pub file_id: String,
    pub file_name: String,
}
