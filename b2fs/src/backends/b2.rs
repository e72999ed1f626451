// Copyright 2019 Dave Townsend
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Accesses files in a Backblaze B2 bucket. Included with the feature "b2".
//!
//! The [`B2Backend`](struct.B2Backend.html) is a
//! [`StorageClient`](../../trait.StorageClient.html) that talks to the B2
//! native API. Connecting resolves the bucket up front so a bad bucket name is
//! reported immediately.
mod client;

use futures::stream::TryStreamExt;
use hyper::body::to_bytes;
use hyper::client::connect::HttpConnector;
use hyper::client::Client as HyperClient;
use hyper_tls::HttpsConnector;
use log::{debug, trace};

use storage_types::b2::v2::requests::*;
use storage_types::b2::v2::responses::FileInfo;
use storage_types::b2::v2::{BucketTypes, FileAction};

use crate::client::StorageClient;
use crate::types::*;
use crate::B2Adapter;
use client::B2Client;

type Client = HyperClient<HttpsConnector<HttpConnector>>;

/// A future that resolves to a connected [`B2Backend`](struct.B2Backend.html).
pub type BackendFuture = WrappedFuture<StorageResult<B2Backend>>;
/// A future that resolves to an adapter over a connected
/// [`B2Backend`](struct.B2Backend.html).
pub type ConnectFuture = WrappedFuture<StorageResult<B2Adapter<B2Backend>>>;

impl From<http::Error> for StorageError {
    fn from(error: http::Error) -> StorageError {
        error::other_error(&format!("{}", error), Some(error))
    }
}

impl From<hyper::Error> for StorageError {
    fn from(error: hyper::Error) -> StorageError {
        if error.is_parse() || error.is_user() {
            error::invalid_data(&format!("{}", error), Some(error))
        } else if error.is_canceled() {
            error::cancelled(&format!("{}", error), Some(error))
        } else if error.is_closed() || error.is_incomplete_message() {
            error::connection_closed(&format!("{}", error), Some(error))
        } else if error.is_connect() || error.is_timeout() {
            error::connection_failed(&format!("{}", error), Some(error))
        } else {
            error::other_error(&format!("{}", error), Some(error))
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(error: serde_json::Error) -> StorageError {
        error::internal_error(&format!("{}", error), Some(error))
    }
}

#[derive(Clone, Debug)]
struct B2Settings {
    key_id: String,
    key: String,
    host: String,
    bucket_name: Option<String>,
    bucket_id: Option<String>,
}

/// Converts a file listed by B2 into a [`RemoteObject`](../../struct.RemoteObject.html).
///
/// Only uploaded files are real objects, anything else is skipped.
fn remote_object(info: FileInfo) -> StorageResult<Option<RemoteObject>> {
    if info.action != FileAction::Upload {
        return Ok(None);
    }

    let id = match info.file_id {
        Some(id) => id,
        None => {
            return Err(error::invalid_data::<StorageError>(
                &format!("B2 returned no file id for {}.", info.file_name),
                None,
            ))
        }
    };

    Ok(Some(RemoteObject {
        id,
        name: ObjectPath::new(info.file_name)?,
        size: info.content_length,
        upload_timestamp: info.upload_timestamp,
        content_type: info.content_type,
    }))
}

async fn resolve_bucket(client: &B2Client) -> StorageResult<(String, String)> {
    let session = client.account_info().await?;
    let settings = &client.settings;

    let request = ListBucketsRequest {
        account_id: session.account_id,
        bucket_id: settings.bucket_id.clone(),
        bucket_name: match settings.bucket_id {
            Some(_) => None,
            None => settings.bucket_name.clone(),
        },
        bucket_types: BucketTypes::All,
    };

    let response = client.b2_list_buckets(ObjectPath::empty(), request).await?;
    match response.buckets.into_iter().next() {
        Some(bucket) => {
            trace!(
                "Client {:04}: Using bucket {} ({})",
                client.id,
                bucket.bucket_name,
                bucket.bucket_id
            );
            Ok((bucket.bucket_id, bucket.bucket_name))
        }
        None => {
            let name = settings
                .bucket_id
                .as_ref()
                .or(settings.bucket_name.as_ref())
                .cloned()
                .unwrap_or_default();
            Err(error::invalid_settings::<StorageError>(
                &format!("The bucket {} does not exist.", name),
                None,
            ))
        }
    }
}

/// The storage client for B2 buckets.
///
/// Clones share the same authorization session.
#[derive(Clone, Debug)]
pub struct B2Backend {
    client: B2Client,
    bucket_id: String,
    bucket_name: String,
}

impl B2Backend {
    /// Creates a builder for connecting to B2 with the given application key.
    pub fn builder(key_id: &str, key: &str) -> B2BackendBuilder {
        B2BackendBuilder::new(key_id, key)
    }

    /// Connects to the named bucket and wraps the backend in a
    /// [`B2Adapter`](../../struct.B2Adapter.html).
    pub fn connect(key_id: &str, key: &str, bucket_name: &str) -> ConnectFuture {
        B2BackendBuilder::new(key_id, key)
            .bucket_name(bucket_name)
            .connect()
    }

    /// The id of the bucket this backend accesses.
    pub fn bucket_id(&self) -> &str {
        &self.bucket_id
    }

    /// The name of the bucket this backend accesses.
    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }
}

impl StorageClient for B2Backend {
    fn list_files(&self) -> ObjectListFuture {
        let client = self.client.clone();
        let bucket_id = self.bucket_id.clone();

        ObjectListFuture::from_future(async move {
            let mut objects: Vec<RemoteObject> = Vec::new();
            let mut start_file_name: Option<String> = None;

            loop {
                let request = ListFileNamesRequest {
                    bucket_id: bucket_id.clone(),
                    start_file_name: start_file_name.take(),
                    max_file_count: Some(MAX_FILE_COUNT),
                    prefix: None,
                    delimiter: None,
                };

                let response = client
                    .b2_list_file_names(ObjectPath::empty(), request)
                    .await?;

                for info in response.files {
                    if let Some(object) = remote_object(info)? {
                        objects.push(object);
                    }
                }

                match response.next_file_name {
                    Some(name) => start_file_name = Some(name),
                    None => break,
                }
            }

            debug!(
                "Client {:04}: Listed {} files in the bucket",
                client.id,
                objects.len()
            );
            Ok(objects)
        })
    }

    fn get_file(&self, path: ObjectPath) -> ObjectFuture {
        let client = self.client.clone();
        let bucket_id = self.bucket_id.clone();

        ObjectFuture::from_future(async move {
            let request = ListFileNamesRequest {
                bucket_id,
                start_file_name: Some(path.to_string()),
                max_file_count: Some(1),
                prefix: Some(path.to_string()),
                delimiter: None,
            };

            let response = client.b2_list_file_names(path.clone(), request).await?;
            let found = response
                .files
                .into_iter()
                .find(|info| info.file_name == path.as_str());

            let object = match found {
                Some(info) => remote_object(info)?,
                None => None,
            };

            match object {
                Some(o) => Ok(o),
                None => Err(error::not_found::<StorageError>(path, None)),
            }
        })
    }

    fn upload(&self, path: ObjectPath, data: Data) -> ObjectFuture {
        let client = self.client.clone();
        let bucket_id = self.bucket_id.clone();

        ObjectFuture::from_future(async move {
            let upload_url = client
                .b2_get_upload_url(path.clone(), GetUploadUrlRequest { bucket_id })
                .await?;

            let info = client
                .clone()
                .b2_upload_file(path.clone(), upload_url, data)
                .await?;

            match remote_object(info)? {
                Some(object) => Ok(object),
                None => Err(error::invalid_data::<StorageError>(
                    &format!("B2 did not report an upload for {}.", path),
                    None,
                )),
            }
        })
    }

    fn download(&self, id: &str) -> DataFuture {
        let client = self.client.clone();
        let id = id.to_owned();

        DataFuture::from_future(async move {
            let body = client
                .b2_download_file_by_id(ObjectPath::empty(), id)
                .await?;
            Ok(to_bytes(body).await?)
        })
    }

    fn download_stream(&self, path: ObjectPath) -> DataStreamFuture {
        let client = self.client.clone();
        let bucket_name = self.bucket_name.clone();

        DataStreamFuture::from_future(async move {
            let body = client.b2_download_file_by_name(path, bucket_name).await?;
            Ok(DataStream::from_stream(body.map_err(StorageError::from)))
        })
    }

    fn delete_file(&self, path: ObjectPath) -> OperationCompleteFuture {
        let client = self.client.clone();
        let bucket_id = self.bucket_id.clone();

        OperationCompleteFuture::from_future(async move {
            let mut deleted: usize = 0;
            let mut start_file_name = Some(path.to_string());
            let mut start_file_id: Option<String> = None;

            loop {
                let request = ListFileVersionsRequest {
                    bucket_id: bucket_id.clone(),
                    start_file_name: start_file_name.take(),
                    start_file_id: start_file_id.take(),
                    max_file_count: Some(MAX_FILE_COUNT),
                    prefix: Some(path.to_string()),
                    delimiter: None,
                };

                let response = client.b2_list_file_versions(path.clone(), request).await?;

                // Versions are sorted by name so those for other files mean we
                // have seen every version of this one.
                let mut done = response.next_file_name.as_deref() != Some(path.as_str());
                for info in response.files {
                    if info.file_name != path.as_str() {
                        done = true;
                        break;
                    }

                    if let Some(file_id) = info.file_id {
                        let request = DeleteFileVersionRequest {
                            file_name: info.file_name,
                            file_id,
                        };
                        client
                            .b2_delete_file_version(path.clone(), request)
                            .await?;
                        deleted += 1;
                    }
                }

                if done {
                    break;
                }

                start_file_name = response.next_file_name;
                start_file_id = response.next_file_id;
            }

            if deleted == 0 {
                return Err(error::not_found::<StorageError>(path, None));
            }

            debug!(
                "Client {:04}: Deleted {} versions of {}",
                client.id, deleted, path
            );
            Ok(())
        })
    }
}

/// Used to configure and connect a [`B2Backend`](struct.B2Backend.html).
#[derive(Debug, Clone)]
pub struct B2BackendBuilder {
    settings: B2Settings,
}

impl B2BackendBuilder {
    /// Creates a new builder using the given application key.
    pub fn new(key_id: &str, key: &str) -> B2BackendBuilder {
        B2BackendBuilder {
            settings: B2Settings {
                key_id: key_id.to_owned(),
                key: key.to_owned(),
                host: B2_API_HOST.to_owned(),
                bucket_name: None,
                bucket_id: None,
            },
        }
    }

    /// Sets the API host to connect to. Mostly useful for testing.
    pub fn host(mut self, host: &str) -> B2BackendBuilder {
        self.settings.host = host.trim_end_matches('/').to_owned();
        self
    }

    /// Sets the name of the bucket to access.
    pub fn bucket_name(mut self, bucket_name: &str) -> B2BackendBuilder {
        self.settings.bucket_name = Some(bucket_name.to_owned());
        self
    }

    /// Sets the id of the bucket to access. Takes precedence over the name.
    pub fn bucket_id(mut self, bucket_id: &str) -> B2BackendBuilder {
        self.settings.bucket_id = Some(bucket_id.to_owned());
        self
    }

    /// Authorizes with B2 and resolves the bucket.
    pub fn build(self) -> BackendFuture {
        if self.settings.bucket_name.is_none() && self.settings.bucket_id.is_none() {
            return BackendFuture::from_value(Err(error::invalid_settings::<StorageError>(
                "Either a bucket name or a bucket id must be given.",
                None,
            )));
        }

        BackendFuture::from_future(async move {
            let connector = HttpsConnector::new();
            let client = B2Client::new(HyperClient::builder().build(connector), self.settings);

            let (bucket_id, bucket_name) = resolve_bucket(&client).await?;

            Ok(B2Backend {
                client,
                bucket_id,
                bucket_name,
            })
        })
    }

    /// Builds the backend and wraps it in a
    /// [`B2Adapter`](../../struct.B2Adapter.html).
    pub fn connect(self) -> ConnectFuture {
        let build = self.build();
        ConnectFuture::from_future(async move { Ok(B2Adapter::new(build.await?)) })
    }
}
