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

//! A mock B2 server that keeps a single bucket in memory.
use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;
use std::fmt::Display;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use futures::channel::oneshot::{channel, Sender};
use futures::future::FutureExt;
use futures::lock::Mutex;
use futures::stream::iter;
use http::header::{self, HeaderMap};
use http::request::Parts;
use http::{Method, StatusCode};
use hyper::body::to_bytes;
use hyper::server::Server;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response};
use serde::Serialize;
use serde_json::{from_slice, to_vec};
use sha1::{Digest, Sha1};
use tokio::spawn;
use uuid::Uuid;

use storage_types::b2::v2::requests::*;
use storage_types::b2::v2::responses::*;
use storage_types::b2::v2::{
    percent_decode, BucketType, FileAction, Int, B2_HEADER_CONTENT_SHA1, B2_HEADER_FILE_NAME,
    CONTENT_TYPE_AUTO,
};

use crate::runner::{SeedFile, TestError, TestResult};

pub const TEST_KEY_ID: &str = "foo";
pub const TEST_KEY: &str = "bar";
pub const TEST_BUCKET: &str = "test-bucket";
const TEST_BUCKET_ID: &str = "bkt_test-bucket";
const TEST_ACCOUNT_ID: &str = "acct_0001";

/// The most files returned in one page of a listing.
const PAGE_LIMIT: usize = 4;

/// Clock used for uploads made during a test, in milliseconds.
const UPLOAD_CLOCK_START: Int = 1_800_000_000_000;

/// A failed call, sent back as an `ErrorResponse` body.
#[derive(Debug)]
struct Failure {
    status: StatusCode,
    code: &'static str,
    message: String,
}

type Reply = Result<Response<Body>, Failure>;

fn fail<M: Display>(status: StatusCode, code: &'static str, message: M) -> Failure {
    Failure {
        status,
        code,
        message: message.to_string(),
    }
}

fn bad_request<M: Display>(message: M) -> Failure {
    fail(StatusCode::BAD_REQUEST, "bad_request", message)
}

fn unauthorized<M: Display>(message: M) -> Failure {
    fail(StatusCode::UNAUTHORIZED, "unauthorized", message)
}

impl From<serde_json::Error> for Failure {
    fn from(error: serde_json::Error) -> Failure {
        bad_request(format!("Unparseable request body: {}", error))
    }
}

impl From<hyper::Error> for Failure {
    fn from(error: hyper::Error) -> Failure {
        fail(StatusCode::REQUEST_TIMEOUT, "request_timeout", error)
    }
}

fn respond<T: Serialize>(status: StatusCode, body: &T) -> Response<Body> {
    let mut response = match to_vec(body) {
        Ok(data) => Response::new(Body::from(data)),
        Err(e) => Response::new(Body::from(e.to_string())),
    };
    *response.status_mut() = status;
    response
}

fn json<T: Serialize>(body: T) -> Reply {
    Ok(respond(StatusCode::OK, &body))
}

impl From<Failure> for Response<Body> {
    fn from(failure: Failure) -> Response<Body> {
        let body = ErrorResponse {
            status: Int::from(failure.status.as_u16()),
            code: failure.code.to_owned(),
            message: failure.message,
        };
        respond(failure.status, &body)
    }
}

fn required_header(headers: &HeaderMap, name: &str) -> Result<String, Failure> {
    headers
        .get(name)
        .ok_or_else(|| bad_request(format!("Missing header {}.", name)))?
        .to_str()
        .map(String::from)
        .map_err(|_| bad_request(format!("Header {} is not ascii.", name)))
}

fn check_bucket(id: &str) -> Result<(), Failure> {
    if id == TEST_BUCKET_ID {
        Ok(())
    } else {
        Err(fail(
            StatusCode::BAD_REQUEST,
            "invalid_bucket_id",
            format!("No bucket with id {}.", id),
        ))
    }
}

fn page_size(requested: Option<Int>) -> usize {
    requested.map_or(PAGE_LIMIT, |c| (c as usize).min(PAGE_LIMIT))
}

/// One version of a file.
#[derive(Clone, Debug)]
struct Version {
    id: String,
    name: String,
    data: Bytes,
    content_type: String,
    upload_timestamp: Int,
}

impl Version {
    fn info(&self) -> FileInfo {
        FileInfo {
            action: FileAction::Upload,
            content_length: self.data.len() as Int,
            content_sha1: Some(format!("{:x}", Sha1::digest(&self.data))),
            content_type: Some(self.content_type.clone()),
            file_id: Some(self.id.clone()),
            file_info: Default::default(),
            file_name: self.name.clone(),
            upload_timestamp: Some(self.upload_timestamp),
        }
    }
}

#[derive(Default)]
struct BucketState {
    /// Versions by file name, oldest first.
    files: BTreeMap<String, Vec<Version>>,
    /// Uses left per authorization token.
    tokens: HashMap<String, usize>,
    upload_tokens: HashMap<String, String>,
    last_id: usize,
    clock: Int,
}

impl BucketState {
    fn store(&mut self, name: &str, data: Bytes, content_type: &str, upload_timestamp: Int) -> Version {
        self.last_id += 1;
        let version = Version {
            id: format!("4_z{:08}", self.last_id),
            name: name.to_owned(),
            data,
            content_type: content_type.to_owned(),
            upload_timestamp,
        };
        self.files
            .entry(name.to_owned())
            .or_default()
            .push(version.clone());
        version
    }

    /// The newest version of each file, in name order.
    fn latest(&self) -> impl Iterator<Item = &Version> {
        self.files.values().filter_map(|versions| versions.last())
    }

    /// Every version in name order, newest first within a name.
    fn all_versions(&self) -> impl Iterator<Item = &Version> {
        self.files.values().flat_map(|versions| versions.iter().rev())
    }

    fn find_id(&self, id: &str) -> Option<&Version> {
        self.all_versions().find(|v| v.id == id)
    }
}

#[derive(Clone)]
struct MockB2 {
    addr: SocketAddr,
    auth_limit: Option<usize>,
    bucket: Arc<Mutex<BucketState>>,
}

impl MockB2 {
    async fn authorize_account(&self, auth: &str) -> Reply {
        let expected = format!(
            "Basic {}",
            STANDARD.encode(format!("{}:{}", TEST_KEY_ID, TEST_KEY))
        );
        if auth != expected {
            return Err(unauthorized("Unknown application key."));
        }

        let token = Uuid::new_v4().to_string();
        let mut bucket = self.bucket.lock().await;
        bucket
            .tokens
            .insert(token.clone(), self.auth_limit.unwrap_or(usize::MAX));

        json(AuthorizeAccountResponse {
            account_id: TEST_ACCOUNT_ID.to_owned(),
            authorization_token: token,
            api_url: format!("http://{}/api", self.addr),
            download_url: format!("http://{}/download", self.addr),
        })
    }

    async fn use_token(&self, auth: &str) -> Result<(), Failure> {
        let mut bucket = self.bucket.lock().await;
        match bucket.tokens.get_mut(auth) {
            None => Err(fail(
                StatusCode::UNAUTHORIZED,
                "bad_auth_token",
                "Unknown authorization token.",
            )),
            Some(0) => Err(fail(
                StatusCode::UNAUTHORIZED,
                "expired_auth_token",
                "Authorization token has expired.",
            )),
            Some(uses) => {
                *uses -= 1;
                Ok(())
            }
        }
    }

    async fn list_buckets(&self, request: ListBucketsRequest) -> Reply {
        if request.account_id != TEST_ACCOUNT_ID {
            return Err(unauthorized("Wrong account."));
        }

        let found = match (&request.bucket_id, &request.bucket_name) {
            (Some(id), _) => id == TEST_BUCKET_ID,
            (None, Some(name)) => name == TEST_BUCKET,
            (None, None) => true,
        };

        let mut buckets = Vec::new();
        if found && request.bucket_types.includes(BucketType::Private) {
            buckets.push(Bucket {
                account_id: TEST_ACCOUNT_ID.to_owned(),
                bucket_id: TEST_BUCKET_ID.to_owned(),
                bucket_name: TEST_BUCKET.to_owned(),
                bucket_type: BucketType::Private,
            });
        }

        json(ListBucketsResponse { buckets })
    }

    async fn list_file_names(&self, request: ListFileNamesRequest) -> Reply {
        check_bucket(&request.bucket_id)?;

        let bucket = self.bucket.lock().await;
        let prefix = request.prefix.unwrap_or_default();
        let start = request.start_file_name.unwrap_or_default();

        let mut remaining = bucket
            .latest()
            .filter(|v| v.name.starts_with(&prefix) && v.name >= start);
        let files: Vec<FileInfo> = remaining
            .by_ref()
            .take(page_size(request.max_file_count))
            .map(Version::info)
            .collect();

        json(ListFileNamesResponse {
            files,
            next_file_name: remaining.next().map(|v| v.name.clone()),
        })
    }

    async fn list_file_versions(&self, request: ListFileVersionsRequest) -> Reply {
        check_bucket(&request.bucket_id)?;

        let bucket = self.bucket.lock().await;
        let prefix = request.prefix.unwrap_or_default();
        let start = request.start_file_name.unwrap_or_default();
        let start_id = request.start_file_id;

        let mut remaining = bucket
            .all_versions()
            .filter(|v| v.name.starts_with(&prefix) && v.name >= start)
            .skip_while(|v| match start_id {
                Some(ref id) => v.name == start && v.id != *id,
                None => false,
            });
        let files: Vec<FileInfo> = remaining
            .by_ref()
            .take(page_size(request.max_file_count))
            .map(Version::info)
            .collect();
        let next = remaining.next();

        json(ListFileVersionsResponse {
            files,
            next_file_name: next.map(|v| v.name.clone()),
            next_file_id: next.map(|v| v.id.clone()),
        })
    }

    async fn delete_file_version(&self, request: DeleteFileVersionRequest) -> Reply {
        let mut bucket = self.bucket.lock().await;

        let versions = bucket.files.get_mut(&request.file_name);
        let removed = match versions {
            Some(versions) => match versions.iter().position(|v| v.id == request.file_id) {
                Some(index) => {
                    versions.remove(index);
                    versions.is_empty()
                }
                None => return Err(file_not_present(&request)),
            },
            None => return Err(file_not_present(&request)),
        };

        if removed {
            bucket.files.remove(&request.file_name);
        }

        json(DeleteFileVersionResponse {
            file_id: request.file_id,
            file_name: request.file_name,
        })
    }

    async fn get_upload_url(&self, request: GetUploadUrlRequest) -> Reply {
        check_bucket(&request.bucket_id)?;

        let token = Uuid::new_v4().to_string();
        let mut bucket = self.bucket.lock().await;
        bucket
            .upload_tokens
            .insert(token.clone(), request.bucket_id.clone());

        json(GetUploadUrlResponse {
            upload_url: format!("http://{}/upload/{}", self.addr, request.bucket_id),
            bucket_id: request.bucket_id,
            authorization_token: token,
        })
    }

    async fn upload_file(&self, head: Parts, body: Body) -> Reply {
        let name = percent_decode(&required_header(&head.headers, B2_HEADER_FILE_NAME)?)
            .map_err(|_| bad_request("File name is not utf-8."))?;
        let sha1 = required_header(&head.headers, B2_HEADER_CONTENT_SHA1)?;
        let length: usize = required_header(&head.headers, header::CONTENT_LENGTH.as_str())?
            .parse()
            .map_err(|_| bad_request("Content-Length is not a number."))?;
        let requested_type = required_header(&head.headers, header::CONTENT_TYPE.as_str())?;

        let data = to_bytes(body).await?;
        if data.len() != length {
            return Err(bad_request("Content-Length does not match the body."));
        }
        if sha1 != format!("{:x}", Sha1::digest(&data)) {
            return Err(bad_request("Checksum does not match the body."));
        }

        let content_type = match requested_type.as_str() {
            CONTENT_TYPE_AUTO if name.ends_with(".txt") => "text/plain",
            CONTENT_TYPE_AUTO => "application/octet-stream",
            other => other,
        };

        let mut bucket = self.bucket.lock().await;
        bucket.clock += 1000;
        let timestamp = bucket.clock;
        let version = bucket.store(&name, data, content_type, timestamp);
        json(version.info())
    }

    /// Sends a file back in a few chunks.
    fn send_file(version: Option<Version>, wanted: &str) -> Reply {
        let version = match version {
            Some(v) => v,
            None => {
                return Err(fail(
                    StatusCode::NOT_FOUND,
                    "not_found",
                    format!("{} does not exist.", wanted),
                ))
            }
        };

        let chunk_size = (version.data.len() / 5).max(1);
        let chunks: Vec<Result<Bytes, Infallible>> = version
            .data
            .chunks(chunk_size)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();

        let mut response = Response::new(Body::wrap_stream(iter(chunks)));
        if let Ok(value) = version.content_type.parse() {
            response.headers_mut().insert(header::CONTENT_TYPE, value);
        }
        Ok(response)
    }

    async fn download_by_id(&self, query: &str) -> Reply {
        let id = query
            .split('&')
            .find_map(|pair| pair.strip_prefix("fileId="))
            .ok_or_else(|| bad_request("No fileId given."))?;
        let id = percent_decode(id).map_err(|_| bad_request("File id is not utf-8."))?;

        let version = self.bucket.lock().await.find_id(&id).cloned();
        MockB2::send_file(version, &id)
    }

    async fn download_by_name(&self, target: &str) -> Reply {
        let (bucket_name, name) = target
            .split_once('/')
            .ok_or_else(|| bad_request("No file name given."))?;
        let name = percent_decode(name).map_err(|_| bad_request("File name is not utf-8."))?;

        let version = if bucket_name == TEST_BUCKET {
            let bucket = self.bucket.lock().await;
            bucket.files.get(&name).and_then(|v| v.last()).cloned()
        } else {
            None
        };
        MockB2::send_file(version, target)
    }

    async fn call(&self, method: &str, data: Bytes) -> Reply {
        match method {
            "b2_list_buckets" => self.list_buckets(from_slice(&data)?).await,
            "b2_list_file_names" => self.list_file_names(from_slice(&data)?).await,
            "b2_list_file_versions" => self.list_file_versions(from_slice(&data)?).await,
            "b2_delete_file_version" => self.delete_file_version(from_slice(&data)?).await,
            "b2_get_upload_url" => self.get_upload_url(from_slice(&data)?).await,
            _ => Err(bad_request(format!("Unknown API method {}.", method))),
        }
    }

    async fn serve(self, request: Request<Body>) -> Reply {
        let (head, body) = request.into_parts();
        let path = head.uri.path().to_owned();
        let auth = required_header(&head.headers, header::AUTHORIZATION.as_str())
            .map_err(|_| unauthorized("Missing authorization."))?;

        if path == "/b2api/v2/b2_authorize_account" {
            return self.authorize_account(&auth).await;
        }

        if let Some(bucket_id) = path.strip_prefix("/upload/") {
            if head.method != Method::POST {
                return Err(bad_request("Uploads must be POSTed."));
            }
            let allowed = self.bucket.lock().await.upload_tokens.get(&auth).cloned();
            if allowed.as_deref() != Some(bucket_id) {
                return Err(unauthorized("Unknown upload token."));
            }
            return self.upload_file(head, body).await;
        }

        self.use_token(&auth).await?;

        if let Some(method) = path.strip_prefix("/api/b2api/v2/") {
            if head.method != Method::POST {
                return Err(bad_request("API calls must be POSTed."));
            }
            let data = to_bytes(body).await?;
            self.call(method, data).await
        } else if path == "/download/b2api/v2/b2_download_file_by_id" {
            self.download_by_id(head.uri.query().unwrap_or_default()).await
        } else if let Some(target) = path.strip_prefix("/download/file/") {
            self.download_by_name(target).await
        } else {
            Err(fail(StatusCode::NOT_FOUND, "not_found", path))
        }
    }
}

fn file_not_present(request: &DeleteFileVersionRequest) -> Failure {
    fail(
        StatusCode::BAD_REQUEST,
        "file_not_present",
        format!("No version {} of {}.", request.file_id, request.file_name),
    )
}

/// A running mock server. Dropping the handle without calling `shutdown`
/// leaves the server running until the runtime ends.
pub struct B2ServerHandle {
    pub addr: SocketAddr,
    shutdown: Sender<()>,
}

impl B2ServerHandle {
    pub fn host(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn shutdown(self) -> TestResult<()> {
        self.shutdown
            .send(())
            .map_err(|()| TestError::HarnessFailure(String::from("The mock server already stopped.")))
    }
}

fn harness_failure<E: Display>(error: E) -> TestError {
    TestError::HarnessFailure(error.to_string())
}

/// Starts a server seeded with the given files. When `auth_limit` is set each
/// authorization token can only be used for that many calls.
pub fn start_server(files: &[SeedFile], auth_limit: Option<usize>) -> TestResult<B2ServerHandle> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).map_err(harness_failure)?;
    listener.set_nonblocking(true).map_err(harness_failure)?;
    let addr = listener.local_addr().map_err(harness_failure)?;

    let mut bucket = BucketState {
        clock: UPLOAD_CLOCK_START,
        ..Default::default()
    };
    for file in files {
        bucket.store(
            &file.name,
            file.data.clone(),
            &file.content_type,
            file.upload_timestamp,
        );
    }

    let mock = MockB2 {
        addr,
        auth_limit,
        bucket: Arc::new(Mutex::new(bucket)),
    };

    let (sender, receiver) = channel::<()>();
    let server = Server::from_tcp(listener)
        .map_err(harness_failure)?
        .serve(make_service_fn(move |_| {
            let mock = mock.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |request: Request<Body>| {
                    mock.clone()
                        .serve(request)
                        .map(|reply| Ok::<_, Infallible>(reply.unwrap_or_else(Response::from)))
                }))
            }
        }))
        .with_graceful_shutdown(receiver.map(|_| ()));

    spawn(async move {
        if let Err(e) = server.await {
            panic!("The mock B2 server failed: {}", e);
        }
    });

    Ok(B2ServerHandle {
        addr,
        shutdown: sender,
    })
}
