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

//! The low level B2 API client.
//!
//! Every request made to B2 goes through here. The session returned by
//! `b2_authorize_account` is shared between all clones of a client.
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures::lock::Mutex;
use http::header;
use hyper::body::{to_bytes, Body};
use hyper::{Request, Response};
use log::{error, trace, warn};
use serde::de::DeserializeOwned;
use serde::ser::Serialize;
use serde_json::{from_slice, to_vec};
use sha1::{Digest, Sha1};

use storage_types::b2::v2::requests::*;
use storage_types::b2::v2::responses::*;
use storage_types::b2::v2::{
    percent_encode, B2_HEADER_CONTENT_SHA1, B2_HEADER_FILE_NAME, CONTENT_TYPE_AUTO,
};

use super::{B2Settings, Client};
use crate::types::*;

const AUTHORIZE_ACCOUNT: &str = "b2_authorize_account";

/// Maps the body of a failed call to a `StorageError`.
fn api_error(method: &str, client_id: usize, path: &ObjectPath, body: &[u8]) -> StorageError {
    let response: ErrorResponse = match from_slice(body) {
        Ok(r) => r,
        Err(e) => {
            error!(
                "Client {:04}: {} failed with an unparseable body: {}",
                client_id,
                method,
                String::from_utf8_lossy(body)
            );
            return error::invalid_data(&format!("Unreadable error from {}.", method), Some(e));
        }
    };
    warn!(
        "Client {:04}: {} failed with {} {}: {}",
        client_id, method, response.status, response.code, response.message
    );

    let message = response.message.as_str();
    match response.code.as_str() {
        _ if method == AUTHORIZE_ACCOUNT && response.status == 401 => {
            error::access_denied::<StorageError>(
                "The application key id or key were not recognized.",
                None,
            )
        }
        "bad_request" => error::internal_error::<StorageError>(message, None),
        "invalid_bucket_id" | "bad_bucket_id" | "file_not_present" | "not_found" => {
            error::not_found::<StorageError>(path.clone(), None)
        }
        "unauthorized" => error::access_denied::<StorageError>(message, None),
        "bad_auth_token" | "expired_auth_token" => {
            error::access_expired::<StorageError>(message, None)
        }
        "unsupported" => error::unsupported(message),
        _ if response.status == 503 => error::connection_failed::<StorageError>(message, None),
        code => error::other_error::<StorageError>(
            &format!("B2 returned {} {}: {}", response.status, code, message),
            None,
        ),
    }
}

macro_rules! b2_api {
    ($method:ident, $request:ident, $response:ident) => {
        pub fn $method(
            &self,
            path: ObjectPath,
            request: $request,
        ) -> impl Future<Output = StorageResult<$response>> {
            self.clone().call(stringify!($method), path, request)
        }
    };
}

#[derive(Debug)]
pub(super) struct B2Client {
    pub id: usize,
    pub settings: B2Settings,
    client: Client,
    next_id: Arc<AtomicUsize>,
    session: Arc<Mutex<Option<AuthorizeAccountResponse>>>,
}

impl Clone for B2Client {
    fn clone(&self) -> B2Client {
        B2Client {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            settings: self.settings.clone(),
            client: self.client.clone(),
            next_id: self.next_id.clone(),
            session: self.session.clone(),
        }
    }
}

impl B2Client {
    pub fn new(client: Client, settings: B2Settings) -> B2Client {
        B2Client {
            id: 0,
            settings,
            client,
            next_id: Arc::new(AtomicUsize::new(1)),
            session: Default::default(),
        }
    }

    /// Sends a request, turning any non-success response into an error.
    async fn send(
        &self,
        method: &str,
        path: &ObjectPath,
        request: Request<Body>,
    ) -> StorageResult<Response<Body>> {
        trace!("Client {:04}: {} {}", self.id, request.method(), request.uri());

        let response = self.client.request(request).await.map_err(|e| {
            error!("Client {:04}: {} could not be sent: {}", self.id, method, e);
            StorageError::from(e)
        })?;

        trace!(
            "Client {:04}: {} returned {}",
            self.id,
            method,
            response.status()
        );
        if response.status().is_success() {
            Ok(response)
        } else {
            let body = to_bytes(response.into_body()).await?;
            Err(api_error(method, self.id, path, &body))
        }
    }

    /// Sends a request and parses the JSON response.
    async fn send_json<R>(
        &self,
        method: &str,
        path: &ObjectPath,
        request: Request<Body>,
    ) -> StorageResult<R>
    where
        R: DeserializeOwned + fmt::Debug,
    {
        let response = self.send(method, path, request).await?;
        let body = to_bytes(response.into_body()).await?;

        let result: R = from_slice(&body).map_err(|e| {
            error!("Client {:04}: {} returned bad json: {}", self.id, method, e);
            error::invalid_data(&format!("Unable to parse the response from {}.", method), Some(e))
        })?;
        trace!("Client {:04}: {} returned {:?}", self.id, method, result);
        Ok(result)
    }

    async fn authorize_account(&self) -> StorageResult<AuthorizeAccountResponse> {
        trace!(
            "Client {:04}: Authorizing key {}",
            self.id,
            self.settings.key_id
        );

        let credentials = STANDARD.encode(format!("{}:{}", self.settings.key_id, self.settings.key));
        let request = Request::get(format!(
            "{}/b2api/{}/{}",
            self.settings.host, B2_VERSION, AUTHORIZE_ACCOUNT
        ))
        .header(header::AUTHORIZATION, format!("Basic {}", credentials))
        .body(Body::empty())?;

        self.send_json(AUTHORIZE_ACCOUNT, &ObjectPath::empty(), request)
            .await
    }

    /// Returns the cached session, authorizing first if there is none.
    async fn session(&self) -> StorageResult<AuthorizeAccountResponse> {
        let mut session = self.session.lock().await;
        if let Some(s) = &*session {
            return Ok(s.clone());
        }

        let authorized = self.authorize_account().await?;
        *session = Some(authorized.clone());
        Ok(authorized)
    }

    /// Drops the session a failed call used if B2 no longer accepts it.
    async fn forget_expired<R>(
        &self,
        token: &str,
        result: StorageResult<R>,
    ) -> StorageResult<R> {
        if let Err(ref e) = result {
            if e.kind() == StorageErrorKind::AccessExpired {
                let mut session = self.session.lock().await;
                let current = match &*session {
                    Some(s) => s.authorization_token == token,
                    None => false,
                };
                if current {
                    trace!("Client {:04}: Dropping the expired session", self.id);
                    *session = None;
                }
            }
        }

        result
    }

    pub async fn account_info(&self) -> StorageResult<AuthorizeAccountResponse> {
        self.session().await
    }

    async fn call<S, R>(self, method: &'static str, path: ObjectPath, body: S) -> StorageResult<R>
    where
        S: Serialize + fmt::Debug,
        R: DeserializeOwned + fmt::Debug,
    {
        let session = self.session().await?;
        trace!("Client {:04}: {} with {:?}", self.id, method, body);

        let request = Request::post(format!("{}/b2api/{}/{}", session.api_url, B2_VERSION, method))
            .header(header::AUTHORIZATION, session.authorization_token.as_str())
            .body(Body::from(to_vec(&body)?))?;

        let result = self.send_json(method, &path, request).await;
        self.forget_expired(&session.authorization_token, result)
            .await
    }

    async fn download(
        self,
        method: &'static str,
        path: ObjectPath,
        location: String,
    ) -> StorageResult<Body> {
        let session = self.session().await?;

        let request = Request::get(format!("{}{}", session.download_url, location))
            .header(header::AUTHORIZATION, session.authorization_token.as_str())
            .body(Body::empty())?;

        let result = self
            .send(method, &path, request)
            .await
            .map(Response::into_body);
        self.forget_expired(&session.authorization_token, result)
            .await
    }

    pub async fn b2_download_file_by_id(
        self,
        path: ObjectPath,
        file_id: String,
    ) -> StorageResult<Body> {
        let location = format!(
            "/b2api/{}/b2_download_file_by_id?fileId={}",
            B2_VERSION,
            percent_encode(&file_id)
        );
        self.download("b2_download_file_by_id", path, location)
            .await
    }

    pub async fn b2_download_file_by_name(
        self,
        path: ObjectPath,
        bucket: String,
    ) -> StorageResult<Body> {
        let location = format!(
            "/file/{}/{}",
            percent_encode(&bucket),
            percent_encode(path.as_str())
        );
        self.download("b2_download_file_by_name", path, location)
            .await
    }

    /// Uploads to a url from `b2_get_upload_url`. The url's token is only
    /// valid for that url so expiry does not touch the session.
    pub async fn b2_upload_file(
        self,
        path: ObjectPath,
        target: GetUploadUrlResponse,
        data: Data,
    ) -> StorageResult<UploadFileResponse> {
        let sha1 = format!("{:x}", Sha1::digest(&data));
        trace!(
            "Client {:04}: Uploading {} bytes to {} (sha1 {})",
            self.id,
            data.len(),
            path,
            sha1
        );

        let request = Request::post(target.upload_url.as_str())
            .header(header::AUTHORIZATION, target.authorization_token.as_str())
            .header(B2_HEADER_FILE_NAME, percent_encode(path.as_str()))
            .header(header::CONTENT_TYPE, CONTENT_TYPE_AUTO)
            .header(header::CONTENT_LENGTH, data.len())
            .header(B2_HEADER_CONTENT_SHA1, sha1)
            .body(Body::from(data))?;

        self.send_json("b2_upload_file", &path, request).await
    }

    b2_api!(b2_list_buckets, ListBucketsRequest, ListBucketsResponse);
    b2_api!(
        b2_list_file_names,
        ListFileNamesRequest,
        ListFileNamesResponse
    );
    b2_api!(
        b2_list_file_versions,
        ListFileVersionsRequest,
        ListFileVersionsResponse
    );
    b2_api!(
        b2_delete_file_version,
        DeleteFileVersionRequest,
        DeleteFileVersionResponse
    );
    b2_api!(b2_get_upload_url, GetUploadUrlRequest, GetUploadUrlResponse);
}
