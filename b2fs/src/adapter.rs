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

//! The filesystem adapter over a storage client.
use std::convert::TryInto;

use futures::stream::Stream;
use log::trace;

use crate::client::StorageClient;
use crate::listing::{list_attributes, ListingQuery};
use crate::types::{error, into_path};
use crate::types::*;
use crate::utils::collect_data;
use crate::FilesystemAdapter;

macro_rules! try_path {
    ($path:expr, $future:ty) => {
        match into_path($path) {
            Ok(p) => p,
            Err(e) => return <$future>::from_value(Err(e)),
        }
    };
    ($path:expr, $future:ty, $wrap:path) => {
        match into_path($path) {
            Ok(p) => p,
            Err(e) => return <$future>::from_value(Err($wrap(e))),
        }
    };
}

/// Implements [`FilesystemAdapter`](trait.FilesystemAdapter.html) on top of a
/// [`StorageClient`](trait.StorageClient.html).
///
/// Almost every operation is a single call to the client. Directories are
/// emulated: listing filters the bucket's flat listing by prefix, and creating
/// or deleting a directory creates or deletes a plain object of that name.
#[derive(Clone, Debug)]
pub struct B2Adapter<C>
where
    C: StorageClient,
{
    client: C,
}

impl<C> B2Adapter<C>
where
    C: StorageClient,
{
    /// Creates an adapter that delegates to the given client.
    pub fn new(client: C) -> B2Adapter<C> {
        B2Adapter { client }
    }

    /// The client this adapter delegates to.
    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C> FilesystemAdapter for B2Adapter<C>
where
    C: StorageClient,
{
    fn file_exists<P>(&self, path: P) -> ExistsFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>,
    {
        let path = try_path!(path, ExistsFuture);
        self.client.file_exists(path)
    }

    fn directory_exists<P>(&self, path: P) -> ExistsFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>,
    {
        self.file_exists(path)
    }

    fn write<P, D>(&self, path: P, data: D) -> AttributesFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>,
        D: Into<Data>,
    {
        let path = try_path!(path, AttributesFuture);
        let upload = self.client.upload(path, data.into());
        AttributesFuture::from_future(async move { Ok(FileAttributes::from(upload.await?)) })
    }

    fn write_stream<P, S, I, E>(&self, path: P, stream: S) -> AttributesFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>,
        S: Stream<Item = Result<I, E>> + Send + 'static,
        I: Into<Data> + Send + 'static,
        E: Into<StorageError> + Send + 'static,
    {
        let path = try_path!(path, AttributesFuture);
        let client = self.client.clone();
        AttributesFuture::from_future(async move {
            let data = collect_data(stream).await?;
            trace!("Writing {} bytes collected from a stream to {}", data.len(), path);
            let upload = client.upload(path, data);
            Ok(FileAttributes::from(upload.await?))
        })
    }

    fn read<P>(&self, path: P) -> DataFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>,
    {
        let path = try_path!(path, DataFuture);
        let client = self.client.clone();
        DataFuture::from_future(async move {
            let lookup = client.get_file(path);
            let object = lookup.await?;
            let download = client.download(&object.id);
            download.await
        })
    }

    fn read_stream<P>(&self, path: P) -> DataStreamFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>,
    {
        let path = try_path!(path, DataStreamFuture);
        self.client.download_stream(path)
    }

    fn copy<P, T>(&self, source: P, target: T) -> CopyCompleteFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>,
        T: TryInto<ObjectPath>,
        T::Error: Into<StorageError>,
    {
        let source = try_path!(source, CopyCompleteFuture, TransferError::SourceError);
        let target = try_path!(target, CopyCompleteFuture, TransferError::TargetError);

        trace!("Copying {} to {}", source, target);
        let reader = self.read(source);
        let client = self.client.clone();
        CopyCompleteFuture::from_future(async move {
            let data = reader.await.map_err(TransferError::SourceError)?;
            let upload = client.upload(target, data);
            let object = upload.await.map_err(TransferError::TargetError)?;
            Ok(FileAttributes::from(object))
        })
    }

    fn delete<P>(&self, path: P) -> OperationCompleteFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>,
    {
        let path = try_path!(path, OperationCompleteFuture);
        self.client.delete_file(path)
    }

    fn delete_directory<P>(&self, path: P) -> OperationCompleteFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>,
    {
        self.delete(path)
    }

    fn create_directory<P>(&self, path: P) -> AttributesFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>,
    {
        self.write(path, Data::new())
    }

    fn list_contents<D>(&self, directory: D, recursive: bool) -> ListingFuture
    where
        D: AsRef<str>,
    {
        let query = match ListingQuery::new(directory, recursive) {
            Ok(q) => q,
            Err(e) => return ListingFuture::from_value(Err(e)),
        };

        let listing = self.client.list_files();
        ListingFuture::from_future(async move { Ok(list_attributes(listing.await?, &query)) })
    }

    fn attributes<P>(&self, path: P) -> AttributesFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>,
    {
        let path = try_path!(path, AttributesFuture);
        let lookup = self.client.get_file(path);
        AttributesFuture::from_future(async move { Ok(FileAttributes::from(lookup.await?)) })
    }

    fn visibility<P>(&self, path: P) -> AttributesFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>,
    {
        let path = try_path!(path, AttributesFuture);
        AttributesFuture::from_value(Err(error::unsupported(&format!(
            "B2 does not support visibility. Path: {}",
            path
        ))))
    }

    fn set_visibility<P>(&self, path: P, visibility: Visibility) -> OperationCompleteFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>,
    {
        let path = try_path!(path, OperationCompleteFuture);
        OperationCompleteFuture::from_value(Err(error::unsupported(&format!(
            "B2 does not support visibility. Path: {}, visibility: {}",
            path, visibility
        ))))
    }
}
