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

//! The main types used in this crate.
pub mod error;
pub(crate) mod future;
pub(crate) mod objects;
pub(crate) mod path;
pub(crate) mod stream;

use std::convert::TryInto;

use bytes::Bytes;

pub use error::{StorageError, StorageErrorKind, StorageResult, TransferError};
pub use future::WrappedFuture;
pub use objects::{FileAttributes, ObjectType, RemoteObject, Visibility};
pub use path::{ObjectPath, SEPARATOR};
pub use stream::WrappedStream;

/// The data type used for streaming data from and to files.
pub type Data = Bytes;

/// A stream that returns [`Data`](type.Data.html).
pub type DataStream = WrappedStream<StorageResult<Data>>;
/// A future that resolves to a [`DataStream`](type.DataStream.html).
pub type DataStreamFuture = WrappedFuture<StorageResult<DataStream>>;
/// A future that resolves to the entire contents of a file.
pub type DataFuture = WrappedFuture<StorageResult<Data>>;
/// A future that resolves to a [`RemoteObject`](struct.RemoteObject.html).
pub type ObjectFuture = WrappedFuture<StorageResult<RemoteObject>>;
/// A future that resolves to the flat listing of a bucket.
pub type ObjectListFuture = WrappedFuture<StorageResult<Vec<RemoteObject>>>;
/// A future that resolves to a file's [`FileAttributes`](struct.FileAttributes.html).
pub type AttributesFuture = WrappedFuture<StorageResult<FileAttributes>>;
/// A future that resolves to the contents of an emulated directory.
pub type ListingFuture = WrappedFuture<StorageResult<Vec<FileAttributes>>>;
/// A future that resolves to whether something exists.
pub type ExistsFuture = WrappedFuture<StorageResult<bool>>;
/// A future that resolves whenever the requested operation is complete.
pub type OperationCompleteFuture = WrappedFuture<StorageResult<()>>;
/// A future that resolves when the copy is complete.
pub type CopyCompleteFuture = WrappedFuture<Result<FileAttributes, TransferError>>;
/// A future that resolves when the move is complete.
pub type MoveCompleteFuture = WrappedFuture<Result<(), TransferError>>;

pub(crate) fn into_path<P>(path: P) -> StorageResult<ObjectPath>
where
    P: TryInto<ObjectPath>,
    P::Error: Into<StorageError>,
{
    path.try_into().map_err(Into::into)
}
