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

//! The storage client that the adapter delegates to.
use crate::types::*;

/// The operations the adapter needs from a storage client.
///
/// Everything that actually talks to a storage service lives behind this
/// trait: authentication, pagination and the network protocol itself. The
/// [`B2Backend`](backends/b2/struct.B2Backend.html) implements it for
/// Backblaze B2.
///
/// Errors are returned to the adapter's callers unchanged.
pub trait StorageClient: Clone + Send + Sync + 'static {
    /// Returns the complete flat listing of the bucket.
    ///
    /// Implementations must exhaust any pagination before resolving.
    fn list_files(&self) -> ObjectListFuture;

    /// Gets the object with exactly the given name.
    ///
    /// This will return a [`NotFound`](enum.StorageErrorKind.html#variant.NotFound)
    /// error if no such object exists.
    fn get_file(&self, path: ObjectPath) -> ObjectFuture;

    /// Checks whether an object with exactly the given name exists.
    fn file_exists(&self, path: ObjectPath) -> ExistsFuture {
        let lookup = self.get_file(path);
        ExistsFuture::from_future(async move {
            match lookup.await {
                Ok(_) => Ok(true),
                Err(e) if e.is_not_found() => Ok(false),
                Err(e) => Err(e),
            }
        })
    }

    /// Stores an object, replacing anything already stored under the name.
    fn upload(&self, path: ObjectPath, data: Data) -> ObjectFuture;

    /// Retrieves the entire contents of the object with the given id.
    fn download(&self, id: &str) -> DataFuture;

    /// Streams the contents of the object with the given name.
    fn download_stream(&self, path: ObjectPath) -> DataStreamFuture;

    /// Deletes the object with the given name.
    fn delete_file(&self, path: ObjectPath) -> OperationCompleteFuture;
}
