//! An asynchronous filesystem API for files stored in a Backblaze B2 bucket.
//!
//! The API offers functions for checking, reading, writing, copying, moving,
//! deleting and listing files. B2 itself is a flat key -> data store with no
//! notion of directories, so directories are emulated from `/` separated keys
//! when listing (see the [`listing`](listing/index.html) module) and are never
//! stored.
//!
//! The [`FilesystemAdapter`](trait.FilesystemAdapter.html) trait is the generic
//! surface and [`B2Adapter`](struct.B2Adapter.html) implements it on top of any
//! [`StorageClient`](trait.StorageClient.html). The actual work of talking to
//! B2 is done by the client, normally a
//! [`B2Backend`](backends/b2/struct.B2Backend.html) which is included with the
//! "b2" feature.
//!
//! ```no_run
//! use b2fs::backends::b2::B2Backend;
//! use b2fs::executor::run;
//! use b2fs::FilesystemAdapter;
//!
//! let result = run(async {
//!     let fs = B2Backend::connect("key id", "key", "my-bucket").await?;
//!     for file in fs.list_contents("docs", false).await? {
//!         println!("{} {}", file.size, file.path);
//!     }
//!     Ok::<(), b2fs::StorageError>(())
//! });
//! ```
#![warn(missing_docs)]

mod adapter;
pub mod backends;
mod client;
pub mod executor;
pub mod listing;
mod types;
pub mod utils;

pub use adapter::B2Adapter;
pub use client::StorageClient;
pub use types::*;

use std::convert::TryInto;

use futures::stream::Stream;

/// The operations a filesystem layer can perform on storage.
///
/// Every path argument accepts anything that can be converted into an
/// [`ObjectPath`](struct.ObjectPath.html), so plain strings work.
pub trait FilesystemAdapter: Clone + Send + Sync + 'static {
    /// Checks whether a file exists at the given path.
    fn file_exists<P>(&self, path: P) -> ExistsFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>;

    /// Checks whether a directory exists at the given path.
    fn directory_exists<P>(&self, path: P) -> ExistsFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>;

    /// Writes data to the file at the given path, replacing anything there.
    fn write<P, D>(&self, path: P, data: D) -> AttributesFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>,
        D: Into<Data>;

    /// Writes a stream of data to the file at the given path.
    ///
    /// The future returned will only resolve once all the data from the stream
    /// is succesfully written to storage. Any error emitted by the stream will
    /// cause this operation to fail without writing anything.
    fn write_stream<P, S, I, E>(&self, path: P, stream: S) -> AttributesFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>,
        S: Stream<Item = Result<I, E>> + Send + 'static,
        I: Into<Data> + Send + 'static,
        E: Into<StorageError> + Send + 'static;

    /// Reads the entire contents of the file at the given path.
    ///
    /// This will return a [`NotFound`](enum.StorageErrorKind.html#variant.NotFound)
    /// error if the file does not exist.
    fn read<P>(&self, path: P) -> DataFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>;

    /// Gets a stream of data for the file at the given path.
    ///
    /// The data returned is not necessarily in any particular chunk size.
    /// Dropping the stream at any point before completion is safe.
    fn read_stream<P>(&self, path: P) -> DataStreamFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>;

    /// Copies a file from one path to another.
    fn copy<P, T>(&self, source: P, target: T) -> CopyCompleteFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>,
        T: TryInto<ObjectPath>,
        T::Error: Into<StorageError>;

    /// Moves a file from one path to another.
    ///
    /// This copies the file and then deletes the source. If the copy fails
    /// the source is left alone.
    fn move_file<P, T>(&self, source: P, target: T) -> MoveCompleteFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>,
        T: TryInto<ObjectPath>,
        T::Error: Into<StorageError>,
    {
        let path = match types::into_path(source) {
            Ok(p) => p,
            Err(e) => return MoveCompleteFuture::from_value(Err(TransferError::SourceError(e))),
        };

        let deleter = self.clone();
        let copy = self.copy(path.clone(), target);
        MoveCompleteFuture::from_future(async move {
            copy.await?;
            let delete = deleter.delete(path);
            delete.await.map_err(TransferError::SourceError)
        })
    }

    /// Deletes the file at the given path.
    ///
    /// This will return a [`NotFound`](enum.StorageErrorKind.html#variant.NotFound)
    /// error if the file does not exist.
    fn delete<P>(&self, path: P) -> OperationCompleteFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>;

    /// Deletes the directory at the given path.
    fn delete_directory<P>(&self, path: P) -> OperationCompleteFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>;

    /// Creates a directory at the given path.
    fn create_directory<P>(&self, path: P) -> AttributesFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>;

    /// Lists the files in the given directory.
    ///
    /// The empty string lists the root. When `recursive` is false only the
    /// immediate children of the directory are returned, otherwise everything
    /// below it is.
    fn list_contents<D>(&self, directory: D, recursive: bool) -> ListingFuture
    where
        D: AsRef<str>;

    /// Gets the attributes of the file at the given path.
    fn attributes<P>(&self, path: P) -> AttributesFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>;

    /// Gets the attributes of the file at the given path, including its mime
    /// type.
    fn mime_type<P>(&self, path: P) -> AttributesFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>,
    {
        self.attributes(path)
    }

    /// Gets the attributes of the file at the given path, including its last
    /// modified time.
    fn last_modified<P>(&self, path: P) -> AttributesFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>,
    {
        self.attributes(path)
    }

    /// Gets the attributes of the file at the given path, including its size.
    fn file_size<P>(&self, path: P) -> AttributesFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>,
    {
        self.attributes(path)
    }

    /// Gets the visibility of the file at the given path.
    fn visibility<P>(&self, path: P) -> AttributesFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>;

    /// Sets the visibility of the file at the given path.
    fn set_visibility<P>(&self, path: P, visibility: Visibility) -> OperationCompleteFuture
    where
        P: TryInto<ObjectPath>,
        P::Error: Into<StorageError>;
}
