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

//! Errors returned by the adapter and the storage clients it wraps.
use std::convert::Infallible;
use std::error;
use std::fmt;
use std::io;

use log::error;

use super::ObjectPath;

/// The kind of an [`StorageError`](struct.StorageError.html).
#[derive(Clone, Debug, PartialEq)]
pub enum StorageErrorKind {
    /// An error occurred while parsing an ObjectPath.
    ObjectPathParse(String),
    /// An error returned when attempting to access an invalid path.
    InvalidPath(ObjectPath),
    /// The object requested was not found.
    NotFound(ObjectPath),
    /// A directory listing was requested with a malformed directory.
    InvalidQuery(String),
    /// The operation is not supported by this storage.
    Unsupported,
    /// The operation was cancelled.
    Cancelled,
    /// The connection to storage failed.
    ConnectionFailed,
    /// The connection to storage was closed.
    ConnectionClosed,
    /// The service returned some invalid data.
    InvalidData,
    /// The credentials supplied were denied access.
    AccessDenied,
    /// Access has expired. Reconnecting may solve the issue.
    AccessExpired,
    /// An error returned if the configuration for a client was invalid
    /// somehow.
    InvalidSettings,
    /// An internal failure, please report a bug!
    InternalError,
    /// Any other type of error (normally will have an inner error).
    Other,
}

/// Errors hit while interacting with storage. Can be converted to and from an
/// `io::Error`.
#[derive(Debug)]
pub struct StorageError {
    kind: StorageErrorKind,
    detail: String,
    inner: Option<Box<dyn error::Error + Send + Sync>>,
}

impl StorageError {
    /// Creates a new `StorageError`.
    pub fn new(kind: StorageErrorKind, detail: &str) -> StorageError {
        StorageError {
            kind,
            detail: detail.to_owned(),
            inner: None,
        }
    }

    /// Creates a new `StorageError` wrapping an inner error.
    pub fn from_inner<E>(kind: StorageErrorKind, detail: &str, inner: E) -> StorageError
    where
        E: 'static + error::Error + Send + Sync,
    {
        StorageError {
            kind,
            detail: detail.to_owned(),
            inner: Some(Box::new(inner)),
        }
    }

    /// Returns the storage error kind.
    pub fn kind(&self) -> StorageErrorKind {
        self.kind.clone()
    }

    /// Returns true if this error means that nothing exists at a path.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, StorageErrorKind::NotFound(_))
    }
}

impl error::Error for StorageError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.inner
            .as_ref()
            .map(|e| e.as_ref() as &(dyn error::Error + 'static))
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let message = match &self.kind {
            StorageErrorKind::ObjectPathParse(s) => {
                format!("Failed to parse '{}'. {}", s, self.detail)
            }
            StorageErrorKind::InvalidPath(p) => format!("The path '{}' was invalid", p),
            StorageErrorKind::NotFound(p) => format!("The path '{}' was not found", p),
            StorageErrorKind::InvalidQuery(d) => {
                format!("Cannot list the directory '{}'. {}", d, self.detail)
            }
            kind => {
                let summary = match kind {
                    StorageErrorKind::Unsupported => "The operation is not supported",
                    StorageErrorKind::Cancelled => "The operation was cancelled",
                    StorageErrorKind::ConnectionFailed => "The storage connection failed",
                    StorageErrorKind::ConnectionClosed => "The storage connection was closed",
                    StorageErrorKind::InvalidData => "Invalid data",
                    StorageErrorKind::AccessDenied => "Access was denied",
                    StorageErrorKind::AccessExpired => "Access has expired",
                    StorageErrorKind::InvalidSettings => "Some of the settings were invalid",
                    StorageErrorKind::InternalError => "An internal error occurred",
                    _ => "An unknown error occurred",
                };
                format!("{}: {}", summary, self.detail)
            }
        };

        f.pad(&message)
    }
}

impl From<StorageError> for io::Error {
    fn from(error: StorageError) -> io::Error {
        let kind = match error.kind() {
            StorageErrorKind::ObjectPathParse(_) => io::ErrorKind::InvalidData,
            StorageErrorKind::InvalidPath(_) => io::ErrorKind::InvalidData,
            StorageErrorKind::NotFound(_) => io::ErrorKind::NotFound,
            StorageErrorKind::InvalidQuery(_) => io::ErrorKind::InvalidInput,
            StorageErrorKind::Unsupported => io::ErrorKind::Unsupported,
            StorageErrorKind::InvalidData => io::ErrorKind::InvalidData,
            StorageErrorKind::InvalidSettings => io::ErrorKind::InvalidInput,
            StorageErrorKind::Cancelled => io::ErrorKind::ConnectionAborted,
            StorageErrorKind::ConnectionFailed => io::ErrorKind::ConnectionRefused,
            StorageErrorKind::ConnectionClosed => io::ErrorKind::NotConnected,
            StorageErrorKind::InternalError => io::ErrorKind::Other,
            StorageErrorKind::Other => io::ErrorKind::Other,
            StorageErrorKind::AccessDenied => io::ErrorKind::PermissionDenied,
            StorageErrorKind::AccessExpired => io::ErrorKind::PermissionDenied,
        };

        io::Error::new(kind, error)
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> StorageError {
        let kind = match error.kind() {
            io::ErrorKind::NotFound => StorageErrorKind::NotFound(ObjectPath::empty()),
            io::ErrorKind::PermissionDenied => StorageErrorKind::AccessDenied,
            io::ErrorKind::ConnectionRefused => StorageErrorKind::ConnectionFailed,
            io::ErrorKind::ConnectionReset => StorageErrorKind::ConnectionClosed,
            io::ErrorKind::ConnectionAborted => StorageErrorKind::ConnectionFailed,
            io::ErrorKind::NotConnected => StorageErrorKind::ConnectionClosed,
            io::ErrorKind::BrokenPipe => StorageErrorKind::ConnectionClosed,
            io::ErrorKind::InvalidInput => StorageErrorKind::InvalidData,
            io::ErrorKind::InvalidData => StorageErrorKind::InvalidData,
            io::ErrorKind::Unsupported => StorageErrorKind::Unsupported,
            _ => StorageErrorKind::Other,
        };

        StorageError {
            kind,
            detail: error.to_string(),
            inner: Some(Box::new(error)),
        }
    }
}

impl From<Infallible> for StorageError {
    fn from(error: Infallible) -> StorageError {
        match error {}
    }
}

/// The result type used throughout this crate.
pub type StorageResult<O> = Result<O, StorageError>;

/// An error that occurs while copying or moving a file.
#[derive(Debug)]
pub enum TransferError {
    /// An error that came from the source of the transfer.
    SourceError(StorageError),
    /// An error that occured when writing to the target.
    TargetError(StorageError),
}

impl TransferError {
    /// Gets the underlying storage error regardless of which side it came
    /// from.
    pub fn storage_error(&self) -> &StorageError {
        match self {
            TransferError::SourceError(e) => e,
            TransferError::TargetError(e) => e,
        }
    }
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TransferError::SourceError(e) => write!(f, "Failed reading the source: {}", e),
            TransferError::TargetError(e) => write!(f, "Failed writing the target: {}", e),
        }
    }
}

impl error::Error for TransferError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(self.storage_error())
    }
}

/// Creates an error for a path that could not be parsed.
pub fn parse_error(path: &str, message: &str) -> StorageError {
    build::<StorageError>(StorageErrorKind::ObjectPathParse(path.to_owned()), message, None)
}

/// Creates an error for a path that cannot be used.
pub fn invalid_path(path: ObjectPath, detail: &str) -> StorageError {
    build::<StorageError>(StorageErrorKind::InvalidPath(path), detail, None)
}

/// Creates an error for a malformed listing directory.
pub fn invalid_query(directory: &str, detail: &str) -> StorageError {
    build::<StorageError>(StorageErrorKind::InvalidQuery(directory.to_owned()), detail, None)
}

/// Creates an error for an operation the storage cannot perform.
pub fn unsupported(detail: &str) -> StorageError {
    build::<StorageError>(StorageErrorKind::Unsupported, detail, None)
}

fn build<E>(kind: StorageErrorKind, detail: &str, error: Option<E>) -> StorageError
where
    E: 'static + error::Error + Send + Sync,
{
    StorageError {
        kind,
        detail: detail.to_owned(),
        inner: error.map(|e| Box::new(e) as _),
    }
}

/// Creates an error for a path where nothing exists.
pub fn not_found<E>(path: ObjectPath, error: Option<E>) -> StorageError
where
    E: 'static + error::Error + Send + Sync,
{
    build(StorageErrorKind::NotFound(path), "", error)
}

macro_rules! error_constructor {
    ($(#[$attr:meta])* $name:ident => $kind:ident) => {
        $(#[$attr])*
        pub fn $name<E>(detail: &str, error: Option<E>) -> StorageError
        where
            E: 'static + error::Error + Send + Sync,
        {
            build(StorageErrorKind::$kind, detail, error)
        }
    };
}

error_constructor!(
    /// Creates an error for credentials that storage refused.
    access_denied => AccessDenied
);
error_constructor!(
    /// Creates an error for a session that storage no longer accepts.
    access_expired => AccessExpired
);
error_constructor!(
    /// Creates an error for a client that was configured wrongly.
    invalid_settings => InvalidSettings
);
error_constructor!(
    /// Creates an error for data the service should never have returned.
    invalid_data => InvalidData
);
error_constructor!(
    /// Creates an error for an operation abandoned before it finished.
    cancelled => Cancelled
);
error_constructor!(
    /// Creates an error for a connection that could not be made.
    connection_failed => ConnectionFailed
);
error_constructor!(
    /// Creates an error for a connection that dropped part way through.
    connection_closed => ConnectionClosed
);
error_constructor!(
    /// Creates an error of an unknown kind.
    other_error => Other
);

/// Creates an error for a bug in this crate. These are always logged.
pub fn internal_error<E>(detail: &str, error: Option<E>) -> StorageError
where
    E: 'static + error::Error + Send + Sync,
{
    error!("An internal error occurred: {}", detail);
    build(StorageErrorKind::InternalError, detail, error)
}
