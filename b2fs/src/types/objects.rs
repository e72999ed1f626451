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

//! Object types.

use std::cmp::{Ordering, PartialOrd};
use std::fmt;

use super::ObjectPath;

const MILLIS_PER_SECOND: u64 = 1000;

/// An object's type.
///
/// B2 only stores files. Directories are never materialized, they are only
/// inferred from shared prefixes when listing.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum ObjectType {
    /// A regular file.
    File,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ObjectType::File => f.pad("file"),
        }
    }
}

/// Who can read a file.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Visibility {
    /// Anyone may read the file.
    Public,
    /// Only authorized clients may read the file.
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Visibility::Public => f.pad("public"),
            Visibility::Private => f.pad("private"),
        }
    }
}

/// An object as reported by a [`StorageClient`](trait.StorageClient.html).
///
/// The adapter never modifies these, it only projects them into
/// [`FileAttributes`](struct.FileAttributes.html).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteObject {
    /// The storage specific identifier, used for downloads.
    pub id: String,
    /// The full key of the object.
    pub name: ObjectPath,
    /// The size of the object in bytes.
    pub size: u64,
    /// When the object was uploaded, in milliseconds since the epoch.
    pub upload_timestamp: Option<u64>,
    /// The object's content type if known.
    pub content_type: Option<String>,
}

/// The normalized attributes of a file, as returned to filesystem callers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileAttributes {
    /// Always [`File`](enum.ObjectType.html#variant.File).
    pub object_type: ObjectType,
    /// The file's path.
    pub path: ObjectPath,
    /// The file's size in bytes.
    pub size: u64,
    /// When the file was last modified, in seconds since the epoch.
    pub timestamp: Option<u64>,
    /// The file's mime type if known.
    pub mime_type: Option<String>,
}

impl From<&RemoteObject> for FileAttributes {
    fn from(object: &RemoteObject) -> FileAttributes {
        FileAttributes {
            object_type: ObjectType::File,
            path: object.name.clone(),
            size: object.size,
            timestamp: object.upload_timestamp.map(|ms| ms / MILLIS_PER_SECOND),
            mime_type: object.content_type.clone(),
        }
    }
}

impl From<RemoteObject> for FileAttributes {
    fn from(object: RemoteObject) -> FileAttributes {
        FileAttributes {
            object_type: ObjectType::File,
            path: object.name,
            size: object.size,
            timestamp: object.upload_timestamp.map(|ms| ms / MILLIS_PER_SECOND),
            mime_type: object.content_type,
        }
    }
}

impl PartialOrd for FileAttributes {
    fn partial_cmp(&self, other: &FileAttributes) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FileAttributes {
    fn cmp(&self, other: &FileAttributes) -> Ordering {
        let order = self.path.cmp(&other.path);
        if order != Ordering::Equal {
            return order;
        }

        let order = self.size.cmp(&other.size);
        if order != Ordering::Equal {
            return order;
        }

        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.mime_type.cmp(&other.mime_type))
    }
}
