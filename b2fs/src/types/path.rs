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

//! The [`ObjectPath`](struct.ObjectPath.html) type, used for identifying objects in storage.
use std::convert::TryFrom;
use std::fmt;

use super::error;

/// The separator between the parts of a path.
pub const SEPARATOR: char = '/';

/// A path in storage.
///
/// B2 is a simple key -> data store with the key being any string and so an
/// ObjectPath is basically just a thin wrapper around a string.
///
/// The character `/` in a path is used to represent the directory separator.
/// There are no real directories though, only keys that share a prefix.
///
/// Paths are relative to the root of the bucket and so must not start with a
/// `/` character. The empty path is the root.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectPath {
    path: String,
}

impl ObjectPath {
    /// Parses a string into a new `ObjectPath`.
    pub fn new<S: AsRef<str>>(from: S) -> Result<ObjectPath, error::StorageError> {
        let path = from.as_ref();
        if path.starts_with(SEPARATOR) {
            Err(error::parse_error(
                path,
                "ObjectPaths cannot start with the '/' character.",
            ))
        } else {
            Ok(ObjectPath {
                path: path.to_owned(),
            })
        }
    }

    /// The root of the bucket.
    pub fn empty() -> ObjectPath {
        Default::default()
    }

    /// Checks whether this is the root path.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// The full key.
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Splits this path into directory parts.
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        self.path.split(SEPARATOR)
    }

    /// The last part of the path.
    pub fn file_name(&self) -> &str {
        match self.path.rfind(SEPARATOR) {
            Some(pos) => &self.path[pos + 1..],
            None => &self.path,
        }
    }

    /// Pushes a new directory part to the end of this path.
    pub fn push_part(&mut self, part: &str) {
        if !self.path.is_empty() {
            self.path.push(SEPARATOR);
        }
        self.path.push_str(part);
    }

    /// Pops the last directory part from the end of this path.
    pub fn pop_part(&mut self) {
        if !self.path.is_empty() {
            match self.path.rfind(SEPARATOR) {
                Some(pos) => self.path.truncate(pos),
                None => self.path.clear(),
            }
        }
    }

    /// Checks whether this path is prefixed by the given path.
    pub fn starts_with(&self, other: &ObjectPath) -> bool {
        self.path.starts_with(&other.path)
    }
}

impl AsRef<str> for ObjectPath {
    fn as_ref(&self) -> &str {
        &self.path
    }
}

impl TryFrom<&str> for ObjectPath {
    type Error = error::StorageError;

    fn try_from(s: &str) -> Result<ObjectPath, error::StorageError> {
        ObjectPath::new(s)
    }
}

impl TryFrom<String> for ObjectPath {
    type Error = error::StorageError;

    fn try_from(s: String) -> Result<ObjectPath, error::StorageError> {
        ObjectPath::new(s)
    }
}

impl TryFrom<&String> for ObjectPath {
    type Error = error::StorageError;

    fn try_from(s: &String) -> Result<ObjectPath, error::StorageError> {
        ObjectPath::new(s)
    }
}

impl From<ObjectPath> for String {
    fn from(path: ObjectPath) -> String {
        path.path
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(&self.path)
    }
}
