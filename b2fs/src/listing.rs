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

//! Emulates hierarchical directory listings over a flat key space.
//!
//! B2 has no directories. A bucket holds a flat set of keys and a "directory"
//! is just a prefix that some of those keys share. To list a directory the
//! entire flat listing is filtered down to the keys that fall under the
//! directory's prefix, either at any depth or only as immediate children.
//!
//! Matching is done with literal prefix and separator checks so no character
//! in a directory name is ever treated specially.
use log::debug;

use crate::types::error;
use crate::types::*;

/// The parameters for a single directory listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingQuery {
    directory: String,
    recursive: bool,
}

impl ListingQuery {
    /// Creates a query for the given directory.
    ///
    /// The empty string is the root of the bucket. Directories must not
    /// start or end with a `/` character, anything else fails with an
    /// [`InvalidQuery`](enum.StorageErrorKind.html#variant.InvalidQuery)
    /// error.
    pub fn new<D: AsRef<str>>(directory: D, recursive: bool) -> StorageResult<ListingQuery> {
        let directory = directory.as_ref();

        if directory.starts_with(SEPARATOR) {
            return Err(error::invalid_query(
                directory,
                "Directories must not start with '/'.",
            ));
        }

        if directory.ends_with(SEPARATOR) {
            return Err(error::invalid_query(
                directory,
                "Directories must not end with '/'.",
            ));
        }

        Ok(ListingQuery {
            directory: directory.to_owned(),
            recursive,
        })
    }

    /// Creates a query for a directory that may be missing, treating a missing
    /// directory as the root.
    pub fn from_optional(directory: Option<&str>, recursive: bool) -> StorageResult<ListingQuery> {
        ListingQuery::new(directory.unwrap_or(""), recursive)
    }

    /// A query for the root of the bucket.
    pub fn root(recursive: bool) -> ListingQuery {
        ListingQuery {
            directory: String::new(),
            recursive,
        }
    }

    /// The directory being listed.
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Whether objects at any depth are included.
    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// Checks whether an object name belongs in this listing.
    pub fn matches(&self, name: &str) -> bool {
        match (self.recursive, self.directory.is_empty()) {
            (true, true) => true,
            (true, false) => self.strip_directory(name).is_some(),
            (false, true) => !name.contains(SEPARATOR),
            (false, false) => match self.strip_directory(name) {
                Some(rest) => !rest.contains(SEPARATOR),
                None => false,
            },
        }
    }

    /// Returns what follows `directory/` in the name, if it starts with that.
    fn strip_directory<'a>(&self, name: &'a str) -> Option<&'a str> {
        name.strip_prefix(self.directory.as_str())?
            .strip_prefix(SEPARATOR)
    }
}

/// Filters a flat listing down to the objects that belong to the query's
/// directory.
///
/// The order of the input is preserved and nothing is added.
pub fn filter_objects<I>(objects: I, query: &ListingQuery) -> Vec<RemoteObject>
where
    I: IntoIterator<Item = RemoteObject>,
{
    let mut total: usize = 0;
    let matched: Vec<RemoteObject> = objects
        .into_iter()
        .inspect(|_| total += 1)
        .filter(|object| query.matches(object.name.as_str()))
        .collect();

    debug!(
        "Listing '{}' (recursive: {}) matched {} of {} objects",
        query.directory,
        query.recursive,
        matched.len(),
        total
    );

    matched
}

/// Filters a flat listing and normalizes the survivors.
pub fn list_attributes<I>(objects: I, query: &ListingQuery) -> Vec<FileAttributes>
where
    I: IntoIterator<Item = RemoteObject>,
{
    filter_objects(objects, query)
        .into_iter()
        .map(FileAttributes::from)
        .collect()
}
