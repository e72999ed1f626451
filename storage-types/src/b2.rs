//! Types for version 2 of the Backblaze B2 native API.
pub mod v2 {
    pub mod requests;
    pub mod responses;

    use std::str::Utf8Error;

    use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
    use serde::{Deserialize, Serialize};

    pub use crate::JSInt as Int;
    pub use crate::JSMap as Map;

    pub const B2_HEADER_FILE_NAME: &str = "X-Bz-File-Name";
    pub const B2_HEADER_CONTENT_SHA1: &str = "X-Bz-Content-Sha1";

    /// Asks B2 to choose a content type from the file extension.
    pub const CONTENT_TYPE_AUTO: &str = "b2/x-auto";

    /// Characters that B2 accepts unencoded in file names.
    const ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
        .remove(b'/')
        .remove(b'.')
        .remove(b'_')
        .remove(b'-')
        .remove(b'~')
        .remove(b'!')
        .remove(b'$')
        .remove(b'\'')
        .remove(b'(')
        .remove(b')')
        .remove(b'*')
        .remove(b';')
        .remove(b'=')
        .remove(b':')
        .remove(b'@');

    /// Encodes a file name for use in a header or url.
    pub fn percent_encode(value: &str) -> String {
        utf8_percent_encode(value, &ENCODE_SET).collect()
    }

    /// Decodes a file name from a header or url. `+` decodes to a space.
    pub fn percent_decode(value: &str) -> Result<String, Utf8Error> {
        let value = value.replace('+', " ");
        Ok(percent_decode_str(&value).decode_utf8()?.into_owned())
    }

    /// What a listed file entry represents.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum FileAction {
        Start,
        Upload,
        Hide,
        Folder,
        #[serde(other)]
        Unknown,
    }

    /// The access type of a bucket.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum BucketType {
        #[serde(rename = "allPublic")]
        Public,
        #[serde(rename = "allPrivate")]
        Private,
        #[serde(rename = "snapshot")]
        Snapshot,
        #[serde(other)]
        Unknown,
    }

    impl BucketType {
        fn from_name(name: &str) -> BucketType {
            match name {
                "allPublic" => BucketType::Public,
                "allPrivate" => BucketType::Private,
                "snapshot" => BucketType::Snapshot,
                _ => BucketType::Unknown,
            }
        }

        fn name(self) -> &'static str {
            match self {
                BucketType::Public => "allPublic",
                BucketType::Private => "allPrivate",
                BucketType::Snapshot => "snapshot",
                BucketType::Unknown => "unknown",
            }
        }
    }

    /// The bucket types a `b2_list_buckets` call filters on.
    ///
    /// On the wire this is an optional array of type names where `"all"`
    /// means every known type.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(from = "Option<Vec<String>>", into = "Option<Vec<String>>")]
    pub enum BucketTypes {
        /// No filter was given.
        #[default]
        Any,
        All,
        Only(Vec<BucketType>),
    }

    impl BucketTypes {
        pub fn includes(&self, bucket_type: BucketType) -> bool {
            match self {
                BucketTypes::Any => true,
                BucketTypes::All => bucket_type != BucketType::Unknown,
                BucketTypes::Only(types) => types.contains(&bucket_type),
            }
        }
    }

    impl From<Option<Vec<String>>> for BucketTypes {
        fn from(names: Option<Vec<String>>) -> BucketTypes {
            match names {
                None => BucketTypes::Any,
                Some(names) if names.is_empty() => BucketTypes::Any,
                Some(names) if names.iter().any(|n| n == "all") => BucketTypes::All,
                Some(names) => {
                    BucketTypes::Only(names.iter().map(|n| BucketType::from_name(n)).collect())
                }
            }
        }
    }

    impl From<BucketTypes> for Option<Vec<String>> {
        fn from(types: BucketTypes) -> Option<Vec<String>> {
            match types {
                BucketTypes::Any => None,
                BucketTypes::All => Some(vec![String::from("all")]),
                BucketTypes::Only(types) => {
                    Some(types.into_iter().map(|t| t.name().to_owned()).collect())
                }
            }
        }
    }

}
