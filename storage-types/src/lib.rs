//! Wire types for the storage services that b2fs talks to.
pub mod b2;

/// JSON numbers as used by the storage APIs.
pub type JSInt = u64;
/// An arbitrary JSON object.
pub type JSMap = serde_json::Map<String, serde_json::Value>;
