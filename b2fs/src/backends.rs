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

//! Contains the storage client implementations.
//!
//! Each backend is a [`StorageClient`](../trait.StorageClient.html) for a
//! storage service. Wrap one in a [`B2Adapter`](../struct.B2Adapter.html) to
//! get a [`FilesystemAdapter`](../trait.FilesystemAdapter.html).
#[cfg(feature = "b2")]
pub mod b2;
