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

//! A storage client that keeps every object in memory.
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use b2fs::*;

use crate::runner::SeedFile;

/// Clock used for uploads made during a test, in milliseconds.
const UPLOAD_CLOCK_START: u64 = 1_800_000_000_000;

#[derive(Debug, Default)]
struct MemoryState {
    objects: BTreeMap<String, (RemoteObject, Data)>,
    next_id: usize,
    clock: u64,
}

impl MemoryState {
    fn insert(&mut self, object: RemoteObject, data: Data) -> RemoteObject {
        self.objects
            .insert(object.name.to_string(), (object.clone(), data));
        object
    }

    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("mem_{}", self.next_id)
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryClient {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryClient {
    pub fn seeded(files: &[SeedFile]) -> MemoryClient {
        let client = MemoryClient::default();

        {
            let mut state = client.state.lock().unwrap();
            state.clock = UPLOAD_CLOCK_START;
            for file in files {
                let object = RemoteObject {
                    id: state.next_id(),
                    name: ObjectPath::new(&file.name).unwrap(),
                    size: file.data.len() as u64,
                    upload_timestamp: Some(file.upload_timestamp),
                    content_type: Some(file.content_type.clone()),
                };
                state.insert(object, file.data.clone());
            }
        }

        client
    }

    fn lookup(&self, path: &ObjectPath) -> StorageResult<(RemoteObject, Data)> {
        let state = self.state.lock().unwrap();
        match state.objects.get(path.as_str()) {
            Some(entry) => Ok(entry.clone()),
            None => Err(error::not_found::<StorageError>(path.clone(), None)),
        }
    }
}

impl StorageClient for MemoryClient {
    fn list_files(&self) -> ObjectListFuture {
        let state = self.state.lock().unwrap();
        let objects = state
            .objects
            .values()
            .map(|(object, _)| object.clone())
            .collect();
        ObjectListFuture::from_value(Ok(objects))
    }

    fn get_file(&self, path: ObjectPath) -> ObjectFuture {
        ObjectFuture::from_value(self.lookup(&path).map(|(object, _)| object))
    }

    fn upload(&self, path: ObjectPath, data: Data) -> ObjectFuture {
        let mut state = self.state.lock().unwrap();
        state.clock += 1000;

        let content_type = if path.file_name().ends_with(".txt") {
            "text/plain"
        } else {
            "application/octet-stream"
        };

        let object = RemoteObject {
            id: state.next_id(),
            name: path,
            size: data.len() as u64,
            upload_timestamp: Some(state.clock),
            content_type: Some(content_type.to_owned()),
        };

        ObjectFuture::from_value(Ok(state.insert(object, data)))
    }

    fn download(&self, id: &str) -> DataFuture {
        let state = self.state.lock().unwrap();
        let found = state
            .objects
            .values()
            .find(|(object, _)| object.id == id)
            .map(|(_, data)| data.clone());

        DataFuture::from_value(match found {
            Some(data) => Ok(data),
            None => Err(error::not_found::<StorageError>(ObjectPath::empty(), None)),
        })
    }

    fn download_stream(&self, path: ObjectPath) -> DataStreamFuture {
        let result = self.lookup(&path).map(|(_, data)| {
            let chunks: Vec<StorageResult<Data>> = data
                .chunks(1000)
                .map(|chunk| Ok(Data::copy_from_slice(chunk)))
                .collect();
            DataStream::from_values(chunks)
        });

        DataStreamFuture::from_value(result)
    }

    fn delete_file(&self, path: ObjectPath) -> OperationCompleteFuture {
        let mut state = self.state.lock().unwrap();
        let result = match state.objects.remove(path.as_str()) {
            Some(_) => Ok(()),
            None => Err(error::not_found::<StorageError>(path, None)),
        };

        OperationCompleteFuture::from_value(result)
    }
}
