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

use std::fmt;
use std::io;
use std::path::PathBuf;

use futures::future::BoxFuture;
use futures::stream::StreamExt;
use log::debug;
use tokio::fs::File;
use tokio::io::{stdin, stdout, AsyncWriteExt};

use b2fs::backends::b2::ConnectFuture;
use b2fs::listing::ListingQuery;
use b2fs::utils::ReaderStream;
use b2fs::{FileAttributes, FilesystemAdapter, StorageError, TransferError};

const BUFFER_SIZE: usize = 1_000_000;

/// A failed command, reduced to the message shown to the user.
#[derive(Debug)]
pub struct ErrorResult(String);

impl fmt::Display for ErrorResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<StorageError> for ErrorResult {
    fn from(error: StorageError) -> ErrorResult {
        ErrorResult(error.to_string())
    }
}

impl From<io::Error> for ErrorResult {
    fn from(error: io::Error) -> ErrorResult {
        ErrorResult(format!("Local I/O failed: {}", error))
    }
}

impl From<TransferError> for ErrorResult {
    fn from(error: TransferError) -> ErrorResult {
        let (side, inner) = match error {
            TransferError::SourceError(e) => ("Source", e),
            TransferError::TargetError(e) => ("Target", e),
        };
        ErrorResult(format!("{}: {}", side, inner))
    }
}

pub type CommandFuture = BoxFuture<'static, Result<(), ErrorResult>>;

fn print_attributes(attributes: &FileAttributes) {
    let timestamp = match attributes.timestamp {
        Some(t) => t.to_string(),
        None => String::from("-"),
    };

    println!(
        "{:10} {:>12} {:24} {}",
        timestamp,
        attributes.size,
        attributes.mime_type.as_deref().unwrap_or("-"),
        attributes.path
    );
}

pub fn ls(connect: ConnectFuture, directory: Option<String>, recursive: bool) -> CommandFuture {
    Box::pin(async move {
        let query = ListingQuery::from_optional(directory.as_deref(), recursive)?;
        let fs = connect.await?;
        let listing = fs
            .list_contents(query.directory(), query.is_recursive())
            .await?;
        debug!("Listed {} files in '{}'.", listing.len(), query.directory());

        for attributes in listing.iter() {
            print_attributes(attributes);
        }
        Ok(())
    })
}

pub fn cat(connect: ConnectFuture, path: String) -> CommandFuture {
    Box::pin(async move {
        let fs = connect.await?;

        let mut stream = fs.read_stream(path).await?;
        let mut stdout = stdout();
        while let Some(result) = stream.next().await {
            let data = result?;
            stdout.write_all(&data).await?;
        }
        stdout.flush().await?;
        Ok(())
    })
}

pub fn put(connect: ConnectFuture, path: String, file: Option<PathBuf>) -> CommandFuture {
    Box::pin(async move {
        let fs = connect.await?;

        let attributes = match file {
            Some(local) => {
                let reader = File::open(&local).await?;
                fs.write_stream(path, ReaderStream::stream(reader, BUFFER_SIZE))
                    .await?
            }
            None => {
                fs.write_stream(path, ReaderStream::stream(stdin(), BUFFER_SIZE))
                    .await?
            }
        };

        print_attributes(&attributes);
        Ok(())
    })
}

pub fn rm(connect: ConnectFuture, path: String) -> CommandFuture {
    Box::pin(async move {
        let fs = connect.await?;
        Ok(fs.delete(path).await?)
    })
}

pub fn cp(connect: ConnectFuture, source: String, target: String) -> CommandFuture {
    Box::pin(async move {
        let fs = connect.await?;
        let attributes = fs.copy(source, target).await?;
        print_attributes(&attributes);
        Ok(())
    })
}

pub fn mv(connect: ConnectFuture, source: String, target: String) -> CommandFuture {
    Box::pin(async move {
        let fs = connect.await?;
        Ok(fs.move_file(source, target).await?)
    })
}

pub fn stat(connect: ConnectFuture, path: String) -> CommandFuture {
    Box::pin(async move {
        let fs = connect.await?;
        let attributes = fs.attributes(path).await?;
        print_attributes(&attributes);
        Ok(())
    })
}

pub fn mkdir(connect: ConnectFuture, path: String) -> CommandFuture {
    Box::pin(async move {
        let fs = connect.await?;
        fs.create_directory(path).await?;
        Ok(())
    })
}

pub fn rmdir(connect: ConnectFuture, path: String) -> CommandFuture {
    Box::pin(async move {
        let fs = connect.await?;
        Ok(fs.delete_directory(path).await?)
    })
}

pub fn exists(connect: ConnectFuture, path: String) -> CommandFuture {
    Box::pin(async move {
        let fs = connect.await?;
        report_exists(&fs, &path).await
    })
}

async fn report_exists<F: FilesystemAdapter>(fs: &F, path: &str) -> Result<(), ErrorResult> {
    // Directories are plain objects in B2 so one lookup covers both.
    if fs.file_exists(path).await? {
        println!("exists");
        Ok(())
    } else {
        Err(ErrorResult(format!("Nothing exists at '{}'.", path)))
    }
}
