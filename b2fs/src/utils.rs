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

//! A set of useful utilities for converting between the different asynchronous
//! types that this crate uses.
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{BufMut, BytesMut};
use futures::stream::{Stream, TryStreamExt};
use tokio::io::AsyncRead;
use tokio_util::io::poll_read_buf;

use crate::types::{Data, StorageError, StorageResult};

/// Converts an AsyncRead into a stream that emits [`Data`](../type.Data.html).
pub struct ReaderStream<R>
where
    R: AsyncRead,
{
    reader: Pin<Box<R>>,
    buffer: BytesMut,
    buffer_size: usize,
    done: bool,
}

impl<R> ReaderStream<R>
where
    R: AsyncRead,
{
    /// Creates a stream that emits [`Data`](../type.Data.html) from an `AsyncRead`.
    ///
    /// Each item holds at most `buffer_size` bytes. The stream ends when the
    /// reader reports end of file. The read buffer is only replaced once a
    /// chunk has been split off it, polls that find the reader pending reuse
    /// the same buffer.
    pub fn stream(reader: R, buffer_size: usize) -> ReaderStream<R> {
        ReaderStream {
            reader: Box::pin(reader),
            buffer: BytesMut::with_capacity(buffer_size),
            buffer_size: buffer_size.max(1),
            done: false,
        }
    }

    fn inner_poll(&mut self, cx: &mut Context) -> Poll<Option<io::Result<Data>>> {
        if self.done {
            return Poll::Ready(None);
        }

        if self.buffer.capacity() - self.buffer.len() < self.buffer_size {
            self.buffer.reserve(self.buffer_size);
        }

        let mut target = (&mut self.buffer).limit(self.buffer_size);
        match poll_read_buf(self.reader.as_mut(), cx, &mut target) {
            Poll::Ready(Ok(0)) => {
                self.done = true;
                Poll::Ready(None)
            }
            Poll::Ready(Ok(size)) => Poll::Ready(Some(Ok(self.buffer.split_to(size).freeze()))),
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(e)) => {
                self.done = true;
                Poll::Ready(Some(Err(e)))
            }
        }
    }
}

impl<R> Stream for ReaderStream<R>
where
    R: AsyncRead,
{
    type Item = io::Result<Data>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context) -> Poll<Option<io::Result<Data>>> {
        self.inner_poll(cx)
    }
}

/// Collects an entire stream of data into a single buffer.
///
/// The first error from the stream is returned and nothing more is read.
pub async fn collect_data<S, I, E>(stream: S) -> StorageResult<Data>
where
    S: Stream<Item = Result<I, E>> + Send + 'static,
    I: Into<Data> + Send + 'static,
    E: Into<StorageError> + Send + 'static,
{
    let buffer = stream
        .map_err(Into::<StorageError>::into)
        .try_fold(BytesMut::new(), |mut buffer, chunk| {
            let chunk: Data = chunk.into();
            buffer.extend_from_slice(&chunk);
            futures::future::ready(Ok::<_, StorageError>(buffer))
        })
        .await?;

    Ok(buffer.freeze())
}
