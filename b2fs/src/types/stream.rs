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

//! A module with some useful tools for working with streams.
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{iter, Stream};

pub(crate) type StreamPoll<R> = Poll<Option<R>>;

pub(crate) type PinnedStream<R> = Pin<Box<dyn Stream<Item = R> + Send + 'static>>;

/// Wraps a stream of an unknown type into a concrete type.
pub struct WrappedStream<R>
where
    R: Send + 'static,
{
    base: PinnedStream<R>,
}

impl<R> WrappedStream<R>
where
    R: Send + 'static,
{
    /// Wraps an existing stream.
    pub fn from_stream<S>(base: S) -> WrappedStream<R>
    where
        S: Stream<Item = R> + Send + 'static,
    {
        WrappedStream {
            base: Box::pin(base),
        }
    }

    /// Creates a stream that returns the given items and then ends.
    pub fn from_values(values: Vec<R>) -> WrappedStream<R> {
        WrappedStream::from_stream(iter(values))
    }
}

impl<R> Stream for WrappedStream<R>
where
    R: Send + 'static,
{
    type Item = R;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context) -> StreamPoll<R> {
        self.base.as_mut().poll_next(cx)
    }
}
