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

//! A default executor to use when running futures from this crate.
//!
//! The B2 backend relies on tokio's reactor so its futures must be polled from
//! within a tokio runtime. This exposes a way to do that for simple callers.
use std::future::Future;
use std::io;

use futures::channel::oneshot;
use tokio::runtime::Builder;

/// Spawns a future on the existing runtime returning its result.
///
/// Must be called from within a tokio runtime.
pub fn spawn<F>(future: F) -> impl Future<Output = Result<F::Output, oneshot::Canceled>>
where
    F: Future + Send + 'static,
    F::Output: Send,
{
    let (sender, receiver) = oneshot::channel::<F::Output>();

    tokio::spawn(async move {
        // The receiver may have been dropped, nothing is waiting then.
        let _ = sender.send(future.await);
    });

    receiver
}

/// Runs a future to completion on a new tokio runtime and returns the result.
///
/// This blocks the calling thread.
pub fn run<F>(future: F) -> io::Result<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send,
{
    let runtime = Builder::new_multi_thread().enable_all().build()?;
    Ok(runtime.block_on(future))
}
