// Copyright 2025 eraflo
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

//! Defines the asynchronous map future and the mapped range it yields.

use crate::graphics::error::{GraphicsError, GraphicsResult};
use crate::graphics::traits::MappableBuffer;
use crate::sync::Completion;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

enum MapState {
    Ready(Option<GraphicsResult<MappedRange>>),
    Pending {
        completion: Completion<GraphicsResult<()>>,
        buffer: Arc<dyn MappableBuffer>,
        offset: u64,
        len: u64,
    },
}

/// A pending buffer map.
///
/// The driver only reports map completion while the device is polled.
/// Awaiting the future polls the device every time it is woken;
/// [`wait`](Self::wait) polls it on the calling thread until the map
/// resolves or the timeout expires.
pub struct MapFuture {
    state: MapState,
}

impl MapFuture {
    pub(crate) fn pending(
        completion: Completion<GraphicsResult<()>>,
        buffer: Arc<dyn MappableBuffer>,
        offset: u64,
        len: u64,
    ) -> Self {
        Self {
            state: MapState::Pending {
                completion,
                buffer,
                offset,
                len,
            },
        }
    }

    pub(crate) fn failed(error: GraphicsError) -> Self {
        Self {
            state: MapState::Ready(Some(Err(error))),
        }
    }

    /// Blocks until the map resolves, pumping the device meanwhile.
    ///
    /// ## Errors
    /// * `Timeout` if the driver did not answer within `timeout`. The map is
    ///   not cancelled.
    /// * Whatever error the driver reported.
    pub fn wait(self, timeout: Duration) -> GraphicsResult<MappedRange> {
        match self.state {
            MapState::Ready(result) => result.unwrap_or_else(|| Err(consumed())),
            MapState::Pending {
                completion,
                buffer,
                offset,
                len,
            } => {
                let start = Instant::now();
                match completion.wait_with_pump(timeout, || buffer.poll()) {
                    Some(Ok(())) => Ok(MappedRange {
                        buffer,
                        offset,
                        len,
                    }),
                    Some(Err(e)) => Err(e),
                    None if start.elapsed() >= timeout => {
                        log::warn!(
                            "MapFuture: map of '{}' did not resolve within {} ms",
                            buffer.label().unwrap_or("<unnamed>"),
                            timeout.as_millis()
                        );
                        Err(GraphicsError::Timeout {
                            operation: "buffer map",
                            timeout_ms: timeout.as_millis() as u64,
                        })
                    }
                    None => Err(GraphicsError::Backend(
                        "buffer map callback was dropped without a result".to_owned(),
                    )),
                }
            }
        }
    }
}

fn consumed() -> GraphicsError {
    GraphicsError::state("map future polled after completion")
}

impl Future for MapFuture {
    type Output = GraphicsResult<MappedRange>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            MapState::Ready(result) => Poll::Ready(result.take().unwrap_or_else(|| Err(consumed()))),
            MapState::Pending {
                completion,
                buffer,
                offset,
                len,
            } => {
                buffer.poll();
                match Pin::new(completion).poll(cx) {
                    Poll::Ready(outcome) => {
                        let result = match outcome {
                            Some(Ok(())) => Ok(MappedRange {
                                buffer: Arc::clone(buffer),
                                offset: *offset,
                                len: *len,
                            }),
                            Some(Err(e)) => Err(e),
                            None => Err(GraphicsError::Backend(
                                "buffer map callback was dropped without a result".to_owned(),
                            )),
                        };
                        this.state = MapState::Ready(None);
                        Poll::Ready(result)
                    }
                    Poll::Pending => {
                        // The driver needs polling to make progress, so keep
                        // the executor coming back.
                        cx.waker().wake_by_ref();
                        Poll::Pending
                    }
                }
            }
        }
    }
}

/// A host-readable range of a mapped buffer.
///
/// The range stays valid until the buffer is unmapped.
pub struct MappedRange {
    buffer: Arc<dyn MappableBuffer>,
    offset: u64,
    len: u64,
}

impl std::fmt::Debug for MappedRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedRange")
            .field("buffer", &self.buffer.label())
            .field("offset", &self.offset)
            .field("len", &self.len)
            .finish()
    }
}

impl MappedRange {
    /// Byte offset of the range in the buffer.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Length of the range.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the range is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copies the whole range into a new vector.
    pub fn to_vec(&self) -> GraphicsResult<Vec<u8>> {
        let mut out = vec![0u8; self.len as usize];
        self.buffer.read_mapped(self.offset, &mut out)?;
        Ok(out)
    }

    /// Copies `out.len()` bytes starting `relative_offset` bytes into the
    /// range.
    pub fn read_into(&self, relative_offset: u64, out: &mut [u8]) -> GraphicsResult<()> {
        if relative_offset
            .checked_add(out.len() as u64)
            .filter(|end| *end <= self.len)
            .is_none()
        {
            return Err(GraphicsError::invalid(format!(
                "read of {} bytes at {} exceeds a {} byte mapped range",
                out.len(),
                relative_offset,
                self.len
            )));
        }
        self.buffer.read_mapped(self.offset + relative_offset, out)
    }
}
