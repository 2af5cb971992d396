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

//! Defines the one-shot completion primitive used at every async boundary.
//!
//! Adapter requests, device requests, buffer mapping and queue-idle waits all
//! follow the same shape: the backend hands a callback to the driver, the
//! callback resolves a [`Completer`], and the caller blocks on the matching
//! [`Completion`] with a timeout while something pumps driver events. An
//! expired wait does not cancel the operation; a result arriving after the
//! waiter gave up is simply dropped.

use parking_lot::{Condvar, Mutex};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Interval between two event pumps while a caller waits.
pub const PUMP_INTERVAL: Duration = Duration::from_millis(1);

struct State<T> {
    value: Option<T>,
    resolved: bool,
    abandoned: bool,
    waker: Option<Waker>,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    ready: Condvar,
}

/// The receiving half of a one-shot result.
///
/// It can be waited on synchronously (with or without an event pump) or
/// awaited as a [`Future`]. The future resolves to `None` if the completer
/// was dropped without producing a value.
pub struct Completion<T> {
    shared: Arc<Shared<T>>,
}

/// The sending half of a one-shot result, usually moved into a driver callback.
pub struct Completer<T> {
    shared: Arc<Shared<T>>,
    sent: bool,
}

/// Creates a linked completer/completion pair.
pub fn completion<T>() -> (Completer<T>, Completion<T>) {
    let shared = Arc::new(Shared {
        state: Mutex::new(State {
            value: None,
            resolved: false,
            abandoned: false,
            waker: None,
        }),
        ready: Condvar::new(),
    });
    (
        Completer {
            shared: Arc::clone(&shared),
            sent: false,
        },
        Completion { shared },
    )
}

impl<T> Completer<T> {
    /// Publishes the result and wakes every waiter.
    pub fn complete(mut self, value: T) {
        self.sent = true;
        let waker = {
            let mut state = self.shared.state.lock();
            state.value = Some(value);
            state.resolved = true;
            state.waker.take()
        };
        self.shared.ready.notify_all();
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if self.sent {
            return;
        }
        let waker = {
            let mut state = self.shared.state.lock();
            state.abandoned = true;
            state.waker.take()
        };
        self.shared.ready.notify_all();
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

impl<T> Completion<T> {
    /// Whether the completer has published a value (taken or not).
    pub fn is_resolved(&self) -> bool {
        self.shared.state.lock().resolved
    }

    /// Takes the value if it is already available.
    pub fn try_take(&self) -> Option<T> {
        self.shared.state.lock().value.take()
    }

    /// Blocks until the value arrives, the completer is dropped, or `timeout`
    /// elapses. Returns `None` in the last two cases.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        loop {
            if let Some(value) = state.value.take() {
                return Some(value);
            }
            if state.abandoned || state.resolved {
                return None;
            }
            if self
                .shared
                .ready
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return state.value.take();
            }
        }
    }

    /// Like [`wait_timeout`](Self::wait_timeout), but calls `pump` on the
    /// calling thread every [`PUMP_INTERVAL`] so that driver callbacks which
    /// only fire during polling get a chance to run.
    pub fn wait_with_pump<F: FnMut()>(&self, timeout: Duration, mut pump: F) -> Option<T> {
        let deadline = Instant::now() + timeout;
        loop {
            pump();
            let mut state = self.shared.state.lock();
            if let Some(value) = state.value.take() {
                return Some(value);
            }
            if state.abandoned || state.resolved {
                return None;
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let slice = (deadline - now).min(PUMP_INTERVAL);
            let _ = self.shared.ready.wait_for(&mut state, slice);
        }
    }
}

impl<T> Future for Completion<T> {
    type Output = Option<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.shared.state.lock();
        if let Some(value) = state.value.take() {
            return Poll::Ready(Some(value));
        }
        if state.abandoned || state.resolved {
            return Poll::Ready(None);
        }
        state.waker = Some(cx.waker().clone());
        Poll::Pending
    }
}

/// A helper thread that calls a pump function at a fixed interval until it
/// is stopped. Dropping the pump stops and joins the thread.
pub struct EventPump {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl EventPump {
    /// Spawns the pump thread.
    pub fn spawn<F>(name: &str, interval: Duration, mut pump: F) -> std::io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = std::thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || {
                while !thread_stop.load(Ordering::Acquire) {
                    pump();
                    std::thread::sleep(interval);
                }
            })?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Signals the thread to exit and waits for it.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("EventPump: pump thread panicked");
            }
        }
    }
}

impl Drop for EventPump {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn value_sent_from_another_thread_is_received() {
        let (completer, completion) = completion::<u32>();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(5));
            completer.complete(42);
        });
        assert_eq!(completion.wait_timeout(Duration::from_secs(5)), Some(42));
    }

    #[test]
    fn wait_times_out_without_a_value() {
        let (_completer, completion) = completion::<u32>();
        let start = Instant::now();
        assert_eq!(completion.wait_timeout(Duration::from_millis(20)), None);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn dropped_completer_ends_the_wait() {
        let (completer, completion) = completion::<u32>();
        drop(completer);
        assert_eq!(completion.wait_timeout(Duration::from_secs(5)), None);
    }

    #[test]
    fn pump_runs_on_the_waiting_thread_until_resolved() {
        let (completer, completion) = completion::<&'static str>();
        let mut completer = Some(completer);
        let mut calls = 0;
        let result = completion.wait_with_pump(Duration::from_secs(5), || {
            calls += 1;
            if calls == 3 {
                if let Some(c) = completer.take() {
                    c.complete("mapped");
                }
            }
        });
        assert_eq!(result, Some("mapped"));
        assert_eq!(calls, 3);
    }

    #[test]
    fn completion_is_a_future() {
        let (completer, completion) = completion::<u8>();
        completer.complete(7);
        assert_eq!(pollster::block_on(completion), Some(7));
    }

    #[test]
    fn event_pump_stops_on_drop() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let pump = EventPump::spawn("test-pump", PUMP_INTERVAL, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        std::thread::sleep(Duration::from_millis(20));
        drop(pump);
        let after_stop = count.load(Ordering::SeqCst);
        assert!(after_stop > 0);
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(count.load(Ordering::SeqCst), after_stop);
    }
}
