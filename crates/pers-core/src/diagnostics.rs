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

//! Leveled diagnostics with per-severity interception.
//!
//! Everything ends up in the `log` facade. On top of the usual levels this
//! module adds the two "todo" severities used to flag unimplemented paths,
//! and lets an embedding application hook any severity with a callback that
//! may swallow the default output. A `TodoOrDie` record that nobody
//! intercepts aborts the process.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Severity of a diagnostic record, in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Very fine-grained tracing.
    Trace,
    /// Developer-oriented detail.
    Debug,
    /// Normal operational messages.
    Info,
    /// A known gap that is acceptable for now.
    TodoSomeday,
    /// Something unexpected that the system recovered from.
    Warning,
    /// A code path that must be implemented before it is relied on.
    TodoOrDie,
    /// An operation failed.
    Error,
    /// The system is in a state it cannot meaningfully continue from.
    Critical,
}

impl Severity {
    /// Every severity, from least to most severe.
    pub const ALL: [Severity; 8] = [
        Severity::Trace,
        Severity::Debug,
        Severity::Info,
        Severity::TodoSomeday,
        Severity::Warning,
        Severity::TodoOrDie,
        Severity::Error,
        Severity::Critical,
    ];

    /// Returns the display name of the severity.
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::TodoSomeday => "TODO_SOMEDAY",
            Severity::Warning => "WARNING",
            Severity::TodoOrDie => "TODO_OR_DIE",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }

    /// The `log` level this severity is forwarded at.
    pub const fn log_level(self) -> log::Level {
        match self {
            Severity::Trace => log::Level::Trace,
            Severity::Debug => log::Level::Debug,
            Severity::Info | Severity::TodoSomeday => log::Level::Info,
            Severity::Warning | Severity::TodoOrDie => log::Level::Warn,
            Severity::Error | Severity::Critical => log::Level::Error,
        }
    }

    /// The `log` target used for default output.
    pub const fn target(self) -> &'static str {
        match self {
            Severity::TodoSomeday => "pers::todo_someday",
            Severity::TodoOrDie => "pers::todo_or_die",
            Severity::Critical => "pers::critical",
            _ => "pers",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One diagnostic event, with its source location.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticRecord<'a> {
    /// How serious the event is.
    pub severity: Severity,
    /// The subsystem that emitted it (usually a type name).
    pub category: &'a str,
    /// The human-readable message.
    pub message: &'a str,
    /// Source file of the emitting call site.
    pub file: &'static str,
    /// Source line of the emitting call site.
    pub line: u32,
}

/// A per-severity hook. Returning `true` suppresses the default output.
pub type DiagnosticCallback = Arc<dyn Fn(&DiagnosticRecord<'_>) -> bool + Send + Sync>;

/// The process-wide callback table.
pub struct Diagnostics {
    callbacks: RwLock<HashMap<Severity, DiagnosticCallback>>,
}

static DIAGNOSTICS: OnceLock<Diagnostics> = OnceLock::new();

impl Diagnostics {
    fn new() -> Self {
        Self {
            callbacks: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the process-wide instance, creating it on first use.
    pub fn global() -> &'static Diagnostics {
        DIAGNOSTICS.get_or_init(Diagnostics::new)
    }

    /// Installs `callback` for `severity`, replacing any previous one.
    pub fn set_callback<F>(&self, severity: Severity, callback: F)
    where
        F: Fn(&DiagnosticRecord<'_>) -> bool + Send + Sync + 'static,
    {
        self.callbacks.write().insert(severity, Arc::new(callback));
    }

    /// Removes the callback for `severity`, if any.
    pub fn clear_callback(&self, severity: Severity) {
        self.callbacks.write().remove(&severity);
    }

    /// Removes every callback. Call this before tearing down whatever the
    /// callbacks capture.
    pub fn clear_all(&self) {
        self.callbacks.write().clear();
    }

    /// Whether a callback is installed for `severity`.
    pub fn has_callback(&self, severity: Severity) -> bool {
        self.callbacks.read().contains_key(&severity)
    }

    /// Dispatches a record: callback first, then default output unless the
    /// callback suppressed it.
    pub fn emit(&self, record: &DiagnosticRecord<'_>) {
        // The lock is released before the callback runs so callbacks may
        // themselves emit or reconfigure.
        let callback = self.callbacks.read().get(&record.severity).cloned();

        let suppressed = match &callback {
            Some(cb) => cb(record),
            None => false,
        };

        if !suppressed {
            log::log!(
                target: record.severity.target(),
                record.severity.log_level(),
                "[{}] {} ({}:{})",
                record.category,
                record.message,
                record.file,
                record.line
            );
        }

        if record.severity == Severity::TodoOrDie && callback.is_none() {
            log::error!(
                target: Severity::Critical.target(),
                "Unimplemented path reached in {} with no TodoOrDie handler installed, aborting",
                record.category
            );
            std::process::abort();
        }
    }
}

/// Emits a record through the process-wide [`Diagnostics`].
pub fn emit(severity: Severity, category: &str, message: &str, file: &'static str, line: u32) {
    Diagnostics::global().emit(&DiagnosticRecord {
        severity,
        category,
        message,
        file,
        line,
    });
}

/// Flags a known gap that is acceptable for now.
#[macro_export]
macro_rules! todo_someday {
    ($category:expr, $($arg:tt)+) => {
        $crate::diagnostics::emit(
            $crate::diagnostics::Severity::TodoSomeday,
            $category,
            &format!($($arg)+),
            file!(),
            line!(),
        )
    };
}

/// Flags a path that must be implemented. Aborts unless a
/// [`Severity::TodoOrDie`](crate::diagnostics::Severity::TodoOrDie) callback is installed.
#[macro_export]
macro_rules! todo_or_die {
    ($category:expr, $($arg:tt)+) => {
        $crate::diagnostics::emit(
            $crate::diagnostics::Severity::TodoOrDie,
            $category,
            &format!("Function must be implemented: {}", format!($($arg)+)),
            file!(),
            line!(),
        )
    };
}

/// Reports a critical condition.
#[macro_export]
macro_rules! critical {
    ($category:expr, $($arg:tt)+) => {
        $crate::diagnostics::emit(
            $crate::diagnostics::Severity::Critical,
            $category,
            &format!($($arg)+),
            file!(),
            line!(),
        )
    };
}

// The callback table is process-wide; tests touching it run one at a time.
#[cfg(test)]
pub(crate) static CALLBACK_GUARD: parking_lot::Mutex<()> = parking_lot::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn severities_are_ordered_by_seriousness() {
        assert!(Severity::Trace < Severity::Debug);
        assert!(Severity::Info < Severity::TodoSomeday);
        assert!(Severity::TodoSomeday < Severity::Warning);
        assert!(Severity::Warning < Severity::TodoOrDie);
        assert!(Severity::TodoOrDie < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
        assert_eq!(Severity::ALL.len(), 8);
    }

    #[test]
    fn severities_forward_to_expected_log_levels() {
        assert_eq!(Severity::TodoSomeday.log_level(), log::Level::Info);
        assert_eq!(Severity::TodoOrDie.log_level(), log::Level::Warn);
        assert_eq!(Severity::Critical.log_level(), log::Level::Error);
        assert_eq!(Severity::Critical.target(), "pers::critical");
    }

    #[test]
    fn callback_receives_record_and_can_suppress() {
        let _guard = CALLBACK_GUARD.lock();
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(String::new()));

        let hits_cb = Arc::clone(&hits);
        let seen_cb = Arc::clone(&seen);
        Diagnostics::global().set_callback(Severity::TodoSomeday, move |record| {
            hits_cb.fetch_add(1, Ordering::SeqCst);
            *seen_cb.lock() = format!("{}:{}", record.category, record.message);
            true
        });

        crate::todo_someday!("SwapChain", "query real limits ({}x{})", 8192, 8192);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(&*seen.lock(), "SwapChain:query real limits (8192x8192)");
        Diagnostics::global().clear_all();
        assert!(!Diagnostics::global().has_callback(Severity::TodoSomeday));
    }

    #[test]
    fn todo_or_die_with_callback_does_not_abort() {
        let _guard = CALLBACK_GUARD.lock();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_cb = Arc::clone(&hits);
        Diagnostics::global().set_callback(Severity::TodoOrDie, move |record| {
            assert!(record.message.starts_with("Function must be implemented"));
            hits_cb.fetch_add(1, Ordering::SeqCst);
            true
        });

        crate::todo_or_die!("Buffer", "map for write");

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        Diagnostics::global().clear_callback(Severity::TodoOrDie);
    }

    #[test]
    fn callbacks_are_per_severity() {
        let _guard = CALLBACK_GUARD.lock();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_cb = Arc::clone(&hits);
        Diagnostics::global().set_callback(Severity::Error, move |_| {
            hits_cb.fetch_add(1, Ordering::SeqCst);
            false
        });

        emit(Severity::Warning, "Test", "not routed", file!(), line!());
        emit(Severity::Error, "Test", "routed", file!(), line!());

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        Diagnostics::global().clear_all();
    }
}
