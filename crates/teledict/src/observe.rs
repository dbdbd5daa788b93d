// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Soft-failure reporting.
//!
//! Some operations degrade gracefully instead of failing: a corrupted wire
//! buffer turns `update` into a no-op, and `extend` skips keys that already
//! exist. Those events are reported through an [`Observer`] so callers (and
//! tests) can see them without depending on a global logger. The default
//! [`LogObserver`] forwards everything to the `log` crate.

use std::fmt;
use std::sync::Mutex;

/// A soft-failure notice emitted while mutating a dictionary.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// Wire data failed to parse; the requested operation was skipped.
    ParseFailure { reason: &'a str },
    /// An extend payload carried a key that already exists; the existing
    /// entry was kept.
    DuplicateKey { key: &'a str },
}

impl fmt::Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseFailure { reason } => write!(f, "wire parse failure: {}", reason),
            Self::DuplicateKey { key } => {
                write!(f, "key \"{}\" already exists, keeping existing entry", key)
            }
        }
    }
}

/// Sink for soft-failure notices.
pub trait Observer {
    fn notice(&self, event: Event<'_>);
}

/// Default observer, forwards notices to the `log` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn notice(&self, event: Event<'_>) {
        match event {
            Event::ParseFailure { .. } => log::error!("[dict] {}", event),
            Event::DuplicateKey { .. } => log::warn!("[dict] {}", event),
        }
    }
}

/// Observer that records notices in memory, for tests.
#[derive(Debug, Default)]
pub struct Capture {
    events: Mutex<Vec<String>>,
}

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded notices, in emission order.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().map(|e| e.is_empty()).unwrap_or(true)
    }
}

impl Observer for Capture {
    fn notice(&self, event: Event<'_>) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.to_string());
        }
    }
}
