//! Connection set - the handles of currently open links.
//!
//! [`ConnectionSet`] is the plain data structure (no duplicates, add/remove
//! are idempotent). [`ConnectionRegistry`] wraps it in a critical-section
//! mutex so the event dispatcher (stack context) and the notifier
//! (application context) can share it without a global.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Vec;

use super::ConnectionHandle;
use crate::config::MAX_CONNECTIONS;
use crate::error::Error;

/// Set of active connection handles. Iteration order is insertion order but
/// callers must not rely on it.
#[derive(Clone, Debug, Default)]
pub struct ConnectionSet {
    handles: Vec<ConnectionHandle, MAX_CONNECTIONS>,
}

impl ConnectionSet {
    pub const fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Track `handle`. Returns `Ok(false)` if it was already present.
    pub fn add(&mut self, handle: ConnectionHandle) -> Result<bool, Error> {
        if self.contains(handle) {
            return Ok(false);
        }
        self.handles
            .push(handle)
            .map(|_| true)
            .map_err(|_| Error::ConnectionSetFull)
    }

    /// Forget `handle`. Returns `false` if it was not tracked.
    pub fn remove(&mut self, handle: ConnectionHandle) -> bool {
        match self.handles.iter().position(|h| *h == handle) {
            Some(index) => {
                self.handles.swap_remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, handle: ConnectionHandle) -> bool {
        self.handles.contains(&handle)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Visit every tracked handle.
    pub fn for_each(&self, mut visitor: impl FnMut(ConnectionHandle)) {
        for handle in &self.handles {
            visitor(*handle);
        }
    }
}

/// [`ConnectionSet`] shared between execution contexts.
///
/// Each operation holds the lock only for its own duration; nothing is
/// locked across events.
pub struct ConnectionRegistry {
    inner: Mutex<CriticalSectionRawMutex, RefCell<ConnectionSet>>,
}

impl ConnectionRegistry {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(ConnectionSet::new())),
        }
    }

    pub fn add(&self, handle: ConnectionHandle) -> Result<bool, Error> {
        self.inner.lock(|set| set.borrow_mut().add(handle))
    }

    pub fn remove(&self, handle: ConnectionHandle) -> bool {
        self.inner.lock(|set| set.borrow_mut().remove(handle))
    }

    pub fn contains(&self, handle: ConnectionHandle) -> bool {
        self.inner.lock(|set| set.borrow().contains(handle))
    }

    pub fn len(&self) -> usize {
        self.inner.lock(|set| set.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current handles, taken under the lock.
    pub fn snapshot(&self) -> Vec<ConnectionHandle, MAX_CONNECTIONS> {
        self.inner.lock(|set| {
            let mut handles = Vec::new();
            set.borrow().for_each(|h| {
                // Same capacity as the set itself.
                let _ = handles.push(h);
            });
            handles
        })
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
