// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// At-most-once memoization cell.
//
// The lock is held across the computation, so concurrent first readers wait
// for the one in flight instead of starting their own remote call, and nobody
// can observe a half-written value. A failed computation stores nothing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub(crate) struct Memo<T> {
    slot: Mutex<Option<Arc<T>>>,
}

impl<T> Memo<T> {
    pub(crate) fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    // The slot is only ever replaced whole, so a poisoned lock still guards a
    // consistent value.
    fn lock(&self) -> MutexGuard<'_, Option<Arc<T>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The cached value, without computing anything.
    pub(crate) fn get(&self) -> Option<Arc<T>> {
        self.lock().clone()
    }

    /// Return the cached value, or compute and cache it.
    pub(crate) fn get_or_try_init<E>(
        &self,
        init: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        let mut slot = self.lock();
        if let Some(value) = slot.as_ref() {
            return Ok(Arc::clone(value));
        }
        let value = Arc::new(init()?);
        *slot = Some(Arc::clone(&value));
        Ok(value)
    }

    /// Like [`get_or_try_init`](Self::get_or_try_init), but `Ok(None)` is
    /// passed through uncached so the next call tries again.
    pub(crate) fn get_or_try_init_some<E>(
        &self,
        init: impl FnOnce() -> Result<Option<T>, E>,
    ) -> Result<Option<Arc<T>>, E> {
        let mut slot = self.lock();
        if let Some(value) = slot.as_ref() {
            return Ok(Some(Arc::clone(value)));
        }
        let Some(value) = init()? else {
            return Ok(None);
        };
        let value = Arc::new(value);
        *slot = Some(Arc::clone(&value));
        Ok(Some(value))
    }

    /// Run `update` and clear the cache as one step with respect to other
    /// users of this cell.
    pub(crate) fn reset_with<R>(&self, update: impl FnOnce() -> R) -> R {
        let mut slot = self.lock();
        let out = update();
        *slot = None;
        out
    }
}
