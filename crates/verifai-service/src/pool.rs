// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Endpoint pool — per-service-kind registry of known-good URLs with
// round-robin selection.
//
// Each kind has its own URL list and cursor behind one mutex, so a selection
// reads and advances the cursor in a single critical section and concurrent
// callers can never observe the same position.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use verifai_core::error::{Result, VerifaiError};
use verifai_core::types::ServiceKind;

use crate::probe;
use crate::transport::Transport;

#[derive(Debug, Default)]
struct Rotation {
    urls: Vec<String>,
    cursor: usize,
}

/// Registered endpoints for the classifier and OCR services.
pub struct EndpointPool {
    transport: Arc<dyn Transport>,
    classifier: Mutex<Rotation>,
    ocr: Mutex<Rotation>,
}

impl EndpointPool {
    /// Create an empty pool that probes candidates through `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            classifier: Mutex::new(Rotation::default()),
            ocr: Mutex::new(Rotation::default()),
        }
    }

    // A panic while holding the lock cannot leave a half-written rotation:
    // pushes and cursor updates are single assignments.
    fn rotation(&self, kind: ServiceKind) -> MutexGuard<'_, Rotation> {
        let slot = match kind {
            ServiceKind::Classifier => &self.classifier,
            ServiceKind::Ocr => &self.ocr,
        };
        slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `url` for `kind`.
    ///
    /// Unless `skip_liveness_check` is set, the URL is probed first and only
    /// added if it advertises exactly `OPTIONS, POST`. Returns whether the URL
    /// was added; a failed probe is never an error.
    pub fn register(&self, url: &str, kind: ServiceKind, skip_liveness_check: bool) -> bool {
        if !skip_liveness_check && !probe::probe(self.transport.as_ref(), url) {
            warn!(url, kind = %kind, "endpoint declined");
            return false;
        }

        let mut rotation = self.rotation(kind);
        rotation.urls.push(url.to_string());
        info!(
            url,
            kind = %kind,
            registered = rotation.urls.len(),
            probed = !skip_liveness_check,
            "endpoint registered"
        );
        true
    }

    /// Next URL for `kind` in round-robin order.
    pub fn select(&self, kind: ServiceKind) -> Result<String> {
        let mut rotation = self.rotation(kind);
        if rotation.urls.is_empty() {
            return Err(VerifaiError::NoEndpointAvailable(kind));
        }
        // Registrations only append, but keep the cursor in range regardless.
        let index = rotation.cursor % rotation.urls.len();
        rotation.cursor = (index + 1) % rotation.urls.len();
        let url = rotation.urls[index].clone();
        debug!(url = %url, kind = %kind, index, "endpoint selected");
        Ok(url)
    }

    /// Snapshot of the URLs registered for `kind`, in registration order.
    pub fn urls(&self, kind: ServiceKind) -> Vec<String> {
        self.rotation(kind).urls.clone()
    }

    pub fn len(&self, kind: ServiceKind) -> usize {
        self.rotation(kind).urls.len()
    }

    pub fn is_empty(&self, kind: ServiceKind) -> bool {
        self.len(kind) == 0
    }
}
