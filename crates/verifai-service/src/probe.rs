// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Liveness probe for candidate endpoints.
//
// A Verifai classify/OCR endpoint answers OPTIONS with exactly
// `Allow: OPTIONS, POST`. Any other answer, or no answer at all, means the URL
// is not registered.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::transport::Transport;

/// The capability set a service endpoint must advertise.
pub const EXPECTED_METHODS: [&str; 2] = ["OPTIONS", "POST"];

/// Parse an `Allow` header into an upper-cased method set.
///
/// Returns `None` when the header is empty or contains a token that is not a
/// plain method name.
pub fn parse_allow_header(value: &str) -> Option<BTreeSet<String>> {
    let mut methods = BTreeSet::new();
    for token in value.split(',') {
        let token = token.trim();
        if token.is_empty() || !token.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        methods.insert(token.to_ascii_uppercase());
    }
    Some(methods)
}

/// Whether a method set is exactly `{OPTIONS, POST}`.
pub fn is_service_capability_set(methods: &BTreeSet<String>) -> bool {
    methods.len() == EXPECTED_METHODS.len()
        && EXPECTED_METHODS.iter().all(|m| methods.contains(*m))
}

/// Probe `url` and report whether it behaves like a service endpoint.
///
/// Never fails: every problem is logged and reported as `false`.
pub fn probe(transport: &dyn Transport, url: &str) -> bool {
    let header = match transport.allowed_methods(url) {
        Ok(Some(header)) => header,
        Ok(None) => {
            warn!(url, "liveness probe: no Allow header");
            return false;
        }
        Err(e) => {
            warn!(url, error = %e, "liveness probe failed");
            return false;
        }
    };

    match parse_allow_header(&header) {
        Some(methods) if is_service_capability_set(&methods) => {
            debug!(url, "liveness probe passed");
            true
        }
        Some(methods) => {
            warn!(url, methods = ?methods, "liveness probe: unexpected capability set");
            false
        }
        None => {
            warn!(url, header = %header, "liveness probe: malformed Allow header");
            false
        }
    }
}
