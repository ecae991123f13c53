// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Verifai Service — endpoint registration with liveness probing, round-robin
// endpoint selection, and blocking HTTP dispatch to the classifier, OCR, and
// metadata services. `VerifaiService` is the `Dispatcher` documents talk to.

pub mod client;
pub mod pool;
pub mod probe;
pub mod transport;
pub mod wire;

#[cfg(test)]
pub(crate) mod testing;

pub use client::VerifaiService;
pub use pool::EndpointPool;
pub use transport::{HttpReply, HttpTransport, Transport};
