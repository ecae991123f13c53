// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The seam between the document model and the remote Verifai services.
//
// The HTTP implementation lives in `verifai-service`; documents only ever see
// this trait, so tests can substitute a counting stub.

use crate::error::Result;
use crate::types::{ClassifyOutcome, ModelMetadata, MrzReadResult};

/// Blocking access to the classifier, OCR, and metadata services.
///
/// Implementations must be shareable across threads: many documents may hold
/// the same dispatcher at once. Every call blocks until the remote answers or
/// the transport gives up; failures are returned, never retried.
pub trait Dispatcher: Send + Sync {
    /// Send an encoded image to a classifier endpoint.
    ///
    /// A classifier that recognises no document yields
    /// `Ok(ClassifyOutcome::Rejected { .. })`, not an error.
    fn classify(&self, image: &[u8]) -> Result<ClassifyOutcome>;

    /// Send an encoded MRZ image to an OCR endpoint.
    ///
    /// `OcrStatus::NotFound` is a valid result, not an error.
    fn read_ocr(&self, image: &[u8]) -> Result<MrzReadResult>;

    /// Look up the id-model metadata for `uuid`. `Ok(None)` when the API
    /// knows no such model.
    fn fetch_metadata(&self, uuid: &str) -> Result<Option<ModelMetadata>>;
}
