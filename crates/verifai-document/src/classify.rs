// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Entry point: classify an image and wrap the answer in a `Document`.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};

use verifai_core::dispatch::Dispatcher;
use verifai_core::error::{Result, VerifaiError};
use verifai_core::types::ClassifyOutcome;

use crate::document::Document;
use crate::image::processor::ImageProcessor;

/// Classify `image_bytes` and return the recognised document.
///
/// The image is decoded before anything is sent, so an unreadable image
/// costs no network round trip. `Ok(None)` means the classifier answered but
/// recognised no document.
#[instrument(skip(dispatcher, image_bytes), fields(image_len = image_bytes.len()))]
pub fn classify_image(
    dispatcher: Arc<dyn Dispatcher>,
    image_bytes: &[u8],
) -> Result<Option<Document>> {
    let image = ImageProcessor::from_bytes(image_bytes)?.into_dynamic();
    match dispatcher.classify(image_bytes)? {
        ClassifyOutcome::Classified(classification) => {
            Ok(Some(Document::from_image(classification, dispatcher, image)))
        }
        ClassifyOutcome::Rejected { status } => {
            info!(status = %status, "no document recognised");
            Ok(None)
        }
    }
}

/// [`classify_image`] on the contents of a file.
pub fn classify_image_path(
    dispatcher: Arc<dyn Dispatcher>,
    path: impl AsRef<Path>,
) -> Result<Option<Document>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| {
        VerifaiError::ImageError(format!("failed to read {}: {e}", path.display()))
    })?;
    classify_image(dispatcher, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubDispatcher, card_png};
    use verifai_core::types::Side;

    #[test]
    fn classified_image_becomes_document() {
        let stub = Arc::new(StubDispatcher::new());
        let doc = classify_image(stub.clone(), &card_png()).unwrap().unwrap();
        assert_eq!(doc.uuid(), "abc-123");
        assert_eq!(doc.side(), Side::FRONT);
        assert_eq!(stub.classify_calls(), 1);
    }

    #[test]
    fn rejection_is_none() {
        let stub = Arc::new(StubDispatcher::new().with_classify(ClassifyOutcome::Rejected {
            status: "NOT_FOUND".into(),
        }));
        assert!(classify_image(stub, &card_png()).unwrap().is_none());
    }

    #[test]
    fn undecodable_image_is_not_sent() {
        let stub = Arc::new(StubDispatcher::new());
        let err = classify_image(stub.clone(), b"not an image").unwrap_err();
        assert!(matches!(err, VerifaiError::ImageError(_)));
        assert_eq!(stub.classify_calls(), 0);
    }

    #[test]
    fn classifies_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.png");
        std::fs::write(&path, card_png()).unwrap();

        let stub = Arc::new(StubDispatcher::new());
        let doc = classify_image_path(stub.clone(), &path).unwrap().unwrap();
        assert_eq!(doc.cropped_image().unwrap().width(), 160);

        let missing = classify_image_path(stub, dir.path().join("missing.png"));
        assert!(matches!(missing, Err(VerifaiError::ImageError(_))));
    }
}
