// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// MRZ reader — cuts the Machine Readable Zone out of a document, sends it to
// the OCR service once, and serves the parsed fields from then on.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use verifai_core::error::Result;
use verifai_core::types::MrzReadResult;

use crate::document::Document;
use crate::image::processor::ImageProcessor;
use crate::memo::Memo;
use crate::zone::Zone;

/// Margin added around the MRZ zone before OCR, as a fraction of the document.
pub const MRZ_TOLERANCE: f64 = 0.03;

const JPEG_QUALITY: u8 = 90;

/// Per-document MRZ state, owned by the [`Document`] so every reader handed
/// out for it shares one OCR result.
pub(crate) struct MrzState {
    zone: Zone,
    result: Memo<MrzReadResult>,
}

impl MrzState {
    pub(crate) fn new(zone: Zone) -> Self {
        Self {
            zone,
            result: Memo::new(),
        }
    }
}

/// Reads the MRZ of one document. Obtained from [`Document::mrz`].
pub struct MrzReader<'a> {
    document: &'a Document,
    state: Arc<MrzState>,
}

impl<'a> MrzReader<'a> {
    pub(crate) fn new(document: &'a Document, state: Arc<MrzState>) -> Self {
        Self { document, state }
    }

    /// The MRZ zone this reader was built for.
    pub fn zone(&self) -> &Zone {
        &self.state.zone
    }

    /// The OCR result, dispatched on the first call and cached afterwards.
    ///
    /// A `NOT_FOUND` answer is cached like any other; only transport and
    /// response errors leave the cache empty.
    #[instrument(skip(self), fields(uuid = %self.document.uuid()))]
    pub fn read(&self) -> Result<Arc<MrzReadResult>> {
        self.state.result.get_or_try_init(|| {
            let region = self
                .document
                .part_of_card_image(&self.state.zone.position_in_image(), MRZ_TOLERANCE)?;
            debug!(
                width = region.width(),
                height = region.height(),
                "MRZ region cropped"
            );
            let jpeg = ImageProcessor::from_dynamic(region).to_jpeg_bytes(JPEG_QUALITY)?;
            let result = self.document.dispatcher().read_ocr(&jpeg)?;
            info!(status = ?result.status, "MRZ read");
            Ok(result)
        })
    }

    /// The cached OCR result, if [`read`](Self::read) has completed.
    pub fn cached(&self) -> Option<Arc<MrzReadResult>> {
        self.state.result.get()
    }

    pub fn is_successful(&self) -> Result<bool> {
        Ok(self.read()?.is_successful())
    }

    /// Parsed MRZ fields, only when the read succeeded.
    pub fn fields(&self) -> Result<Option<BTreeMap<String, serde_json::Value>>> {
        Ok(self.read()?.fields().cloned())
    }

    /// Fields exactly as printed, `<` fillers included.
    pub fn fields_raw(&self) -> Result<Option<BTreeMap<String, serde_json::Value>>> {
        Ok(self.read()?.fields_raw().cloned())
    }

    pub fn checksums(&self) -> Result<Option<BTreeMap<String, serde_json::Value>>> {
        Ok(self.read()?.checksums().cloned())
    }

    /// Degrees the image had to be rotated to read the MRZ.
    pub fn rotation(&self) -> Result<Option<i64>> {
        Ok(self.read()?.rotation())
    }
}
