// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test doubles shared by the document-crate unit tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use image::{DynamicImage, Rgb, RgbImage};
use serde_json::json;

use verifai_core::dispatch::Dispatcher;
use verifai_core::error::{Result, VerifaiError};
use verifai_core::geometry::FractionalBox;
use verifai_core::types::{
    ClassificationResult, ClassifyOutcome, ModelMetadata, MrzReadResult, OcrStatus, Side,
    ZoneDescriptor,
};

use crate::image::processor::ImageProcessor;

/// A 200x100 white PNG. With [`classification`]'s box the document crop is
/// 160x80.
pub(crate) fn card_png() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(200, 100, Rgb([255, 255, 255])));
    ImageProcessor::from_dynamic(image).to_png_bytes().unwrap()
}

pub(crate) fn classification(side: Side) -> ClassificationResult {
    ClassificationResult {
        uuid: "abc-123".into(),
        side,
        bbox: FractionalBox::new(0.1, 0.1, 0.9, 0.9),
    }
}

fn zone(title: &str, side: Side, x: f64, y: f64, width: f64, height: f64) -> ZoneDescriptor {
    ZoneDescriptor {
        title: title.into(),
        side,
        x,
        y,
        width,
        height,
    }
}

/// Photo top-left on the front, hologram in the middle on the back, MRZ over
/// the lower half of the back.
pub(crate) fn metadata() -> ModelMetadata {
    ModelMetadata {
        model: "Dutch ID 2014".into(),
        country: "NL".into(),
        width_mm: 100.0,
        height_mm: 50.0,
        zones: vec![
            zone("Photo", Side::FRONT, 0.0, 0.0, 0.25, 0.25),
            zone("Hologram", Side::BACK, 0.5, 0.5, 0.25, 0.25),
            zone("mrz", Side::BACK, 0.0, 0.5, 1.0, 0.5),
        ],
    }
}

fn successful_mrz() -> MrzReadResult {
    let map = |key: &str, value: serde_json::Value| BTreeMap::from([(key.to_string(), value)]);
    MrzReadResult {
        status: OcrStatus::Success,
        fields: map("surname", json!("DE BRUIJN")),
        fields_raw: map("surname", json!("DE<BRUIJN")),
        checksums: map("document_number", json!(true)),
        rotation: Some(0),
    }
}

/// Counting `Dispatcher` with canned answers.
pub(crate) struct StubDispatcher {
    classify: ClassifyOutcome,
    metadata: Mutex<Option<ModelMetadata>>,
    metadata_fails: bool,
    ocr: MrzReadResult,
    ocr_fails: bool,
    delay: Duration,
    classify_calls: AtomicUsize,
    metadata_calls: AtomicUsize,
    ocr_calls: AtomicUsize,
    last_ocr_image: Mutex<Option<Vec<u8>>>,
}

impl StubDispatcher {
    pub(crate) fn new() -> Self {
        Self {
            classify: ClassifyOutcome::Classified(classification(Side::FRONT)),
            metadata: Mutex::new(None),
            metadata_fails: false,
            ocr: successful_mrz(),
            ocr_fails: false,
            delay: Duration::ZERO,
            classify_calls: AtomicUsize::new(0),
            metadata_calls: AtomicUsize::new(0),
            ocr_calls: AtomicUsize::new(0),
            last_ocr_image: Mutex::new(None),
        }
    }

    pub(crate) fn with_classify(mut self, outcome: ClassifyOutcome) -> Self {
        self.classify = outcome;
        self
    }

    pub(crate) fn with_metadata(self, metadata: ModelMetadata) -> Self {
        self.set_metadata(Some(metadata));
        self
    }

    pub(crate) fn failing_metadata(mut self) -> Self {
        self.metadata_fails = true;
        self
    }

    pub(crate) fn with_ocr(mut self, result: MrzReadResult) -> Self {
        self.ocr = result;
        self
    }

    pub(crate) fn failing_ocr(mut self) -> Self {
        self.ocr_fails = true;
        self
    }

    /// Every metadata fetch and OCR read sleeps this long, to widen race
    /// windows.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn set_metadata(&self, metadata: Option<ModelMetadata>) {
        *self.metadata.lock().unwrap() = metadata;
    }

    pub(crate) fn classify_calls(&self) -> usize {
        self.classify_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn ocr_calls(&self) -> usize {
        self.ocr_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_ocr_image(&self) -> Option<Vec<u8>> {
        self.last_ocr_image.lock().unwrap().clone()
    }
}

impl Dispatcher for StubDispatcher {
    fn classify(&self, _image: &[u8]) -> Result<ClassifyOutcome> {
        self.classify_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.classify.clone())
    }

    fn read_ocr(&self, image: &[u8]) -> Result<MrzReadResult> {
        self.ocr_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_ocr_image.lock().unwrap() = Some(image.to_vec());
        thread::sleep(self.delay);
        if self.ocr_fails {
            return Err(VerifaiError::Timeout("stub OCR timed out".into()));
        }
        Ok(self.ocr.clone())
    }

    fn fetch_metadata(&self, _uuid: &str) -> Result<Option<ModelMetadata>> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        if self.metadata_fails {
            return Err(VerifaiError::Network("stub metadata unreachable".into()));
        }
        Ok(self.metadata.lock().unwrap().clone())
    }
}
