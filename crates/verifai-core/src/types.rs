// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Verifai client.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::FractionalBox;

/// The two kinds of remote service an endpoint can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Classifier,
    Ocr,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classifier => "classifier",
            Self::Ocr => "ocr",
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical side of a document, as a one-character code (`F`ront / `B`ack).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Side(char);

impl Side {
    pub const FRONT: Side = Side('F');
    pub const BACK: Side = Side('B');

    /// Take the first character of a side code (`"F"`, `"B"`, `"FRONT"`...).
    ///
    /// Returns `None` for an empty string.
    pub fn from_code(code: &str) -> Option<Self> {
        code.chars().next().map(Side)
    }

    pub fn code(&self) -> char {
        self.0
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status reported by the classifier service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ClassifyStatus {
    Success,
    /// Anything else the service reported, kept verbatim for logging.
    Other(String),
}

impl From<String> for ClassifyStatus {
    fn from(value: String) -> Self {
        if value == "SUCCESS" {
            Self::Success
        } else {
            Self::Other(value)
        }
    }
}

/// Status reported by the OCR service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum OcrStatus {
    Success,
    /// No MRZ could be read. An expected outcome, not a failure.
    NotFound,
    Other(String),
}

impl From<String> for OcrStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "SUCCESS" => Self::Success,
            "NOT_FOUND" => Self::NotFound,
            _ => Self::Other(value),
        }
    }
}

/// A successful classification: which document model, which side, and where
/// the document sits in the submitted image.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    /// Verifai's internal id-model UUID.
    pub uuid: String,
    pub side: Side,
    /// Document bounds relative to the submitted image.
    pub bbox: FractionalBox,
}

/// Result of a classify call.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyOutcome {
    Classified(ClassificationResult),
    /// The classifier answered but found no document it recognises.
    Rejected { status: String },
}

/// Raw zone definition as delivered by the metadata API.
///
/// `x`, `y`, `width` and `height` are fractions of the document's extent.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneDescriptor {
    pub title: String,
    pub side: Side,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Descriptive data about an id-model, fetched once per document.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMetadata {
    pub model: String,
    /// ISO 3166-1 alpha-2 code, e.g. `"NL"`.
    pub country: String,
    pub width_mm: f64,
    pub height_mm: f64,
    /// Zone definitions in the order the API returned them.
    pub zones: Vec<ZoneDescriptor>,
}

impl ModelMetadata {
    /// Physical size of the document as `(width_mm, height_mm)`.
    pub fn actual_size_mm(&self) -> (f64, f64) {
        (self.width_mm, self.height_mm)
    }
}

/// Parsed response of the OCR service for an MRZ image.
#[derive(Debug, Clone, PartialEq)]
pub struct MrzReadResult {
    pub status: OcrStatus,
    pub fields: BTreeMap<String, serde_json::Value>,
    pub fields_raw: BTreeMap<String, serde_json::Value>,
    pub checksums: BTreeMap<String, serde_json::Value>,
    /// Rotation in degrees that was required to read the MRZ.
    pub rotation: Option<i64>,
}

impl MrzReadResult {
    /// A result carrying only a status (used for `NOT_FOUND` responses).
    pub fn with_status(status: OcrStatus) -> Self {
        Self {
            status,
            fields: BTreeMap::new(),
            fields_raw: BTreeMap::new(),
            checksums: BTreeMap::new(),
            rotation: None,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.status == OcrStatus::Success
    }

    pub fn is_not_found(&self) -> bool {
        self.status == OcrStatus::NotFound
    }

    pub fn fields(&self) -> Option<&BTreeMap<String, serde_json::Value>> {
        self.is_successful().then_some(&self.fields)
    }

    pub fn fields_raw(&self) -> Option<&BTreeMap<String, serde_json::Value>> {
        self.is_successful().then_some(&self.fields_raw)
    }

    pub fn checksums(&self) -> Option<&BTreeMap<String, serde_json::Value>> {
        self.is_successful().then_some(&self.checksums)
    }

    pub fn rotation(&self) -> Option<i64> {
        if self.is_successful() {
            self.rotation
        } else {
            None
        }
    }
}
