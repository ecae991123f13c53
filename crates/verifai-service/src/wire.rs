// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON wire schemas for the classifier, OCR, and metadata services, and their
// conversion into the typed results in `verifai-core`.
//
// Any body that does not match its schema is a
// `VerifaiError::MalformedResponse`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use verifai_core::error::{Result, VerifaiError};
use verifai_core::geometry::FractionalBox;
use verifai_core::types::{
    ClassificationResult, ClassifyOutcome, ClassifyStatus, ModelMetadata, MrzReadResult,
    OcrStatus, Side, ZoneDescriptor,
};

/// `POST <classifier-url>` response.
#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    status: ClassifyStatus,
    uuid: Option<String>,
    side: Option<String>,
    coords: Option<FractionalBox>,
}

/// `POST <ocr-url>` response.
#[derive(Debug, Deserialize)]
struct OcrResponse {
    status: OcrStatus,
    result: Option<OcrPayload>,
    rotation: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OcrPayload {
    fields: BTreeMap<String, serde_json::Value>,
    fields_raw: BTreeMap<String, serde_json::Value>,
    checksums: BTreeMap<String, serde_json::Value>,
}

/// One element of the `GET id-models?uuid=` array.
#[derive(Debug, Deserialize)]
struct MetadataRecord {
    model: String,
    country: String,
    #[serde(deserialize_with = "number_or_string")]
    width_mm: f64,
    #[serde(deserialize_with = "number_or_string")]
    height_mm: f64,
    #[serde(default)]
    zones: Vec<ZoneRecord>,
}

#[derive(Debug, Deserialize)]
struct ZoneRecord {
    title: String,
    side: String,
    #[serde(deserialize_with = "number_or_string")]
    x: f64,
    #[serde(deserialize_with = "number_or_string")]
    y: f64,
    #[serde(deserialize_with = "number_or_string")]
    width: f64,
    #[serde(deserialize_with = "number_or_string")]
    height: f64,
}

/// Decimal fields may be serialised as numbers or as numeric strings.
fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s
            .trim()
            .parse()
            .map_err(|e| serde::de::Error::custom(format!("invalid number {s:?}: {e}"))),
    }
}

fn malformed(context: &str, err: impl std::fmt::Display) -> VerifaiError {
    VerifaiError::MalformedResponse(format!("{context}: {err}"))
}

fn parse_side(context: &str, code: &str) -> Result<Side> {
    Side::from_code(code).ok_or_else(|| malformed(context, "empty side code"))
}

/// Parse a classifier response body.
pub fn parse_classify(body: &[u8]) -> Result<ClassifyOutcome> {
    let response: ClassifyResponse =
        serde_json::from_slice(body).map_err(|e| malformed("classify response", e))?;

    if let ClassifyStatus::Other(status) = response.status {
        return Ok(ClassifyOutcome::Rejected { status });
    }

    let uuid = response
        .uuid
        .ok_or_else(|| malformed("classify response", "missing `uuid`"))?;
    let side = response
        .side
        .ok_or_else(|| malformed("classify response", "missing `side`"))?;
    let bbox = response
        .coords
        .ok_or_else(|| malformed("classify response", "missing `coords`"))?;

    Ok(ClassifyOutcome::Classified(ClassificationResult {
        uuid,
        side: parse_side("classify response", &side)?,
        bbox,
    }))
}

/// Parse an OCR response body.
pub fn parse_ocr(body: &[u8]) -> Result<MrzReadResult> {
    let response: OcrResponse =
        serde_json::from_slice(body).map_err(|e| malformed("OCR response", e))?;

    if response.status != OcrStatus::Success {
        let mut result = MrzReadResult::with_status(response.status);
        result.rotation = response.rotation;
        return Ok(result);
    }

    let payload = response
        .result
        .ok_or_else(|| malformed("OCR response", "SUCCESS without `result`"))?;
    Ok(MrzReadResult {
        status: OcrStatus::Success,
        fields: payload.fields,
        fields_raw: payload.fields_raw,
        checksums: payload.checksums,
        rotation: response.rotation,
    })
}

/// Parse a metadata response body: the first record, or `None` for an empty
/// array.
pub fn parse_metadata(body: &[u8]) -> Result<Option<ModelMetadata>> {
    let records: Vec<serde_json::Value> =
        serde_json::from_slice(body).map_err(|e| malformed("metadata response", e))?;
    let Some(first) = records.into_iter().next() else {
        return Ok(None);
    };
    let record: MetadataRecord =
        serde_json::from_value(first).map_err(|e| malformed("metadata record", e))?;

    if !(record.width_mm > 0.0 && record.height_mm > 0.0) {
        return Err(malformed(
            "metadata record",
            format!(
                "non-positive document size {} x {} mm",
                record.width_mm, record.height_mm
            ),
        ));
    }

    let zones = record
        .zones
        .into_iter()
        .map(|zone| {
            Ok(ZoneDescriptor {
                side: parse_side("metadata zone", &zone.side)?,
                title: zone.title,
                x: zone.x,
                y: zone.y,
                width: zone.width,
                height: zone.height,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(ModelMetadata {
        model: record.model,
        country: record.country,
        width_mm: record.width_mm,
        height_mm: record.height_mm,
        zones,
    }))
}
