// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Zone catalog — named regions of a classified document.

use verifai_core::geometry::{self, FractionalBox};
use verifai_core::types::{ModelMetadata, Side, ZoneDescriptor};

/// Title the metadata API gives the Machine Readable Zone.
const MRZ_TITLE: &str = "MRZ";

/// A named rectangle on one side of a document, in fractions of the document
/// (not of the photo it was found in).
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    title: String,
    side: Side,
    bbox: FractionalBox,
}

impl Zone {
    /// Derive a zone from its metadata descriptor and the document's physical
    /// size.
    pub fn from_descriptor(descriptor: &ZoneDescriptor, width_mm: f64, height_mm: f64) -> Self {
        Self {
            title: descriptor.title.clone(),
            side: descriptor.side,
            bbox: geometry::mm_zone_to_fractional_box(descriptor, width_mm, height_mm),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Which physical side of the document the zone is printed on.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Bounds relative to the cropped document image.
    pub fn position_in_image(&self) -> FractionalBox {
        self.bbox
    }

    /// Whether this is the Machine Readable Zone (title compared
    /// case-insensitively).
    pub fn is_mrz(&self) -> bool {
        self.title.eq_ignore_ascii_case(MRZ_TITLE)
    }
}

/// Build every zone of a model, preserving metadata order.
pub fn build_zones(metadata: &ModelMetadata) -> Vec<Zone> {
    let (width_mm, height_mm) = metadata.actual_size_mm();
    metadata
        .zones
        .iter()
        .map(|descriptor| Zone::from_descriptor(descriptor, width_mm, height_mm))
        .collect()
}
