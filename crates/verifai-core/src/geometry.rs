// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry engine — conversions between fractional bounding boxes,
// millimetre-based zone definitions, and integer pixel boxes.
//
// Everything here is pure. Two coordinate systems meet in this module:
// classifier boxes are fractions of the *image*, while zone definitions are
// fractions of the *document* backed by its physical size in millimetres.

use serde::{Deserialize, Serialize};

use crate::types::ZoneDescriptor;

/// Bounding box whose coordinates are fractions (0..=1) of a reference extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FractionalBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

/// Bounding box in integer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBox {
    pub xmin: u32,
    pub ymin: u32,
    pub xmax: u32,
    pub ymax: u32,
}

/// Origin-plus-size rectangle, the form image crop/draw primitives expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FractionalBox {
    pub const FULL: FractionalBox = FractionalBox {
        xmin: 0.0,
        ymin: 0.0,
        xmax: 1.0,
        ymax: 1.0,
    };

    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Whether every coordinate lies in `[0, 1]` and min <= max on both axes.
    pub fn is_normalized(&self) -> bool {
        let unit = 0.0..=1.0;
        unit.contains(&self.xmin)
            && unit.contains(&self.ymin)
            && unit.contains(&self.xmax)
            && unit.contains(&self.ymax)
            && self.xmin <= self.xmax
            && self.ymin <= self.ymax
    }

    pub fn to_pixel_box(&self, width: u32, height: u32) -> PixelBox {
        to_pixel_box(self, width, height)
    }

    pub fn inflate(&self, factor: f64) -> FractionalBox {
        inflate(self, factor)
    }
}

impl PixelBox {
    pub fn to_rect(&self) -> PixelRect {
        box_to_pixel_rect(self)
    }
}

/// Scale a fractional box to a `width` x `height` image.
///
/// Each coordinate is `floor(extent * fraction)`, truncating like an integer
/// cast. Out-of-range fractions are not rejected; negative products saturate
/// to zero.
pub fn to_pixel_box(bbox: &FractionalBox, width: u32, height: u32) -> PixelBox {
    let w = f64::from(width);
    let h = f64::from(height);
    PixelBox {
        xmin: (w * bbox.xmin) as u32,
        ymin: (h * bbox.ymin) as u32,
        xmax: (w * bbox.xmax) as u32,
        ymax: (h * bbox.ymax) as u32,
    }
}

/// Grow a box by `factor` on every side, clamped to the unit square.
///
/// A factor of zero or less returns the box unchanged.
pub fn inflate(bbox: &FractionalBox, factor: f64) -> FractionalBox {
    if factor <= 0.0 {
        return *bbox;
    }
    FractionalBox {
        xmin: (bbox.xmin - factor).clamp(0.0, 1.0),
        ymin: (bbox.ymin - factor).clamp(0.0, 1.0),
        xmax: (bbox.xmax + factor).clamp(0.0, 1.0),
        ymax: (bbox.ymax + factor).clamp(0.0, 1.0),
    }
}

/// Convert a zone descriptor (origin + size as fractions of the document)
/// into a min/max box, going through physical millimetres.
///
/// The millimetre values are the source of truth in the metadata, so the
/// detour is kept even though it reduces to `xmin + width` when the units
/// agree.
pub fn mm_zone_to_fractional_box(
    descriptor: &ZoneDescriptor,
    width_mm: f64,
    height_mm: f64,
) -> FractionalBox {
    let mm_xmin = descriptor.x * width_mm;
    let mm_ymin = descriptor.y * height_mm;

    let mm_xmax = mm_xmin + width_mm * descriptor.width;
    let mm_ymax = mm_ymin + height_mm * descriptor.height;

    FractionalBox {
        xmin: descriptor.x,
        ymin: descriptor.y,
        xmax: mm_xmax / width_mm,
        ymax: mm_ymax / height_mm,
    }
}

/// Convert min/max pixel corners into origin + size. Inverted boxes yield
/// zero-sized rectangles.
pub fn box_to_pixel_rect(pixel_box: &PixelBox) -> PixelRect {
    PixelRect {
        x: pixel_box.xmin,
        y: pixel_box.ymin,
        width: pixel_box.xmax.saturating_sub(pixel_box.xmin),
        height: pixel_box.ymax.saturating_sub(pixel_box.ymin),
    }
}
