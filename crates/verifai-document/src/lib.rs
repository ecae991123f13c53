// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// verifai-document — The client-side model of one classified document.
//
// A `Document` wraps the classifier's answer and the submitted image, and
// lazily derives everything else on request: the cropped document image, the
// id-model metadata, the zone list, and the MRZ reader. Each derived value is
// computed at most once per document and cached for its lifetime.

pub mod classify;
pub mod document;
pub mod image;
pub mod mrz;
pub mod zone;

mod memo;

#[cfg(test)]
pub(crate) mod testing;

pub use classify::{classify_image, classify_image_path};
pub use document::Document;
pub use crate::image::processor::ImageProcessor;
pub use mrz::{MRZ_TOLERANCE, MrzReader};
pub use zone::Zone;
