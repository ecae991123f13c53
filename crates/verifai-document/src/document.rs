// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document model — one classified document and everything derived from it.
//
// Derivation graph (each node computed at most once per document):
//
//   image ──► cropped image ──► part-of-card crops / masks
//   uuid  ──► model metadata ──► zones ──► MRZ reader ──► OCR result
//
// Loading a new image only invalidates the cropped image: metadata, zones,
// and the MRZ reader are keyed by the id-model uuid, not by pixels.

use std::sync::{Arc, PoisonError, RwLock};

use image::DynamicImage;
use tracing::{debug, info, instrument};

use verifai_core::dispatch::Dispatcher;
use verifai_core::error::{Result, VerifaiError};
use verifai_core::geometry::{self, FractionalBox};
use verifai_core::types::{ClassificationResult, ModelMetadata, Side};

use crate::image::processor::{self, ImageProcessor, MASK_COLOR};
use crate::memo::Memo;
use crate::mrz::{MrzReader, MrzState};
use crate::zone::{self, Zone};

/// A classified identity document.
///
/// Cheap accessors return immediately; everything else is fetched or computed
/// on first use and cached. A `Document` is `Sync`: concurrent first readers
/// of a derived value wait for a single computation.
pub struct Document {
    dispatcher: Arc<dyn Dispatcher>,
    classification: ClassificationResult,
    image: RwLock<Arc<DynamicImage>>,
    cropped: Memo<DynamicImage>,
    model_data: Memo<ModelMetadata>,
    zones: Memo<Vec<Zone>>,
    mrz: Memo<MrzState>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("classification", &self.classification)
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Build a document around a classification and the encoded image it was
    /// made from.
    pub fn new(
        classification: ClassificationResult,
        dispatcher: Arc<dyn Dispatcher>,
        image_bytes: &[u8],
    ) -> Result<Self> {
        let image = ImageProcessor::from_bytes(image_bytes)?.into_dynamic();
        Ok(Self::from_image(classification, dispatcher, image))
    }

    /// Build a document around an already-decoded image.
    pub fn from_image(
        classification: ClassificationResult,
        dispatcher: Arc<dyn Dispatcher>,
        image: DynamicImage,
    ) -> Self {
        debug!(
            uuid = %classification.uuid,
            side = %classification.side,
            width = image.width(),
            height = image.height(),
            "document created"
        );
        Self {
            dispatcher,
            classification,
            image: RwLock::new(Arc::new(image)),
            cropped: Memo::new(),
            model_data: Memo::new(),
            zones: Memo::new(),
            mrz: Memo::new(),
        }
    }

    // -- Classification -------------------------------------------------------

    pub(crate) fn dispatcher(&self) -> &dyn Dispatcher {
        self.dispatcher.as_ref()
    }

    pub fn classification(&self) -> &ClassificationResult {
        &self.classification
    }

    /// Verifai's internal id-model UUID.
    pub fn uuid(&self) -> &str {
        &self.classification.uuid
    }

    /// The side of the document that was photographed.
    pub fn side(&self) -> Side {
        self.classification.side
    }

    /// Where the document sits in the full image.
    pub fn position_in_image(&self) -> FractionalBox {
        self.classification.bbox
    }

    // -- Images ---------------------------------------------------------------

    /// The full original image.
    pub fn image(&self) -> Arc<DynamicImage> {
        Arc::clone(&self.image.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replace the original image. Only the cropped-image cache is reset; on a
    /// decode failure the current image is kept.
    #[instrument(skip(self, image_bytes), fields(uuid = %self.classification.uuid))]
    pub fn load_image(&self, image_bytes: &[u8]) -> Result<()> {
        let image = Arc::new(ImageProcessor::from_bytes(image_bytes)?.into_dynamic());
        self.cropped.reset_with(|| {
            *self.image.write().unwrap_or_else(PoisonError::into_inner) = image;
        });
        info!("image replaced, cropped image invalidated");
        Ok(())
    }

    /// The document cut out of the full image along the classifier's box.
    pub fn cropped_image(&self) -> Result<Arc<DynamicImage>> {
        self.cropped.get_or_try_init(|| {
            let image = self.image();
            let region =
                geometry::to_pixel_box(&self.classification.bbox, image.width(), image.height());
            let cropped = processor::crop_region(&image, &region)?;
            debug!(
                width = cropped.width(),
                height = cropped.height(),
                "document cropped"
            );
            Ok(cropped)
        })
    }

    /// A part of the cropped document, grown by `tolerance` (a fraction of the
    /// document size) on every side before cutting.
    pub fn part_of_card_image(&self, bbox: &FractionalBox, tolerance: f64) -> Result<DynamicImage> {
        let cropped = self.cropped_image()?;
        let bbox = geometry::inflate(bbox, tolerance);
        let region = geometry::to_pixel_box(&bbox, cropped.width(), cropped.height());
        processor::crop_region(&cropped, &region)
    }

    /// A copy of the cropped image with every zone blacked out.
    ///
    /// With `filter_sides`, zones printed on the other side of the document
    /// are left alone.
    pub fn mask_zones(&self, zones: &[Zone], filter_sides: bool) -> Result<DynamicImage> {
        let cropped = self.cropped_image()?;
        Ok(self.mask_zones_on(&cropped, zones, filter_sides))
    }

    /// [`mask_zones`](Self::mask_zones) on a caller-supplied image.
    pub fn mask_zones_on(
        &self,
        image: &DynamicImage,
        zones: &[Zone],
        filter_sides: bool,
    ) -> DynamicImage {
        let (width, height) = (image.width(), image.height());
        let regions: Vec<_> = zones
            .iter()
            .filter(|zone| !filter_sides || zone.side() == self.side())
            .map(|zone| geometry::to_pixel_box(&zone.position_in_image(), width, height))
            .collect();
        debug!(zones = zones.len(), masked = regions.len(), "masking zones");
        ImageProcessor::from_dynamic(image.clone())
            .fill_regions(&regions, MASK_COLOR)
            .into_dynamic()
    }

    // -- Metadata -------------------------------------------------------------

    /// The id-model metadata, fetched on first use.
    ///
    /// Only a successful, non-empty fetch is cached; after an error or an
    /// empty answer the next call asks again.
    pub fn model_data(&self) -> Result<Option<Arc<ModelMetadata>>> {
        self.model_data
            .get_or_try_init_some(|| self.dispatcher.fetch_metadata(self.uuid()))
    }

    /// Model name, e.g. `"Dutch ID 2014"`.
    pub fn model(&self) -> Result<Option<String>> {
        Ok(self.model_data()?.map(|m| m.model.clone()))
    }

    /// ISO 3166-1 alpha-2 country code, e.g. `"NL"`.
    pub fn country(&self) -> Result<Option<String>> {
        Ok(self.model_data()?.map(|m| m.country.clone()))
    }

    /// Physical size as `(width_mm, height_mm)`.
    pub fn actual_size_mm(&self) -> Result<Option<(f64, f64)>> {
        Ok(self.model_data()?.map(|m| m.actual_size_mm()))
    }

    // -- Zones ----------------------------------------------------------------

    /// Every zone of the model, in metadata order.
    ///
    /// Without metadata this is an empty list that is not cached, so zones
    /// appear once metadata becomes available.
    pub fn zones(&self) -> Result<Arc<Vec<Zone>>> {
        let Some(metadata) = self.model_data()? else {
            return Ok(Arc::new(Vec::new()));
        };
        self.zones
            .get_or_try_init(|| Ok(zone::build_zones(&metadata)))
    }

    /// The first zone titled "MRZ", if the model has one.
    pub fn mrz_zone(&self) -> Result<Option<Zone>> {
        Ok(self.zones()?.iter().find(|zone| zone.is_mrz()).cloned())
    }

    /// The MRZ reader for this document, if the model has an MRZ.
    ///
    /// The reader is created once; later calls hand out the same reader and
    /// therefore the same cached OCR result.
    pub fn mrz(&self) -> Result<Option<MrzReader<'_>>> {
        let state = self.mrz.get_or_try_init_some(|| {
            Ok::<_, VerifaiError>(self.mrz_zone()?.map(MrzState::new))
        })?;
        Ok(state.map(|state| MrzReader::new(self, state)))
    }
}
