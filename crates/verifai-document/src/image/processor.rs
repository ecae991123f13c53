// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, crop, fill rectangles, and encode. The only
// image primitives the document model needs, implemented with the `image`
// and `imageproc` crates.

use image::{DynamicImage, ImageFormat, Rgba};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::{debug, instrument};
use verifai_core::error::VerifaiError;
use verifai_core::geometry::{PixelBox, PixelRect};

/// Opaque black, the colour masked zones are filled with.
pub const MASK_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Image processing pipeline operating on a single in-memory image.
///
/// Transformations consume `self` and return a new `ImageProcessor`, so
/// calls chain:
///
/// ```ignore
/// let jpeg = ImageProcessor::from_bytes(&photo)?
///     .fill_regions(&zones, MASK_COLOR)
///     .to_jpeg_bytes(90)?;
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, VerifaiError> {
        let img = image::load_from_memory(data).map_err(|err| {
            VerifaiError::ImageError(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) ----------------------

    /// Fill every region with `color`, corners inclusive. Regions reaching past
    /// the image edge are clipped.
    #[instrument(skip(self, regions), fields(regions = regions.len()))]
    pub fn fill_regions(self, regions: &[PixelBox], color: Rgba<u8>) -> Self {
        let mut canvas = self.image.to_rgba8();
        for region in regions {
            let rect = region.to_rect();
            let filled = Rect::at(to_i32(rect.x), to_i32(rect.y))
                .of_size(rect.width.saturating_add(1), rect.height.saturating_add(1));
            draw_filled_rect_mut(&mut canvas, filled, color);
        }
        debug!("Regions filled");
        Self {
            image: DynamicImage::ImageRgba8(canvas),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, VerifaiError> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| VerifaiError::ImageError(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, VerifaiError> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder).map_err(|err| {
            VerifaiError::ImageError(format!("JPEG encoding failed: {}", err))
        })?;
        Ok(buffer)
    }
}

/// Copy the `region` of `image` out as a new image.
///
/// Fails when the region is empty once clamped to the image, since nothing
/// downstream can use a zero-sized crop.
pub fn crop_region(image: &DynamicImage, region: &PixelBox) -> Result<DynamicImage, VerifaiError> {
    let rect = clamp_rect(image.width(), image.height(), region.to_rect());
    if rect.width == 0 || rect.height == 0 {
        return Err(VerifaiError::ImageError(format!(
            "crop region {region:?} is empty in a {}x{} image",
            image.width(),
            image.height()
        )));
    }
    Ok(image.crop_imm(rect.x, rect.y, rect.width, rect.height))
}

fn clamp_rect(img_w: u32, img_h: u32, rect: PixelRect) -> PixelRect {
    let x = rect.x.min(img_w);
    let y = rect.y.min(img_h);
    PixelRect {
        x,
        y,
        width: rect.width.min(img_w - x),
        height: rect.height.min(img_h - y),
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
