// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, resample to a fitted size and re-encode as JPEG.
// Operates on in-memory images using the `image` crate.

use bildwerk_core::Quality;
use bildwerk_core::error::BildwerkError;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use tracing::{debug, instrument};

/// A JPEG ready to embed in a page, with its pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedJpeg {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Image processing pipeline operating on a single in-memory image.
///
/// Operations consume `self` and return a new `ImageProcessor`, enabling
/// method chaining:
///
/// ```ignore
/// let jpeg = ImageProcessor::from_bytes(&bytes)?
///     .resize_exact(800, 600)
///     .to_jpeg(Quality::DEFAULT)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    ///
    /// Images with a zero-sized axis are rejected since they cannot be placed.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, BildwerkError> {
        let img = image::load_from_memory(data)
            .map_err(|err| BildwerkError::Decode(format!("failed to decode image: {}", err)))?;
        if img.width() == 0 || img.height() == 0 {
            return Err(BildwerkError::Decode(format!(
                "image has no pixels ({}x{})",
                img.width(),
                img.height()
            )));
        }
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

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    // -- Transformations ------------------------------------------------------

    /// Resize the image to exactly `width` x `height`, ignoring aspect ratio.
    /// Uses Lanczos3 filtering; a no-op when the size already matches.
    #[instrument(skip(self))]
    pub fn resize_exact(self, width: u32, height: u32) -> Self {
        if self.image.width() == width && self.image.height() == height {
            return self;
        }
        debug!(
            from_w = self.image.width(),
            from_h = self.image.height(),
            "Resizing image"
        );
        let resized = self
            .image
            .resize_exact(width, height, FilterType::Lanczos3);
        debug!(
            new_w = resized.width(),
            new_h = resized.height(),
            "Resize complete"
        );
        Self { image: resized }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as a baseline RGB JPEG.
    ///
    /// Transparency is dropped; the colour channels are kept as-is.
    pub fn to_jpeg(&self, quality: Quality) -> Result<EncodedJpeg, BildwerkError> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.jpeg_quality());
        rgb.write_with_encoder(encoder)
            .map_err(|err| BildwerkError::Encode(format!("JPEG encoding failed: {}", err)))?;
        debug!(
            quality = quality.jpeg_quality(),
            bytes = buffer.len(),
            "JPEG encoded"
        );
        Ok(EncodedJpeg {
            data: buffer,
            width: rgb.width(),
            height: rgb.height(),
        })
    }
}
