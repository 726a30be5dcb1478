// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: paper formats, JPEG quality, and selected images.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::BildwerkError;

/// MIME type used for anything whose extension is not a known image type.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Supported paper formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaperFormat {
    #[default]
    A4,
    Letter,
}

impl PaperFormat {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::Letter => (216, 279),
        }
    }

    /// Lowercase key as accepted on the command line and in config files.
    pub fn key(&self) -> &'static str {
        match self {
            Self::A4 => "a4",
            Self::Letter => "letter",
        }
    }

    /// Look up a format by its key, case-insensitively.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "a4" => Some(Self::A4),
            "letter" => Some(Self::Letter),
            _ => None,
        }
    }

    /// Like [`PaperFormat::from_key`] but falls back to A4 for unknown keys.
    pub fn from_key_or_default(key: &str) -> Self {
        Self::from_key(key).unwrap_or_default()
    }
}

impl fmt::Display for PaperFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.dimensions_mm();
        match self {
            Self::A4 => write!(f, "A4 ({w}x{h} mm)"),
            Self::Letter => write!(f, "Letter ({w}x{h} mm)"),
        }
    }
}

/// JPEG re-encoding quality, a fraction in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Quality(f32);

impl Quality {
    pub const DEFAULT: Quality = Quality(0.92);

    /// Validate a fractional quality value.
    pub fn new(value: f32) -> Result<Self, BildwerkError> {
        if value.is_finite() && value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(BildwerkError::InvalidQuality(format!(
                "{value} is not in (0, 1]"
            )))
        }
    }

    /// Parse user input, falling back to the default when it is unparsable
    /// or outside (0, 1].
    pub fn parse_or_default(raw: &str) -> Self {
        raw.trim()
            .parse::<f32>()
            .ok()
            .and_then(|value| Self::new(value).ok())
            .unwrap_or_default()
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    /// Quality on the 1..=100 scale used by JPEG encoders.
    pub fn jpeg_quality(&self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f32> for Quality {
    type Error = BildwerkError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for f32 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// One selected image: encoded bytes plus the media type it was declared with.
///
/// The bytes are reference-counted so a conversion run can snapshot the
/// selection without copying image data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageItem {
    /// Display name (usually the file name), used for logs and reports only.
    pub name: String,
    /// Declared MIME type, e.g. `image/png`.
    pub media_type: String,
    /// Encoded image bytes.
    pub data: Arc<[u8]>,
}

impl ImageItem {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    /// Whether the declared media type is an image type.
    pub fn is_image(&self) -> bool {
        is_image_media_type(&self.media_type)
    }
}

/// True for any `image/*` MIME type.
pub fn is_image_media_type(media_type: &str) -> bool {
    media_type
        .trim()
        .to_ascii_lowercase()
        .starts_with("image/")
}

/// Infer a MIME type from a file extension.
pub fn media_type_from_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" | "jpe" | "jfif" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "ico" => "image/x-icon",
        "tga" => "image/x-tga",
        "pbm" | "pgm" | "ppm" | "pnm" => "image/x-portable-anymap",
        "qoi" => "image/qoi",
        "hdr" => "image/vnd.radiance",
        "exr" => "image/x-exr",
        "avif" => "image/avif",
        _ => OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paper_dimensions() {
        assert_eq!(PaperFormat::A4.dimensions_mm(), (210, 297));
        assert_eq!(PaperFormat::Letter.dimensions_mm(), (216, 279));
    }

    #[test]
    fn unknown_paper_falls_back_to_a4() {
        assert_eq!(PaperFormat::from_key_or_default("LETTER"), PaperFormat::Letter);
        assert_eq!(PaperFormat::from_key_or_default("tabloid"), PaperFormat::A4);
        assert_eq!(PaperFormat::from_key("legal"), None);
    }

    #[test]
    fn quality_parsing_falls_back_to_default() {
        assert_eq!(Quality::parse_or_default("0.5").value(), 0.5);
        assert_eq!(Quality::parse_or_default("1").value(), 1.0);
        assert_eq!(Quality::parse_or_default("high"), Quality::DEFAULT);
        assert_eq!(Quality::parse_or_default("0"), Quality::DEFAULT);
        assert_eq!(Quality::parse_or_default("1.5"), Quality::DEFAULT);
        assert_eq!(Quality::parse_or_default("NaN"), Quality::DEFAULT);
    }

    #[test]
    fn jpeg_quality_scale() {
        assert_eq!(Quality::DEFAULT.jpeg_quality(), 92);
        assert_eq!(Quality::new(1.0).unwrap().jpeg_quality(), 100);
        assert_eq!(Quality::new(0.001).unwrap().jpeg_quality(), 1);
    }

    #[test]
    fn quality_rejects_out_of_range_in_config() {
        let err = serde_json::from_str::<Quality>("1.2").unwrap_err();
        assert!(err.to_string().contains("not in (0, 1]"));
        let ok: Quality = serde_json::from_str("0.75").unwrap();
        assert_eq!(ok.value(), 0.75);
    }

    #[test]
    fn media_type_detection() {
        assert_eq!(media_type_from_extension("JPG"), "image/jpeg");
        assert_eq!(media_type_from_extension("png"), "image/png");
        assert_eq!(media_type_from_extension("txt"), OCTET_STREAM);
        assert!(is_image_media_type("Image/PNG"));
        assert!(!is_image_media_type("application/pdf"));
    }
}
