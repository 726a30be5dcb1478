// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildwerk-document — Image-to-PDF page assembly for Bildwerk.
//
// Provides image decoding and JPEG re-encoding, the fit/placement arithmetic
// that sizes each image for a paper format, a PDF writer and reader, and the
// page assembly pipeline that ties them together.

pub mod image;
pub mod layout;
pub mod pdf;
pub mod pipeline;

// Re-export the primary types so callers can use `bildwerk_document::PageAssembler` etc.
pub use self::image::processor::ImageProcessor;
pub use layout::{Canvas, FittedPage, Placement};
pub use pdf::reader::PdfReader;
pub use pdf::writer::PdfWriter;
pub use pipeline::{
    ConversionOptions, ConversionProgress, ConversionReport, ConversionStage, PageAssembler,
    SkippedImage, output_filename, save_report,
};
