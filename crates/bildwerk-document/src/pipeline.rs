// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page assembly — turn an ordered image selection into one PDF, one image per
// page, in selection order.
//
// Images are processed strictly one after another: each image is decoded,
// fitted, re-encoded and appended before the next one is touched, because the
// shared document must receive its pages in order. An image that cannot be
// decoded or encoded is logged and left out; it never aborts the run.

use std::path::{Path, PathBuf};

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::{ImageItem, PaperFormat, Quality, SelectionList};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::image::{EncodedJpeg, ImageProcessor};
use crate::layout::FittedPage;
use crate::pdf::writer::PdfWriter;

/// Fixed prefix of every generated file name.
pub const OUTPUT_PREFIX: &str = "images-to-pdf";

/// Stages of a conversion run, reported to the progress observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStage {
    /// No run in progress.
    Idle,
    /// Run accepted; about to process the first image.
    Running,
    /// Decoding the current image.
    Decoding,
    /// Computing the fitted rectangle for the current image.
    Fitting,
    /// Resampling and JPEG-encoding the current image.
    Encoding,
    /// The current image was placed on its page.
    PageAppended,
    /// The current image was left out.
    Skipped,
    /// Serialising the document.
    Finalizing,
    /// The document is complete and named.
    Saved,
}

/// One progress notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionProgress {
    pub stage: ConversionStage,
    /// Position of the image being processed, for per-image stages.
    pub index: Option<usize>,
    /// Number of images in the run.
    pub total: usize,
}

/// Per-run settings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConversionOptions {
    pub paper: PaperFormat,
    pub quality: Quality,
}

/// An image that did not make it into the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedImage {
    pub index: usize,
    pub name: String,
    pub reason: String,
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct ConversionReport {
    /// Suggested file name, see [`output_filename`].
    pub filename: String,
    /// The serialised PDF.
    pub pdf: Vec<u8>,
    /// Number of pages in the document.
    pub page_count: usize,
    /// Number of images placed; lower than the selection size when some were skipped.
    pub images_placed: usize,
    pub skipped: Vec<SkippedImage>,
}

type ProgressObserver = Box<dyn FnMut(ConversionProgress) + Send>;

/// Runs the page assembly pipeline.
pub struct PageAssembler {
    options: ConversionOptions,
    title: Option<String>,
    stage: ConversionStage,
    observer: Option<ProgressObserver>,
}

impl PageAssembler {
    pub fn new(options: ConversionOptions) -> Self {
        Self {
            options,
            title: None,
            stage: ConversionStage::Idle,
            observer: None,
        }
    }

    /// Title stored in the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Register a callback receiving every stage transition.
    pub fn on_progress(mut self, observer: impl FnMut(ConversionProgress) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Stage of the most recent run.
    pub fn stage(&self) -> ConversionStage {
        self.stage
    }

    /// Convert a snapshot of `selection` taken now. Later edits to the
    /// selection cannot affect the run.
    pub fn run(&mut self, selection: &SelectionList) -> Result<ConversionReport> {
        let snapshot = selection.snapshot();
        self.run_items(&snapshot, Utc::now())
    }

    /// Convert `items` in order, naming the output after `now`.
    ///
    /// Fails with [`BildwerkError::EmptySelection`] before doing anything if
    /// `items` is empty. Per-image failures are recorded in the report.
    #[instrument(skip(self, items, now), fields(images = items.len(), paper = ?self.options.paper))]
    pub fn run_items(&mut self, items: &[ImageItem], now: DateTime<Utc>) -> Result<ConversionReport> {
        if items.is_empty() {
            warn!("Conversion requested with no images selected");
            return Err(BildwerkError::EmptySelection);
        }

        let total = items.len();
        self.stage = ConversionStage::Idle;
        self.enter(ConversionStage::Running, None, total);
        info!(
            images = total,
            paper = %self.options.paper,
            quality = %self.options.quality,
            "Starting conversion"
        );

        let mut writer = PdfWriter::new(self.options.paper);
        if let Some(title) = &self.title {
            writer.set_title(title.clone());
        }

        let mut skipped = Vec::new();
        let mut images_placed = 0usize;

        for (index, item) in items.iter().enumerate() {
            match self.render_page(index, total, item) {
                Ok((jpeg, fitted)) => {
                    let page = writer.place_jpeg(jpeg, fitted.placement);
                    images_placed += 1;
                    debug!(index, page, name = %item.name, "Page appended");
                    self.enter(ConversionStage::PageAppended, Some(index), total);
                }
                Err(err) => {
                    warn!(index, name = %item.name, error = %err, "Failed to add image; skipping");
                    skipped.push(SkippedImage {
                        index,
                        name: item.name.clone(),
                        reason: err.to_string(),
                    });
                    self.enter(ConversionStage::Skipped, Some(index), total);
                }
            }
        }

        self.enter(ConversionStage::Finalizing, None, total);
        let page_count = writer.page_count();
        let pdf = writer.finish()?;
        let filename = output_filename(now);

        info!(
            filename = %filename,
            page_count,
            images_placed,
            skipped = skipped.len(),
            "Conversion complete"
        );
        self.enter(ConversionStage::Saved, None, total);

        Ok(ConversionReport {
            filename,
            pdf,
            page_count,
            images_placed,
            skipped,
        })
    }

    /// Decode, fit and re-encode one image.
    fn render_page(
        &mut self,
        index: usize,
        total: usize,
        item: &ImageItem,
    ) -> Result<(EncodedJpeg, FittedPage)> {
        self.enter(ConversionStage::Decoding, Some(index), total);
        let processor = ImageProcessor::from_bytes(&item.data)?;

        self.enter(ConversionStage::Fitting, Some(index), total);
        let fitted = FittedPage::compute(processor.width(), processor.height(), self.options.paper);
        debug!(
            index,
            source_w = processor.width(),
            source_h = processor.height(),
            draw_w = fitted.draw_w_px,
            draw_h = fitted.draw_h_px,
            "Image fitted"
        );

        self.enter(ConversionStage::Encoding, Some(index), total);
        let jpeg = processor
            .resize_exact(fitted.draw_w_px, fitted.draw_h_px)
            .to_jpeg(self.options.quality)?;

        Ok((jpeg, fitted))
    }

    fn enter(&mut self, stage: ConversionStage, index: Option<usize>, total: usize) {
        self.stage = stage;
        if let Some(observer) = self.observer.as_mut() {
            observer(ConversionProgress {
                stage,
                index,
                total,
            });
        }
    }
}

/// `images-to-pdf_<timestamp>.pdf`, where the timestamp is the ISO-8601 UTC
/// time truncated to seconds with `:` and `T` replaced by `-`.
pub fn output_filename(now: DateTime<Utc>) -> String {
    let stamp = now
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
        .replace([':', 'T'], "-");
    format!("{OUTPUT_PREFIX}_{stamp}.pdf")
}

/// Write the report's PDF into `dir` under its generated name, creating the
/// directory if needed. Returns the full path written.
#[instrument(skip_all, fields(filename = %report.filename))]
pub fn save_report(report: &ConversionReport, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let path = dir.join(&report.filename);
    std::fs::write(&path, &report.pdf)?;
    info!(path = %path.display(), bytes = report.pdf.len(), "PDF saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::TimeZone;

    use super::*;

    fn png(width: u32, height: u32) -> ImageItem {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([30, 120, 220]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        ImageItem::new(format!("{width}x{height}.png"), "image/png", out)
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap()
    }

    #[test]
    fn filename_replaces_separators() {
        assert_eq!(output_filename(fixed_time()), "images-to-pdf_2024-03-09-07-05-01.pdf");
    }

    #[test]
    fn empty_run_is_refused_and_stays_idle() {
        let mut assembler = PageAssembler::new(ConversionOptions::default());
        let err = assembler.run(&SelectionList::new()).unwrap_err();
        assert!(matches!(err, BildwerkError::EmptySelection));
        assert_eq!(assembler.stage(), ConversionStage::Idle);
    }

    #[test]
    fn stages_follow_the_state_machine() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut assembler = PageAssembler::new(ConversionOptions::default())
            .on_progress(move |p| sink.lock().unwrap().push((p.stage, p.index)));

        let items = vec![png(8, 8), ImageItem::new("bad.png", "image/png", b"nope".to_vec())];
        let report = assembler.run_items(&items, fixed_time()).unwrap();
        assert_eq!(report.images_placed, 1);

        use ConversionStage::*;
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (Running, None),
                (Decoding, Some(0)),
                (Fitting, Some(0)),
                (Encoding, Some(0)),
                (PageAppended, Some(0)),
                (Decoding, Some(1)),
                (Skipped, Some(1)),
                (Finalizing, None),
                (Saved, None),
            ]
        );
        assert_eq!(assembler.stage(), Saved);
    }

    #[test]
    fn skipped_images_are_reported_with_reason() {
        let items = vec![ImageItem::new("broken.jpg", "image/jpeg", vec![0xFF, 0xD8, 0x00])];
        let report = PageAssembler::new(ConversionOptions::default())
            .run_items(&items, fixed_time())
            .unwrap();
        assert_eq!(report.images_placed, 0);
        // The document keeps its initial blank page.
        assert_eq!(report.page_count, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].name, "broken.jpg");
        assert!(report.skipped[0].reason.contains("decod"));
    }

    #[test]
    fn run_uses_a_snapshot() {
        let mut selection = SelectionList::new();
        selection.append(vec![png(10, 20), png(20, 10)]);
        let mut assembler = PageAssembler::new(ConversionOptions::default());
        let report = assembler.run(&selection).unwrap();
        assert_eq!(report.page_count, 2);
        assert_eq!(selection.len(), 2);
    }
}
