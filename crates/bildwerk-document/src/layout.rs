// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page layout arithmetic — fit an image into the 150 DPI raster of a paper
// format without upscaling, then place it centred on the page.
//
// A single DPI constant is used both for the raster canvas and for turning the
// fitted pixel size back into millimetres.

use bildwerk_core::PaperFormat;

/// Raster resolution images are fitted at.
pub const RASTER_DPI: f64 = 150.0;

/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// PostScript points per inch.
pub const PT_PER_INCH: f64 = 72.0;

/// Convert millimetres to PDF points.
pub fn mm_to_pt(mm: f64) -> f64 {
    mm / MM_PER_INCH * PT_PER_INCH
}

/// Convert raster pixels to millimetres at [`RASTER_DPI`].
pub fn px_to_mm(px: u32) -> f64 {
    px as f64 / RASTER_DPI * MM_PER_INCH
}

/// The pixel raster matching a paper format at [`RASTER_DPI`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width_px: u32,
    pub height_px: u32,
}

impl Canvas {
    pub fn for_paper(paper: PaperFormat) -> Self {
        let (w_mm, h_mm) = paper.dimensions_mm();
        Self {
            width_px: (w_mm as f64 / MM_PER_INCH * RASTER_DPI).round() as u32,
            height_px: (h_mm as f64 / MM_PER_INCH * RASTER_DPI).round() as u32,
        }
    }

    /// Largest size with the image's aspect ratio that fits on this canvas,
    /// never larger than the image itself.
    ///
    /// Both inputs must be non-zero. Each output axis is at least one pixel.
    pub fn fit(&self, width_px: u32, height_px: u32) -> (u32, u32) {
        let img_ratio = width_px as f64 / height_px as f64;
        let area_ratio = self.width_px as f64 / self.height_px as f64;

        let (draw_w, draw_h) = if img_ratio > area_ratio {
            let draw_w = width_px.min(self.width_px);
            let draw_h = (draw_w as f64 / img_ratio).round() as u32;
            (draw_w, draw_h)
        } else {
            let draw_h = height_px.min(self.height_px);
            let draw_w = (draw_h as f64 * img_ratio).round() as u32;
            (draw_w, draw_h)
        };

        (draw_w.max(1), draw_h.max(1))
    }
}

/// Where an image lands on the page, in millimetres from the bottom-left
/// corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

impl Placement {
    /// Scale a fitted pixel rectangle uniformly to the page and centre it.
    pub fn centred(draw_w_px: u32, draw_h_px: u32, paper: PaperFormat) -> Self {
        let (paper_w, paper_h) = paper.dimensions_mm();
        let (paper_w, paper_h) = (paper_w as f64, paper_h as f64);

        let draw_w_mm = px_to_mm(draw_w_px);
        let draw_h_mm = px_to_mm(draw_h_px);
        let ratio = (paper_w / draw_w_mm).min(paper_h / draw_h_mm);

        let width_mm = draw_w_mm * ratio;
        let height_mm = draw_h_mm * ratio;

        // The rectangle is centred, so measuring y from the top (as a
        // screen would) or from the bottom (as PDF does) gives the same value.
        Self {
            x_mm: (paper_w - width_mm) / 2.0,
            y_mm: (paper_h - height_mm) / 2.0,
            width_mm,
            height_mm,
        }
    }
}

/// The full layout of one image on one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedPage {
    pub paper: PaperFormat,
    pub draw_w_px: u32,
    pub draw_h_px: u32,
    pub placement: Placement,
}

impl FittedPage {
    pub fn compute(width_px: u32, height_px: u32, paper: PaperFormat) -> Self {
        let (draw_w_px, draw_h_px) = Canvas::for_paper(paper).fit(width_px, height_px);
        Self {
            paper,
            draw_w_px,
            draw_h_px,
            placement: Placement::centred(draw_w_px, draw_h_px, paper),
        }
    }
}
