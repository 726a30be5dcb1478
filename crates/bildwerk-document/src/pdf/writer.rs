// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — build a multi-page document with one JPEG image per page using
// `lopdf`.
//
// JPEG data is embedded verbatim as a `DCTDecode` image XObject, so the
// encoder quality chosen upstream directly determines the file size.

use bildwerk_core::PaperFormat;
use bildwerk_core::error::BildwerkError;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use tracing::{debug, info, instrument};

use crate::image::EncodedJpeg;
use crate::layout::{Placement, mm_to_pt};

/// Resource name every page uses for its image.
const IMAGE_RESOURCE: &str = "Im1";

/// An image drawn on a page.
#[derive(Debug, Clone, Copy)]
struct PlacedImage {
    xobject_id: ObjectId,
    placement: Placement,
}

/// Accumulates pages and serialises them into a PDF.
///
/// Like a freshly opened document, the writer starts out with one blank page.
/// The first image is drawn on it; each further image opens a new page first.
pub struct PdfWriter {
    /// Paper format of every page.
    paper: PaperFormat,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
    document: Document,
    /// One entry per page, `None` while the page is still blank.
    pages: Vec<Option<PlacedImage>>,
}

impl PdfWriter {
    /// Create a new writer targeting the given paper format.
    pub fn new(paper: PaperFormat) -> Self {
        Self {
            paper,
            title: None,
            document: Document::with_version("1.5"),
            pages: vec![None],
        }
    }

    /// Create a new writer defaulting to A4.
    pub fn a4() -> Self {
        Self::new(PaperFormat::A4)
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Number of pages the finished document will have.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Draw a JPEG at `placement`, on the initial page if it is still blank
    /// and on a new page otherwise. Returns the 1-indexed page number used.
    #[instrument(skip(self, jpeg), fields(width = jpeg.width, height = jpeg.height, bytes = jpeg.data.len()))]
    pub fn place_jpeg(&mut self, jpeg: EncodedJpeg, placement: Placement) -> usize {
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => jpeg.width as i64,
                "Height" => jpeg.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg.data,
        );
        let xobject_id = self.document.add_object(stream);

        if matches!(self.pages.last(), Some(Some(_))) {
            self.pages.push(None);
            debug!(page = self.pages.len(), "Added page");
        }
        let page_number = self.pages.len();
        if let Some(slot) = self.pages.last_mut() {
            *slot = Some(PlacedImage {
                xobject_id,
                placement,
            });
        }

        debug!(
            page_number,
            x_mm = placement.x_mm,
            y_mm = placement.y_mm,
            width_mm = placement.width_mm,
            height_mm = placement.height_mm,
            "Image placed on page"
        );
        page_number
    }

    /// Serialise the document.
    #[instrument(skip(self), fields(pages = self.pages.len()))]
    pub fn finish(mut self) -> Result<Vec<u8>, BildwerkError> {
        let (w_mm, h_mm) = self.paper.dimensions_mm();
        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            Object::Real(mm_to_pt(w_mm as f64) as f32),
            Object::Real(mm_to_pt(h_mm as f64) as f32),
        ];

        let pages_id = self.document.new_object_id();
        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());

        for page in std::mem::take(&mut self.pages) {
            let (operations, resources) = match page {
                Some(placed) => (
                    draw_image_ops(&placed.placement),
                    dictionary! {
                        "XObject" => dictionary! { IMAGE_RESOURCE => placed.xobject_id },
                    },
                ),
                None => (Vec::new(), Dictionary::new()),
            };

            let content = Content { operations }.encode().map_err(|err| {
                BildwerkError::Pdf(format!("failed to encode page content: {}", err))
            })?;
            let content_id = self.document.add_object(Stream::new(dictionary! {}, content));

            let page_id = self.document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box.clone(),
                "Resources" => resources,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len();
        self.document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
            }),
        );

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        self.document.trailer.set("Root", catalog_id);

        let title = self.title.as_deref().unwrap_or("Images to PDF");
        let info_id = self.document.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "Producer" => Object::string_literal("Bildwerk"),
        });
        self.document.trailer.set("Info", info_id);

        self.document.compress();

        let mut output = Vec::new();
        self.document.save_to(&mut output).map_err(|err| {
            BildwerkError::Pdf(format!("failed to serialise PDF: {}", err))
        })?;

        info!(
            paper = %self.paper,
            pages = page_count,
            output_bytes = output.len(),
            "PDF written"
        );
        Ok(output)
    }
}

/// Content stream operations drawing the page image into its rectangle.
fn draw_image_ops(placement: &Placement) -> Vec<Operation> {
    let x = mm_to_pt(placement.x_mm) as f32;
    let y = mm_to_pt(placement.y_mm) as f32;
    let w = mm_to_pt(placement.width_mm) as f32;
    let h = mm_to_pt(placement.height_mm) as f32;

    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                Object::Real(w),
                0.into(),
                0.into(),
                Object::Real(h),
                Object::Real(x),
                Object::Real(y),
            ],
        ),
        Operation::new("Do", vec![Object::Name(IMAGE_RESOURCE.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ]
}
