// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open and inspect generated documents (page count, page sizes,
// embedded images and metadata) using the `lopdf` crate.

use std::path::Path;

use bildwerk_core::error::BildwerkError;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info, instrument};

use crate::layout::{MM_PER_INCH, PT_PER_INCH};

/// Read-only view of a PDF document.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BildwerkError> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            BildwerkError::Pdf(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");
        Ok(Self { document })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, BildwerkError> {
        let document = Document::load_mem(data).map_err(|err| {
            BildwerkError::Pdf(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Width and height of a page (1-indexed) in millimetres, from its /MediaBox.
    pub fn page_size_mm(&self, page_number: u32) -> Result<(f32, f32), BildwerkError> {
        let page = self.page_dictionary(page_number)?;
        let media_box = page
            .get(b"MediaBox")
            .and_then(Object::as_array)
            .map_err(|err| BildwerkError::Pdf(format!("page {} has no /MediaBox: {}", page_number, err)))?;

        let coords = media_box
            .iter()
            .map(Object::as_float)
            .collect::<Result<Vec<f32>, _>>()
            .map_err(|err| BildwerkError::Pdf(format!("malformed /MediaBox: {}", err)))?;
        if coords.len() != 4 {
            return Err(BildwerkError::Pdf(format!(
                "/MediaBox has {} entries, expected 4",
                coords.len()
            )));
        }

        let to_mm = |pt: f32| pt / PT_PER_INCH as f32 * MM_PER_INCH as f32;
        Ok((to_mm(coords[2] - coords[0]), to_mm(coords[3] - coords[1])))
    }

    /// Pixel sizes (width, height) of the image XObjects a page (1-indexed)
    /// references, in resource-name order.
    pub fn page_images(&self, page_number: u32) -> Result<Vec<(u32, u32)>, BildwerkError> {
        let page = self.page_dictionary(page_number)?;
        let Ok(resources) = page.get(b"Resources") else {
            return Ok(Vec::new());
        };
        let resources = self.resolve(resources)?.as_dict().map_err(pdf_err)?;
        let Ok(xobjects) = resources.get(b"XObject") else {
            return Ok(Vec::new());
        };
        let xobjects = self.resolve(xobjects)?.as_dict().map_err(pdf_err)?;

        let mut sizes = Vec::new();
        for (_name, value) in xobjects.iter() {
            let stream = self.resolve(value)?.as_stream().map_err(pdf_err)?;
            let is_image = stream
                .dict
                .get(b"Subtype")
                .and_then(Object::as_name)
                .map(|name| name == b"Image")
                .unwrap_or(false);
            if !is_image {
                continue;
            }
            let width = stream.dict.get(b"Width").and_then(Object::as_i64).map_err(pdf_err)?;
            let height = stream.dict.get(b"Height").and_then(Object::as_i64).map_err(pdf_err)?;
            sizes.push((width as u32, height as u32));
        }
        Ok(sizes)
    }

    /// The /Title entry of the document information dictionary, if any.
    pub fn title(&self) -> Option<String> {
        let info = self.document.trailer.get(b"Info").ok()?;
        let info = self.resolve(info).ok()?.as_dict().ok()?;
        match info.get(b"Title").ok()? {
            Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }

    // -- Helpers --------------------------------------------------------------

    fn page_id(&self, page_number: u32) -> Result<ObjectId, BildwerkError> {
        let pages = self.document.get_pages();
        pages.get(&page_number).copied().ok_or_else(|| {
            BildwerkError::Pdf(format!(
                "page {} out of range (document has {} pages)",
                page_number,
                pages.len()
            ))
        })
    }

    fn page_dictionary(&self, page_number: u32) -> Result<&Dictionary, BildwerkError> {
        let id = self.page_id(page_number)?;
        self.document.get_dictionary(id).map_err(|err| {
            BildwerkError::Pdf(format!("cannot read page {}: {}", page_number, err))
        })
    }

    /// Follow a reference to the object it points at.
    fn resolve<'a>(&'a self, object: &'a Object) -> Result<&'a Object, BildwerkError> {
        match object {
            Object::Reference(id) => self.document.get_object(*id).map_err(pdf_err),
            other => Ok(other),
        }
    }
}

fn pdf_err(err: lopdf::Error) -> BildwerkError {
    BildwerkError::Pdf(err.to_string())
}
