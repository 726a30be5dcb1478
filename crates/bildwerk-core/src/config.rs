// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::{PaperFormat, Quality};

/// Persistent application settings. Command-line flags override these per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Paper format used when none is given.
    pub default_paper: PaperFormat,
    /// JPEG quality used when none is given.
    pub default_quality: Quality,
    /// Where generated PDFs are written. `None` means the current directory.
    pub output_dir: Option<PathBuf>,
    /// Title stored in the PDF /Info dictionary.
    pub document_title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_paper: PaperFormat::A4,
            default_quality: Quality::DEFAULT,
            output_dir: None,
            document_title: "Images to PDF".into(),
        }
    }
}
