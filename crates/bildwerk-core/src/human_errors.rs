// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion.

use crate::error::BildwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Something on disk or in the environment got in the way; trying again
    /// may work.
    Transient,
    /// User must do something (select images, fix a setting).
    ActionRequired,
    /// The input itself is unusable.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Severity level.
    pub severity: Severity,
}

/// Convert a `BildwerkError` into a `HumanError`.
pub fn humanize_error(err: &BildwerkError) -> HumanError {
    match err {
        BildwerkError::EmptySelection => HumanError {
            message: "No images selected.".into(),
            suggestion: "Add one or more image files (JPEG, PNG, GIF, WebP, ...) and try again."
                .into(),
            severity: Severity::ActionRequired,
        },

        BildwerkError::OutOfRange { index, len } => HumanError {
            message: format!("There is no image at position {index}."),
            suggestion: if *len == 0 {
                "The selection is empty.".into()
            } else {
                format!("Positions start at 0; the last one is {}.", len - 1)
            },
            severity: Severity::ActionRequired,
        },

        BildwerkError::Decode(detail) => HumanError {
            message: "One of the images could not be read.".into(),
            suggestion: format!("The file may be damaged or in an unsupported format. ({detail})"),
            severity: Severity::Permanent,
        },

        BildwerkError::Encode(detail) => HumanError {
            message: "One of the images could not be compressed.".into(),
            suggestion: format!("Try a different quality setting. ({detail})"),
            severity: Severity::Permanent,
        },

        BildwerkError::InvalidQuality(detail) => HumanError {
            message: "The quality setting is not valid.".into(),
            suggestion: format!("Use a number greater than 0 and at most 1, such as 0.92. ({detail})"),
            severity: Severity::ActionRequired,
        },

        BildwerkError::Pdf(detail) => HumanError {
            message: "The PDF could not be created.".into(),
            suggestion: format!("Try again with fewer images. ({detail})"),
            severity: Severity::Permanent,
        },

        BildwerkError::Io(io) => HumanError {
            message: "A file could not be read or written.".into(),
            suggestion: format!("Check that the folder exists and you have permission to write to it. ({io})"),
            severity: Severity::Transient,
        },

        BildwerkError::Serialization(detail) => HumanError {
            message: "The saved settings could not be read.".into(),
            suggestion: format!("Delete the settings file to restore defaults. ({detail})"),
            severity: Severity::ActionRequired,
        },
    }
}
