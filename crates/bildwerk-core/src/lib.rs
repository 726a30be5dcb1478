// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bildwerk — Core types, the image selection list and error definitions
// shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod selection;
pub mod types;

pub use config::AppConfig;
pub use error::BildwerkError;
pub use selection::{SelectionList, SelectionStatus};
pub use types::*;
