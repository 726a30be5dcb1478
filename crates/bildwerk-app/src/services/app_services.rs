// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — loads settings, turns files on disk into a
// selection, and runs the page assembly pipeline for the command line.

use std::path::{Path, PathBuf};

use bildwerk_core::error::Result;
use bildwerk_core::{AppConfig, ImageItem, SelectionList, media_type_from_extension};
use bildwerk_document::{ConversionOptions, ConversionProgress, ConversionReport, PageAssembler, save_report};
use tracing::{debug, info, warn};

use super::data_dir;

/// Settings and data directory for one invocation.
#[derive(Debug, Clone)]
pub struct AppServices {
    data_dir: PathBuf,
    config: AppConfig,
}

impl AppServices {
    /// Resolve the data directory and load persisted settings.
    pub fn init() -> Self {
        Self::with_data_dir(data_dir::data_dir())
    }

    /// Use `dir` as the data directory.
    pub fn with_data_dir(dir: PathBuf) -> Self {
        // Load persisted config or use defaults
        let config = load_config(&dir).unwrap_or_default();
        info!(path = %dir.display(), "app services initialised");
        Self {
            data_dir: dir,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Update and persist the config.
    pub fn save_config(&mut self, config: AppConfig) -> Result<()> {
        persist_config(&self.data_dir, &config)?;
        self.config = config;
        Ok(())
    }

    /// Path to the settings file.
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    // -- Conversion ----------------------------------------------------------

    /// Run the pipeline over `selection` and save the result into
    /// `output_dir`, falling back to the configured directory and then the
    /// current directory.
    pub fn convert(
        &self,
        selection: &SelectionList,
        options: ConversionOptions,
        title: Option<String>,
        output_dir: Option<PathBuf>,
        on_progress: impl FnMut(ConversionProgress) + Send + 'static,
    ) -> Result<(ConversionReport, PathBuf)> {
        let title = title.unwrap_or_else(|| self.config.document_title.clone());
        let mut assembler = PageAssembler::new(options)
            .with_title(title)
            .on_progress(on_progress);
        let report = assembler.run(selection)?;

        let dir = output_dir
            .or_else(|| self.config.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));
        let path = save_report(&report, &dir)?;
        Ok((report, path))
    }
}

// -- File intake --------------------------------------------------------------

/// Read one file as an image item, declaring its media type from the extension.
pub fn image_item_from_path(path: &Path) -> Result<ImageItem> {
    let media_type = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(media_type_from_extension)
        .unwrap_or(bildwerk_core::OCTET_STREAM);
    let data = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    debug!(name = %name, media_type, bytes = data.len(), "Read input file");
    Ok(ImageItem::new(name, media_type, data))
}

/// Read every path in order. Unreadable files are logged and left out.
pub fn read_images(paths: &[PathBuf]) -> Vec<ImageItem> {
    paths
        .iter()
        .filter_map(|path| match image_item_from_path(path) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Could not read file; skipping");
                None
            }
        })
        .collect()
}

// -- Config file persistence -------------------------------------------------

const CONFIG_FILE: &str = "config.json";

fn load_config(data_dir: &Path) -> Option<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Ignoring unreadable config");
            None
        }
    }
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    info!(path = %path.display(), "Config saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bildwerk_core::{PaperFormat, Quality};

    use super::*;

    fn write_png(dir: &Path, name: &str) -> PathBuf {
        let img = image::RgbImage::from_pixel(16, 12, image::Rgb([1, 2, 3]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        let path = dir.join(name);
        std::fs::write(&path, out).unwrap();
        path
    }

    #[test]
    fn missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let services = AppServices::with_data_dir(dir.path().to_path_buf());
        assert_eq!(services.config(), &AppConfig::default());
    }

    #[test]
    fn saved_config_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let mut services = AppServices::with_data_dir(dir.path().to_path_buf());
        let config = AppConfig {
            default_paper: PaperFormat::Letter,
            default_quality: Quality::new(0.6).unwrap(),
            ..AppConfig::default()
        };
        services.save_config(config.clone()).unwrap();
        assert!(services.config_path().exists());

        let reloaded = AppServices::with_data_dir(dir.path().to_path_buf());
        assert_eq!(reloaded.config(), &config);
    }

    #[test]
    fn corrupt_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();
        let services = AppServices::with_data_dir(dir.path().to_path_buf());
        assert_eq!(services.config(), &AppConfig::default());
    }

    #[test]
    fn intake_declares_media_type_and_skips_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let png = write_png(dir.path(), "scan.PNG");
        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, "hello").unwrap();
        let missing = dir.path().join("gone.jpg");

        let items = read_images(&[png, txt, missing]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "scan.PNG");
        assert_eq!(items[0].media_type, "image/png");
        assert_eq!(items[1].media_type, bildwerk_core::OCTET_STREAM);

        let mut selection = SelectionList::new();
        assert_eq!(selection.append(items), 1);
    }

    #[test]
    fn convert_writes_into_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let services = AppServices::with_data_dir(dir.path().join("data"));
        let mut selection = SelectionList::new();
        selection.append(read_images(&[
            write_png(dir.path(), "a.png"),
            write_png(dir.path(), "b.png"),
        ]));

        let out = dir.path().join("out");
        let (report, path) = services
            .convert(&selection, ConversionOptions::default(), None, Some(out.clone()), |_| {})
            .unwrap();
        assert_eq!(report.page_count, 2);
        assert_eq!(path.parent().unwrap(), out.as_path());
        assert!(path.exists());
    }
}
