// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Intermediate images of one request, and writing them out as PNG files.

use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageFormat};
use scanscore_core::error::{Result, ScanScoreError};
use tracing::{info, instrument};

/// The images worth inspecting after a run. Stages that did not run leave
/// their slot empty.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub original: DynamicImage,
    pub denoised: Option<GrayImage>,
    pub annotated: Option<GrayImage>,
    pub rectified: Option<GrayImage>,
}

impl Artifacts {
    pub fn new(original: DynamicImage) -> Self {
        Self {
            original,
            denoised: None,
            annotated: None,
            rectified: None,
        }
    }

    /// Write every present image into `dir` (created if needed) as
    /// `original.png`, `denoised.png`, `annotated.png` and `rectified.png`.
    ///
    /// Returns the paths written, in that order.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub fn save(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        write_png(&self.original, &dir.join("original.png"), &mut written)?;

        let stages = [
            ("denoised.png", &self.denoised),
            ("annotated.png", &self.annotated),
            ("rectified.png", &self.rectified),
        ];
        for (name, image) in stages {
            if let Some(image) = image {
                write_png(&DynamicImage::ImageLuma8(image.clone()), &dir.join(name), &mut written)?;
            }
        }

        info!(files = written.len(), "Artifacts saved");
        Ok(written)
    }
}

fn write_png(image: &DynamicImage, path: &Path, written: &mut Vec<PathBuf>) -> Result<()> {
    image.save_with_format(path, ImageFormat::Png).map_err(|err| {
        ScanScoreError::ImageError(format!("failed to write {}: {}", path.display(), err))
    })?;
    written.push(path.to_path_buf());
    Ok(())
}
