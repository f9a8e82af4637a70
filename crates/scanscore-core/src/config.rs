// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline and application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanScoreError};

/// What the rectifier hands to the OCR engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RectifyMode {
    /// Outline the detected boundary on the working image; the perspective
    /// transform is computed but not applied.
    Annotate,
    /// Apply the perspective transform and recognise the deskewed page.
    #[default]
    Warp,
}

/// Every tunable constant of the extraction pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Width of the tensor fed to the denoise model.
    pub inference_width: u32,
    /// Height of the tensor fed to the denoise model.
    pub inference_height: u32,
    /// 3x3 sharpening kernel applied to the denoised image.
    pub sharpen_kernel: [[i32; 3]; 3],
    /// Uniform upscale applied after sharpening, in percent.
    pub upscale_percent: u32,
    /// Samples strictly above this value become white in the binary image.
    pub binarize_threshold: u8,
    /// Side length of the Gaussian kernel used before edge detection.
    pub blur_kernel_size: u32,
    /// Canny hysteresis thresholds.
    pub canny_low: f32,
    pub canny_high: f32,
    /// Polygon approximation tolerance as a fraction of contour perimeter.
    pub approx_epsilon_ratio: f64,
    /// Size of the square the detected page is mapped onto.
    pub rectify_width: u32,
    pub rectify_height: u32,
    pub rectify_mode: RectifyMode,
    /// Stroke width of the boundary outline drawn on the annotated image.
    pub outline_thickness: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inference_width: 612,
            inference_height: 360,
            sharpen_kernel: [[0, -1, 0], [-1, 5, -1], [0, -1, 0]],
            upscale_percent: 150,
            binarize_threshold: 185,
            blur_kernel_size: 5,
            canny_low: 0.0,
            canny_high: 50.0,
            approx_epsilon_ratio: 0.02,
            rectify_width: 800,
            rectify_height: 800,
            rectify_mode: RectifyMode::Warp,
            outline_thickness: 2,
        }
    }
}

impl PipelineConfig {
    /// Gaussian sigma for the configured kernel size, derived the same way
    /// OpenCV does when sigma is left at zero.
    pub fn blur_sigma(&self) -> f32 {
        let k = self.blur_kernel_size as f32;
        0.3 * ((k - 1.0) * 0.5 - 1.0) + 0.8
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.inference_width == 0 || self.inference_height == 0 {
            return Err(ScanScoreError::Config(
                "inference size must be non-zero".into(),
            ));
        }
        if self.upscale_percent == 0 {
            return Err(ScanScoreError::Config(
                "upscale_percent must be non-zero".into(),
            ));
        }
        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return Err(ScanScoreError::Config(format!(
                "blur_kernel_size must be a positive odd number, got {}",
                self.blur_kernel_size
            )));
        }
        if self.canny_low > self.canny_high {
            return Err(ScanScoreError::Config(format!(
                "canny_low ({}) exceeds canny_high ({})",
                self.canny_low, self.canny_high
            )));
        }
        if self.approx_epsilon_ratio.is_nan() || self.approx_epsilon_ratio <= 0.0 {
            return Err(ScanScoreError::Config(
                "approx_epsilon_ratio must be positive".into(),
            ));
        }
        if self.rectify_width == 0 || self.rectify_height == 0 {
            return Err(ScanScoreError::Config(
                "rectify size must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Application settings: pipeline constants plus where the external
/// collaborators live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    /// Denoise model file (`.rten`). Without one, denoising is skipped.
    pub denoise_model_path: Option<PathBuf>,
    /// Tesseract language code(s), e.g. "eng" or "eng+deu".
    pub ocr_language: String,
    /// Directory holding Tesseract traineddata; `None` uses the system default.
    pub tessdata_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            denoise_model_path: None,
            ocr_language: "eng".into(),
            tessdata_dir: None,
        }
    }
}

impl AppConfig {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            ScanScoreError::Config(format!("cannot read {}: {}", path.display(), err))
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Write settings as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.ocr_language.trim().is_empty() {
            return Err(ScanScoreError::Config("ocr_language is empty".into()));
        }
        self.pipeline.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let config = PipelineConfig::default();
        assert_eq!((config.inference_width, config.inference_height), (612, 360));
        assert_eq!(config.binarize_threshold, 185);
        assert_eq!(config.upscale_percent, 150);
        assert_eq!((config.rectify_width, config.rectify_height), (800, 800));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blur_sigma_for_five_by_five() {
        let config = PipelineConfig::default();
        assert!((config.blur_sigma() - 1.1).abs() < 1e-6);
    }

    #[test]
    fn validate_rejects_inverted_canny_thresholds() {
        let config = PipelineConfig {
            canny_low: 80.0,
            canny_high: 50.0,
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ScanScoreError::Config(_))));
    }

    #[test]
    fn validate_rejects_even_blur_kernel() {
        let config = PipelineConfig {
            blur_kernel_size: 4,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "ocr_language": "deu", "pipeline": { "rectify_mode": "annotate" } }"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.ocr_language, "deu");
        assert_eq!(config.pipeline.rectify_mode, RectifyMode::Annotate);
        assert_eq!(config.pipeline.binarize_threshold, 185);
        assert!(config.denoise_model_path.is_none());
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = AppConfig {
            denoise_model_path: Some(PathBuf::from("/models/autoencoder.rten")),
            ..AppConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let err = AppConfig::load("/nonexistent/scanscore.json").unwrap_err();
        assert!(matches!(err, ScanScoreError::Config(_)));
    }
}
