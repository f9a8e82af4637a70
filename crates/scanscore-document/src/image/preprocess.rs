// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preprocessing around the denoise model — fit-and-crop normalisation into the
// model's input tensor, and the sharpen / upscale / threshold refinement of
// its output.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::{ThresholdType, threshold};
use rten_tensor::NdTensor;
use rten_tensor::prelude::*;
use scanscore_core::PipelineConfig;
use scanscore_core::error::{Result, ScanScoreError};
use tracing::{debug, info, instrument};

/// The images produced by [`Preprocessor::refine`].
#[derive(Debug, Clone)]
pub struct RefinedImages {
    /// The model output as 8-bit grayscale, at inference size.
    pub denoised: GrayImage,
    /// `denoised` after the sharpening convolution.
    pub sharpened: GrayImage,
    /// `sharpened` after uniform upscaling. Rectification and OCR work on this.
    pub upscaled: GrayImage,
    /// Two-valued (0/255) copy of `upscaled`, used only for boundary detection.
    pub binary: GrayImage,
}

/// Converts images to and from the denoise model's tensor layout.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    config: PipelineConfig,
}

impl Preprocessor {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    // -- Before inference -----------------------------------------------------

    /// Fit-and-crop the image to the inference size, convert it to grayscale
    /// with [`rec601_gray`], and scale samples into `[0.0, 1.0]`.
    ///
    /// The result has shape `(1, height, width, 1)`: a batch of one
    /// single-channel image. Content outside the centred crop is discarded;
    /// nothing is stretched.
    ///
    /// # Errors
    ///
    /// [`ScanScoreError::InvalidInput`] if the image has no pixels.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn normalize_for_inference(&self, image: &DynamicImage) -> Result<NdTensor<f32, 4>> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ScanScoreError::InvalidInput(format!(
                "image has no pixels ({}x{})",
                image.width(),
                image.height()
            )));
        }

        let (w, h) = (self.config.inference_width, self.config.inference_height);
        let fitted = rec601_gray(&image.resize_to_fill(w, h, FilterType::CatmullRom));
        debug!(w, h, "Image fitted to inference size");

        let data: Vec<f32> = fitted.pixels().map(|p| f32::from(p.0[0]) / 255.0).collect();
        Ok(NdTensor::from_data([1, h as usize, w as usize, 1], data))
    }

    // -- After inference ------------------------------------------------------

    /// Run the post-inference refinement:
    ///
    /// 1. Sharpen with the configured 3x3 kernel
    /// 2. Upscale both dimensions by `upscale_percent` (linear interpolation)
    /// 3. Binarize the upscaled image with `binarize_threshold`
    #[instrument(skip_all)]
    pub fn refine(&self, denoised: GrayImage) -> RefinedImages {
        info!(
            width = denoised.width(),
            height = denoised.height(),
            "Refining denoised image"
        );

        let sharpened = sharpen(&denoised, &self.config.sharpen_kernel);
        let upscaled = upscale(&sharpened, self.config.upscale_percent);
        let binary = binarize(&upscaled, self.config.binarize_threshold);

        debug!(
            upscaled_w = upscaled.width(),
            upscaled_h = upscaled.height(),
            threshold = self.config.binarize_threshold,
            "Refinement complete"
        );

        RefinedImages {
            denoised,
            sharpened,
            upscaled,
            binary,
        }
    }

    /// Turn the model's output tensor back into an 8-bit image.
    ///
    /// # Errors
    ///
    /// [`ScanScoreError::ExternalService`] if the tensor is not shaped
    /// `(1, height, width, 1)` for the configured inference size.
    pub fn tensor_to_gray(&self, tensor: &NdTensor<f32, 4>) -> Result<GrayImage> {
        tensor_to_gray(
            tensor,
            self.config.inference_width,
            self.config.inference_height,
        )
    }
}

/// Grayscale with ITU-R 601-2 weights (`0.299 R + 0.587 G + 0.114 B`) in
/// 16-bit fixed point, rounded. Alpha is ignored; gray input is unchanged.
pub fn rec601_gray(image: &DynamicImage) -> GrayImage {
    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let l = u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471 + 0x8000;
        Luma([(l >> 16) as u8])
    })
}

/// Convert a `(1, height, width, 1)` tensor of `[0, 1]` samples into a
/// grayscale image. Out-of-range samples are clamped; scaling truncates.
pub fn tensor_to_gray(tensor: &NdTensor<f32, 4>, width: u32, height: u32) -> Result<GrayImage> {
    let expected = [1, height as usize, width as usize, 1];
    let shape = tensor.shape();
    if shape != expected {
        return Err(ScanScoreError::denoiser(format!(
            "expected output shape {expected:?}, got {shape:?}"
        )));
    }

    Ok(GrayImage::from_fn(width, height, |x, y| {
        let v = tensor[[0, y as usize, x as usize, 0]];
        let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Luma([(v * 255.0) as u8])
    }))
}

/// Convolve with a 3x3 integer kernel, saturating to `[0, 255]`.
///
/// Borders are handled by mirror reflection that excludes the edge pixel
/// (`gfedcb|abcdefgh|gfedcba`).
pub fn sharpen(image: &GrayImage, kernel: &[[i32; 3]; 3]) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut output = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let mut acc = 0i32;
            for (ky, row) in kernel.iter().enumerate() {
                let sy = reflect_101(y as i64 + ky as i64 - 1, height);
                for (kx, weight) in row.iter().enumerate() {
                    let sx = reflect_101(x as i64 + kx as i64 - 1, width);
                    acc += weight * i32::from(image.get_pixel(sx, sy).0[0]);
                }
            }
            output.put_pixel(x, y, Luma([acc.clamp(0, 255) as u8]));
        }
    }

    output
}

fn reflect_101(i: i64, len: u32) -> u32 {
    let len = i64::from(len);
    if len == 1 {
        return 0;
    }
    let reflected = if i < 0 {
        -i
    } else if i >= len {
        2 * len - i - 2
    } else {
        i
    };
    reflected.clamp(0, len - 1) as u32
}

/// Scale both dimensions by `percent` (150 → 1.5x), with linear interpolation.
/// New dimensions are truncated.
pub fn upscale(image: &GrayImage, percent: u32) -> GrayImage {
    let width = (image.width() as u64 * percent as u64 / 100).max(1) as u32;
    let height = (image.height() as u64 * percent as u64 / 100).max(1) as u32;
    image::imageops::resize(image, width, height, FilterType::Triangle)
}

/// Fixed-threshold binarization: samples above `level` become 255, the
/// rest 0.
pub fn binarize(image: &GrayImage, level: u8) -> GrayImage {
    threshold(image, level, ThresholdType::Binary)
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn preprocessor() -> Preprocessor {
        Preprocessor::new(PipelineConfig::default())
    }

    #[test]
    fn normalize_produces_model_shape() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1000, 800, image::Rgb([255, 255, 255])));
        let tensor = preprocessor().normalize_for_inference(&img).unwrap();

        assert_eq!(tensor.shape(), [1, 360, 612, 1]);
        assert!((tensor[[0, 180, 306, 0]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_scales_into_unit_range() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(612, 360, Luma([51u8])));
        let tensor = preprocessor().normalize_for_inference(&img).unwrap();
        assert!((tensor[[0, 10, 10, 0]] - 0.2).abs() < 1e-3);
    }

    #[test]
    fn normalize_crops_instead_of_stretching() {
        // Tall image: left half black, right half white. After fitting to a
        // wide frame the split stays in the middle.
        let img = GrayImage::from_fn(400, 1200, |x, _| if x < 200 { Luma([0]) } else { Luma([255]) });
        let tensor = preprocessor()
            .normalize_for_inference(&DynamicImage::ImageLuma8(img))
            .unwrap();
        assert!(tensor[[0, 180, 100, 0]] < 0.1);
        assert!(tensor[[0, 180, 500, 0]] > 0.9);
    }

    #[test]
    fn rec601_weights_colour_channels() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(4, 1, |x, _| {
            image::Rgb([[255, 0, 0], [0, 255, 0], [0, 0, 255], [200, 100, 50]][x as usize])
        }));
        let gray = rec601_gray(&img);
        assert_eq!(gray.get_pixel(0, 0).0[0], 76);
        assert_eq!(gray.get_pixel(1, 0).0[0], 150);
        assert_eq!(gray.get_pixel(2, 0).0[0], 29);
        // 0.299 * 200 + 0.587 * 100 + 0.114 * 50 = 124.2
        assert_eq!(gray.get_pixel(3, 0).0[0], 124);
    }

    #[test]
    fn rec601_keeps_gray_input() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_fn(256, 1, |x, _| Luma([x as u8])));
        let gray = rec601_gray(&img);
        assert!(gray.enumerate_pixels().all(|(x, _, p)| u32::from(p.0[0]) == x));
    }

    #[test]
    fn normalize_rejects_empty_image() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        assert!(matches!(
            preprocessor().normalize_for_inference(&img),
            Err(ScanScoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn tensor_to_gray_checks_shape() {
        let tensor = NdTensor::from_data([1, 10, 10, 1], vec![0.5f32; 100]);
        let err = preprocessor().tensor_to_gray(&tensor).unwrap_err();
        assert!(matches!(err, ScanScoreError::ExternalService { .. }));
    }

    #[test]
    fn tensor_to_gray_truncates_and_clamps() {
        let data = vec![0.5f32, 1.7, -0.3, 1.0];
        let tensor = NdTensor::from_data([1, 2, 2, 1], data);
        let gray = tensor_to_gray(&tensor, 2, 2).unwrap();
        assert_eq!(gray.get_pixel(0, 0).0[0], 127);
        assert_eq!(gray.get_pixel(1, 0).0[0], 255);
        assert_eq!(gray.get_pixel(0, 1).0[0], 0);
        assert_eq!(gray.get_pixel(1, 1).0[0], 255);
    }

    #[test]
    fn sharpen_leaves_flat_regions_alone() {
        let img = GrayImage::from_pixel(8, 8, Luma([100u8]));
        let kernel = PipelineConfig::default().sharpen_kernel;
        let out = sharpen(&img, &kernel);
        assert!(out.pixels().all(|p| p.0[0] == 100));
    }

    #[test]
    fn sharpen_saturates_at_edges() {
        // A single bright pixel overshoots to 255, its neighbours undershoot to 0.
        let mut img = GrayImage::from_pixel(5, 5, Luma([10u8]));
        img.put_pixel(2, 2, Luma([200]));
        let out = sharpen(&img, &PipelineConfig::default().sharpen_kernel);
        assert_eq!(out.get_pixel(2, 2).0[0], 255);
        assert_eq!(out.get_pixel(2, 1).0[0], 0);
        assert_eq!(out.get_pixel(0, 0).0[0], 10);
    }

    #[test]
    fn reflect_101_mirrors_without_edge() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(2, 5), 2);
        assert_eq!(reflect_101(-1, 1), 0);
    }

    #[test]
    fn upscale_by_one_and_a_half() {
        let img = GrayImage::from_pixel(612, 360, Luma([0u8]));
        let out = upscale(&img, 150);
        assert_eq!(out.dimensions(), (918, 540));
    }

    #[test]
    fn binarize_is_strictly_above_threshold() {
        let img = GrayImage::from_fn(3, 1, |x, _| Luma([[185u8, 186, 0][x as usize]]));
        let out = binarize(&img, 185);
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
        assert_eq!(out.get_pixel(1, 0).0[0], 255);
        assert_eq!(out.get_pixel(2, 0).0[0], 0);
    }

    #[test]
    fn refine_keeps_all_stages() {
        let img = GrayImage::from_pixel(612, 360, Luma([220u8]));
        let refined = preprocessor().refine(img);
        assert_eq!(refined.denoised.dimensions(), (612, 360));
        assert_eq!(refined.sharpened.dimensions(), (612, 360));
        assert_eq!(refined.upscaled.dimensions(), (918, 540));
        assert!(refined.binary.pixels().all(|p| p.0[0] == 255));
        assert!(refined.upscaled.pixels().all(|p| p.0[0] == 220));
    }
}
