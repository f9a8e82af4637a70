// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectification — map the detected page onto a fixed square, outline it on the
// working image, and (in warp mode) produce the deskewed page for OCR.

use image::{GrayImage, Luma};
use imageproc::drawing::draw_line_segment_mut;
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use imageproc::geometry::contour_area;
use imageproc::point::Point as PixelPoint;
use scanscore_core::error::{Result, ScanScoreError};
use scanscore_core::{CanonicalCorners, PipelineConfig, Point, Quad, RectifyMode};
use tracing::{debug, info, instrument, warn};

use crate::geometry::canonicalize;

/// Everything the rectifier produced for one page.
#[derive(Debug, Clone)]
pub struct Rectified {
    pub corners: CanonicalCorners,
    /// Maps the canonical corners onto the target rectangle's corners.
    /// `None` when the corners are degenerate (annotate mode only).
    pub projection: Option<Projection>,
    /// The source image with the detected outline drawn on it.
    pub annotated: GrayImage,
    /// The deskewed page; only produced in [`RectifyMode::Warp`].
    pub warped: Option<GrayImage>,
}

impl Rectified {
    /// The image the OCR engine should read: the warped page when one was
    /// produced, otherwise the annotated view.
    pub fn ocr_input(&self) -> &GrayImage {
        self.warped.as_ref().unwrap_or(&self.annotated)
    }
}

/// Computes the perspective mapping for a detected quadrilateral.
#[derive(Debug, Clone)]
pub struct Rectifier {
    config: PipelineConfig,
}

impl Rectifier {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Rectify `quad`, whose coordinates are in `source`'s pixel space.
    ///
    /// ## Pipeline
    ///
    /// 1. Canonicalize the corners (TL, TR, BR, BL)
    /// 2. Build the projective transform onto `rectify_width × rectify_height`
    /// 3. Draw the outline on a copy of `source`
    /// 4. In warp mode, resample `source` through the transform (bilinear,
    ///    white fill outside the page)
    ///
    /// Corners are degenerate when two canonical corners coincide, when the
    /// outline encloses less than one square pixel, or when no projective
    /// transform exists for them. Annotate mode still outlines degenerate
    /// corners and returns without a projection.
    ///
    /// # Errors
    ///
    /// [`ScanScoreError::InvalidInput`] for degenerate corners in warp mode.
    #[instrument(skip_all, fields(mode = ?self.config.rectify_mode))]
    pub fn rectify(&self, quad: &Quad, source: &GrayImage) -> Result<Rectified> {
        let corners = canonicalize(&quad.points)?;
        debug!(
            top_left = ?corners.top_left,
            top_right = ?corners.top_right,
            bottom_right = ?corners.bottom_right,
            bottom_left = ?corners.bottom_left,
            "Corners canonicalized"
        );

        let (out_w, out_h) = (self.config.rectify_width, self.config.rectify_height);
        let dest: [(f32, f32); 4] = [
            (0.0, 0.0),                   // top-left
            (out_w as f32, 0.0),          // top-right
            (out_w as f32, out_h as f32), // bottom-right
            (0.0, out_h as f32),          // bottom-left
        ];

        let projection = if is_degenerate(&corners) {
            None
        } else {
            Projection::from_control_points(corners.as_tuples(), dest)
        };

        let mut annotated = source.clone();
        draw_outline(&mut annotated, &corners.as_array(), self.config.outline_thickness);

        let warped = match (self.config.rectify_mode, &projection) {
            (RectifyMode::Annotate, projection) => {
                if projection.is_none() {
                    warn!(corners = ?corners.as_tuples(), "Degenerate corners; outlined anyway");
                }
                info!("Boundary outlined; perspective transform not applied");
                None
            }
            (RectifyMode::Warp, None) => {
                return Err(ScanScoreError::InvalidInput(format!(
                    "no perspective transform exists for corners {:?}",
                    corners.as_tuples()
                )));
            }
            (RectifyMode::Warp, Some(projection)) => {
                let mut output = GrayImage::new(out_w, out_h);
                warp_into(
                    source,
                    projection,
                    Interpolation::Bilinear,
                    Luma([255u8]),
                    &mut output,
                );
                info!(out_w, out_h, "Perspective correction applied");
                Some(output)
            }
        };

        Ok(Rectified {
            corners,
            projection,
            annotated,
            warped,
        })
    }
}

/// Corners no page could have produced: two of them coincide, or the outline
/// encloses less than one square pixel.
fn is_degenerate(corners: &CanonicalCorners) -> bool {
    let vertices = corners.as_array();
    for i in 0..4 {
        for j in i + 1..4 {
            if vertices[i] == vertices[j] {
                return true;
            }
        }
    }
    let outline: Vec<PixelPoint<f32>> = vertices.iter().map(|p| PixelPoint::new(p.x, p.y)).collect();
    contour_area(&outline) < 1.0
}

/// Draw the closed outline through `vertices` in black, `thickness` pixels wide.
fn draw_outline(image: &mut GrayImage, vertices: &[Point; 4], thickness: u32) {
    let thickness = thickness.max(1) as i32;
    let lo = -(thickness - 1) / 2;
    let hi = lo + thickness;
    let black = Luma([0u8]);

    for i in 0..4 {
        let a = vertices[i];
        let b = vertices[(i + 1) % 4];
        for dy in lo..hi {
            for dx in lo..hi {
                let (ox, oy) = (dx as f32, dy as f32);
                draw_line_segment_mut(image, (a.x + ox, a.y + oy), (b.x + ox, b.y + oy), black);
            }
        }
    }
}

/// Shorthand for [`Rectifier::rectify`] with the given config.
pub fn rectify(quad: &Quad, source: &GrayImage, config: &PipelineConfig) -> Result<Rectified> {
    Rectifier::new(config.clone()).rectify(quad, source)
}

// -- Tests --------------------------------------------------------------------
