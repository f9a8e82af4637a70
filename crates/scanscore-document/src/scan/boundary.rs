// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document boundary detection — edge map, contour search, and selection of the
// largest contour that simplifies to a quadrilateral.

use image::GrayImage;
use imageproc::contours::find_contours;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::{arc_length, contour_area};
use scanscore_core::{PipelineConfig, Point, Quad};
use tracing::{debug, info, instrument, warn};

use crate::geometry::approximate_polygon;

/// Finds the page outline in a binarized scan.
///
/// The search is greedy: contours are ranked by enclosed area (stable sort,
/// largest first) and the first one that simplifies to exactly four vertices
/// wins. This assumes the document is the largest near-quadrilateral region
/// in the frame.
#[derive(Debug, Clone)]
pub struct BoundaryDetector {
    config: PipelineConfig,
}

impl BoundaryDetector {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Locate the document quadrilateral.
    ///
    /// ## Pipeline
    ///
    /// 1. Gaussian blur (kernel `blur_kernel_size`) to suppress speckle
    /// 2. Canny edge detection (`canny_low`, `canny_high`)
    /// 3. Every contour of the edge map, no hierarchy, full vertex lists
    /// 4. Stable sort by enclosed area, descending
    /// 5. Douglas–Peucker with tolerance `approx_epsilon_ratio × perimeter`
    /// 6. First approximation with exactly four vertices
    ///
    /// Returns `None` when no contour qualifies (e.g. a uniform image). The
    /// caller should skip rectification and OCR in that case.
    #[instrument(skip_all, fields(width = binary.width(), height = binary.height()))]
    pub fn detect_quad(&self, binary: &GrayImage) -> Option<Quad> {
        let edges = self.edge_map(binary);

        let mut candidates: Vec<(f64, f64, Vec<Point>)> = find_contours::<i32>(&edges)
            .into_iter()
            .map(|contour| {
                let area = contour_area(&contour.points);
                let length = arc_length(&contour.points, true);
                let points: Vec<Point> = contour
                    .points
                    .iter()
                    .map(|p| Point::new(p.x as f32, p.y as f32))
                    .collect();
                (area, length, points)
            })
            .collect();
        debug!(contours = candidates.len(), "Contours extracted");

        candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (rank, (area, length, points)) in candidates.iter().enumerate() {
            if points.len() < 4 || *length == 0.0 {
                continue;
            }

            let approx = approximate_polygon(points, self.config.approx_epsilon_ratio * *length);
            if let &[a, b, c, d] = approx.as_slice() {
                info!(rank, area = *area, perimeter = *length, "Document boundary found");
                return Some(Quad::new([a, b, c, d]));
            }
        }

        warn!("No contour simplifies to four vertices");
        None
    }

    /// Blur then run Canny; the returned map has edges at 255.
    pub fn edge_map(&self, binary: &GrayImage) -> GrayImage {
        let blurred = gaussian_blur_f32(binary, self.config.blur_sigma());
        // imageproc keeps neighbours whose gradient is >= the low threshold,
        // so a zero threshold would also grow into suppressed pixels.
        let low = self.config.canny_low.max(f32::MIN_POSITIVE);
        canny(&blurred, low, self.config.canny_high)
    }
}

/// Shorthand for [`BoundaryDetector::detect_quad`] with the given config.
pub fn detect_quad(binary: &GrayImage, config: &PipelineConfig) -> Option<Quad> {
    BoundaryDetector::new(config.clone()).detect_quad(binary)
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut};
    use imageproc::point::Point as PixelPoint;

    fn detector() -> BoundaryDetector {
        BoundaryDetector::new(PipelineConfig::default())
    }

    fn assert_near_each(quad: &Quad, expected: &[(f32, f32)], tolerance: f32) {
        for &(ex, ey) in expected {
            let hit = quad
                .points
                .iter()
                .any(|p| (p.x - ex).abs() <= tolerance && (p.y - ey).abs() <= tolerance);
            assert!(hit, "no vertex near ({ex}, {ey}) in {:?}", quad.points);
        }
    }

    #[test]
    fn all_black_image_has_no_boundary() {
        let img = GrayImage::from_pixel(300, 200, Luma([0u8]));
        assert!(detector().detect_quad(&img).is_none());
    }

    #[test]
    fn all_white_image_has_no_boundary() {
        let img = GrayImage::from_pixel(300, 200, Luma([255u8]));
        assert!(detector().detect_quad(&img).is_none());
    }

    #[test]
    fn white_rectangle_on_black_is_found() {
        let mut img = GrayImage::from_pixel(400, 300, Luma([0u8]));
        for y in 60..240 {
            for x in 80..320 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }

        let quad = detector().detect_quad(&img).expect("rectangle should be detected");
        assert_near_each(
            &quad,
            &[(80.0, 60.0), (319.0, 60.0), (319.0, 239.0), (80.0, 239.0)],
            6.0,
        );
    }

    #[test]
    fn tilted_page_is_found() {
        let mut img = GrayImage::from_pixel(420, 320, Luma([0u8]));
        let corners = [(100, 50), (350, 80), (330, 260), (70, 230)];
        let poly: Vec<PixelPoint<i32>> = corners.iter().map(|&(x, y)| PixelPoint::new(x, y)).collect();
        draw_polygon_mut(&mut img, &poly, Luma([255u8]));

        let quad = detector().detect_quad(&img).expect("tilted page should be detected");
        let expected: Vec<(f32, f32)> = corners.iter().map(|&(x, y)| (x as f32, y as f32)).collect();
        assert_near_each(&quad, &expected, 8.0);
    }

    #[test]
    fn disc_does_not_simplify_to_a_quad() {
        let mut img = GrayImage::from_pixel(300, 300, Luma([0u8]));
        draw_filled_circle_mut(&mut img, (150, 150), 100, Luma([255u8]));
        assert!(detector().detect_quad(&img).is_none());
    }

    #[test]
    fn edge_map_is_empty_for_uniform_input() {
        let img = GrayImage::from_pixel(64, 64, Luma([255u8]));
        let edges = detector().edge_map(&img);
        assert!(edges.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn free_function_matches_detector() {
        let mut img = GrayImage::from_pixel(200, 200, Luma([0u8]));
        for y in 40..160 {
            for x in 30..170 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        let config = PipelineConfig::default();
        assert_eq!(detect_quad(&img, &config), detector().detect_quad(&img));
    }
}
