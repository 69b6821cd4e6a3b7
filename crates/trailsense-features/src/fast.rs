//! FAST-9 keypoints ranked by Harris response.

use std::collections::HashMap;

use nalgebra::Point2;
use trailsense_core::{gray_at, GrayImageView, Keypoint};

/// Bresenham circle of radius 3, clockwise from the top.
const CIRCLE: [(i32, i32); 16] = [
    (0, -3),
    (1, -3),
    (2, -2),
    (3, -1),
    (3, 0),
    (3, 1),
    (2, 2),
    (1, 3),
    (0, 3),
    (-1, 3),
    (-2, 2),
    (-3, 1),
    (-3, 0),
    (-3, -1),
    (-2, -2),
    (-1, -3),
];

const ARC_LEN: usize = 9;
const HARRIS_HALF: i32 = 3;
const ORIENTATION_RADIUS: i32 = 7;

#[derive(Clone, Copy, Debug)]
pub(crate) struct FastParams {
    pub threshold: u8,
    pub grid_size: usize,
    pub max_features: usize,
    pub harris_k: f32,
    /// Keypoints closer than this to the border are not reported.
    pub border: usize,
}

pub(crate) fn detect(image: &GrayImageView<'_>, params: &FastParams) -> Vec<Keypoint> {
    let border = params.border.max(3);
    if image.width <= 2 * border || image.height <= 2 * border {
        return Vec::new();
    }

    let mut best_per_cell: HashMap<(usize, usize), Keypoint> = HashMap::new();
    let grid = params.grid_size.max(1);

    for y in border..image.height - border {
        for x in border..image.width - border {
            let (xi, yi) = (x as i32, y as i32);
            if !is_fast_corner(image, xi, yi, params.threshold) {
                continue;
            }
            let kp = Keypoint {
                position: Point2::new(x as f32, y as f32),
                angle: 0.0,
                response: harris_response(image, xi, yi, params.harris_k),
            };
            let cell = (x / grid, y / grid);
            match best_per_cell.get(&cell) {
                Some(existing) if existing.response >= kp.response => {}
                _ => {
                    best_per_cell.insert(cell, kp);
                }
            }
        }
    }

    let mut keypoints: Vec<Keypoint> = best_per_cell.into_values().collect();
    keypoints.sort_by(|a, b| {
        b.response
            .total_cmp(&a.response)
            .then(a.position.y.total_cmp(&b.position.y))
            .then(a.position.x.total_cmp(&b.position.x))
    });
    keypoints.truncate(params.max_features);

    for kp in &mut keypoints {
        kp.angle = intensity_centroid_angle(image, kp.position.x as i32, kp.position.y as i32);
    }
    keypoints
}

fn is_fast_corner(image: &GrayImageView<'_>, x: i32, y: i32, threshold: u8) -> bool {
    let center = gray_at(image, x, y) as i16;
    let t = threshold as i16;
    let ring: [i16; 16] =
        std::array::from_fn(|i| gray_at(image, x + CIRCLE[i].0, y + CIRCLE[i].1) as i16);

    // An arc of 9 covers at least 2 of the 4 cardinal points.
    let cardinals = [ring[0], ring[4], ring[8], ring[12]];
    let brighter = cardinals.iter().filter(|&&p| p > center + t).count();
    let darker = cardinals.iter().filter(|&&p| p < center - t).count();
    if brighter < 2 && darker < 2 {
        return false;
    }

    has_arc(&ring, |p| p > center + t) || has_arc(&ring, |p| p < center - t)
}

fn has_arc(ring: &[i16; 16], pred: impl Fn(i16) -> bool) -> bool {
    let mut run = 0;
    for i in 0..32 {
        if pred(ring[i % 16]) {
            run += 1;
            if run >= ARC_LEN {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

/// `det(M) - k * trace(M)^2` over a 7×7 window of central-difference gradients.
fn harris_response(image: &GrayImageView<'_>, x: i32, y: i32, k: f32) -> f32 {
    let mut sxx = 0.0f32;
    let mut syy = 0.0f32;
    let mut sxy = 0.0f32;

    for dy in -HARRIS_HALF..=HARRIS_HALF {
        for dx in -HARRIS_HALF..=HARRIS_HALF {
            let px = x + dx;
            let py = y + dy;
            let ix = (gray_at(image, px + 1, py) as f32 - gray_at(image, px - 1, py) as f32) * 0.5;
            let iy = (gray_at(image, px, py + 1) as f32 - gray_at(image, px, py - 1) as f32) * 0.5;
            sxx += ix * ix;
            syy += iy * iy;
            sxy += ix * iy;
        }
    }

    let det = sxx * syy - sxy * sxy;
    let trace = sxx + syy;
    det - k * trace * trace
}

fn intensity_centroid_angle(image: &GrayImageView<'_>, x: i32, y: i32) -> f32 {
    let r2 = ORIENTATION_RADIUS * ORIENTATION_RADIUS;
    let mut m10 = 0.0f32;
    let mut m01 = 0.0f32;
    for dy in -ORIENTATION_RADIUS..=ORIENTATION_RADIUS {
        for dx in -ORIENTATION_RADIUS..=ORIENTATION_RADIUS {
            if dx * dx + dy * dy > r2 {
                continue;
            }
            let v = gray_at(image, x + dx, y + dy) as f32;
            m10 += dx as f32 * v;
            m01 += dy as f32 * v;
        }
    }
    m01.atan2(m10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trailsense_core::GrayImage;

    fn params() -> FastParams {
        FastParams {
            threshold: 20,
            grid_size: 8,
            max_features: 500,
            harris_k: 0.04,
            border: 3,
        }
    }

    #[test]
    fn flat_image_has_no_corners() {
        let img = GrayImage::from_raw(64, 64, vec![128; 64 * 64]).expect("gray");
        assert!(detect(&img.view(), &params()).is_empty());
    }

    #[test]
    fn tiny_image_is_rejected() {
        let img = GrayImage::new(5, 5);
        assert!(detect(&img.view(), &params()).is_empty());
    }

    #[test]
    fn bright_square_yields_corner_keypoints() {
        let mut img = GrayImage::from_raw(64, 64, vec![20; 64 * 64]).expect("gray");
        for y in 24..40 {
            for x in 24..40 {
                img.data[y * 64 + x] = 220;
            }
        }
        let kps = detect(&img.view(), &params());
        assert!(!kps.is_empty());
        let near = |cx: f32, cy: f32| {
            kps.iter()
                .any(|k| (k.position.x - cx).abs() <= 3.0 && (k.position.y - cy).abs() <= 3.0)
        };
        assert!(near(24.0, 24.0));
        assert!(near(39.0, 39.0));
        for w in kps.windows(2) {
            assert!(w[0].response >= w[1].response);
        }
    }

    #[test]
    fn max_features_truncates() {
        let mut data = vec![0u8; 96 * 96];
        for by in 0..3 {
            for bx in 0..3 {
                for y in 10 + by * 28..20 + by * 28 {
                    for x in 10 + bx * 28..20 + bx * 28 {
                        data[y * 96 + x] = 255;
                    }
                }
            }
        }
        let img = GrayImage::from_raw(96, 96, data).expect("gray");
        let mut p = params();
        p.max_features = 5;
        assert_eq!(detect(&img.view(), &p).len(), 5);
    }
}
