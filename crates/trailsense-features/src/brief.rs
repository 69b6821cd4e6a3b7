//! Steered BRIEF descriptors.
//!
//! 256 point-pair intensity tests inside a disc of radius `PATCH_RADIUS`,
//! rotated by the keypoint orientation and sampled bilinearly on a
//! box-smoothed copy of the frame.

use trailsense_core::{sample_bilinear, BinaryDescriptor, GrayImage, GrayImageView, Keypoint};

pub(crate) const PATCH_RADIUS: f32 = 15.0;
const PATTERN_SEED: u64 = 0x9e37_79b9_7f4a_7c15;
const PATTERN_SIGMA: f32 = 31.0 / 5.0;

pub(crate) struct BriefPattern {
    tests: [[f32; 4]; 256],
}

impl BriefPattern {
    /// Deterministic isotropic-Gaussian pattern (BRIEF "G II" sampling).
    pub(crate) fn generate() -> Self {
        let mut rng = XorShift(PATTERN_SEED);
        let mut tests = [[0.0f32; 4]; 256];
        for test in tests.iter_mut() {
            let (x1, y1) = sample_in_disc(&mut rng);
            let (x2, y2) = loop {
                let p = sample_in_disc(&mut rng);
                if p != (x1, y1) {
                    break p;
                }
            };
            *test = [x1, y1, x2, y2];
        }
        Self { tests }
    }

    pub(crate) fn describe(
        &self,
        image: &GrayImageView<'_>,
        kp: &Keypoint,
    ) -> Option<BinaryDescriptor> {
        let margin = PATCH_RADIUS + 1.0;
        let (cx, cy) = (kp.position.x, kp.position.y);
        if cx < margin
            || cy < margin
            || cx >= image.width as f32 - margin
            || cy >= image.height as f32 - margin
        {
            return None;
        }

        let (sin_a, cos_a) = kp.angle.sin_cos();
        let mut words = [0u64; 4];
        for (i, &[x1, y1, x2, y2]) in self.tests.iter().enumerate() {
            let a = sample_bilinear(
                image,
                cx + x1 * cos_a - y1 * sin_a,
                cy + x1 * sin_a + y1 * cos_a,
            );
            let b = sample_bilinear(
                image,
                cx + x2 * cos_a - y2 * sin_a,
                cy + x2 * sin_a + y2 * cos_a,
            );
            if a < b {
                words[i / 64] |= 1u64 << (i % 64);
            }
        }
        Some(BinaryDescriptor(words))
    }
}

/// 5×5 box filter with clamped borders.
pub(crate) fn smooth(image: &GrayImageView<'_>) -> GrayImage {
    const R: i32 = 2;
    let (w, h) = (image.width as i32, image.height as i32);
    let mut out = GrayImage::new(image.width, image.height);
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0u32;
            for dy in -R..=R {
                let sy = (y + dy).clamp(0, h - 1) as usize;
                for dx in -R..=R {
                    let sx = (x + dx).clamp(0, w - 1) as usize;
                    sum += image.data[sy * image.width + sx] as u32;
                }
            }
            out.data[y as usize * image.width + x as usize] = (sum / 25) as u8;
        }
    }
    out
}

fn sample_in_disc(rng: &mut XorShift) -> (f32, f32) {
    let limit = PATCH_RADIUS - 1.0;
    loop {
        let x = (rng.gaussian() * PATTERN_SIGMA).round();
        let y = (rng.gaussian() * PATTERN_SIGMA).round();
        if x * x + y * y <= limit * limit {
            return (x, y);
        }
    }
}

struct XorShift(u64);

impl XorShift {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn uniform(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Irwin–Hall approximation of a unit normal.
    fn gaussian(&mut self) -> f32 {
        (0..12).map(|_| self.uniform()).sum::<f32>() - 6.0
    }
}
