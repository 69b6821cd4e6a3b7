//! Lightweight frame buffers.
//!
//! Frames enter the engine as packed RGB (`RgbFrame`) and are reduced to
//! 8-bit luma (`GrayImage`) before feature extraction. Neither type depends on
//! a concrete image library; adapters live in the `trailsense` facade.

/// Errors raised when wrapping raw pixel buffers.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("invalid frame dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },
    #[error("invalid frame buffer length (expected {expected} bytes, got {got})")]
    InvalidBuffer { expected: usize, got: usize },
}

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, FrameError> {
        let expected = checked_len(width, height, 1)?;
        if data.len() != expected {
            return Err(FrameError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

/// Packed 8-bit RGB frame, row-major, `len = w*h*3`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbFrame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl RgbFrame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * 3],
        }
    }

    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, FrameError> {
        let expected = checked_len(width, height, 3)?;
        if data.len() != expected {
            return Err(FrameError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 3;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    /// Write a pixel; coordinates outside the frame are ignored.
    #[inline]
    pub fn put_pixel(&mut self, x: i32, y: i32, rgb: [u8; 3]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let i = (y as usize * self.width + x as usize) * 3;
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    /// Luma conversion with BT.601 weights (0.299 R + 0.587 G + 0.114 B).
    pub fn to_gray(&self) -> GrayImage {
        let data = self
            .data
            .chunks_exact(3)
            .map(|px| {
                let y = 299 * px[0] as u32 + 587 * px[1] as u32 + 114 * px[2] as u32;
                ((y + 500) / 1000) as u8
            })
            .collect();
        GrayImage {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

fn checked_len(width: usize, height: usize, channels: usize) -> Result<usize, FrameError> {
    if width == 0 || height == 0 {
        return Err(FrameError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(FrameError::InvalidDimensions { width, height })
}

#[inline]
pub fn gray_at(src: &GrayImageView<'_>, x: i32, y: i32) -> u8 {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return 0;
    }
    src.data[y as usize * src.width + x as usize]
}

#[inline]
pub fn sample_bilinear(src: &GrayImageView<'_>, x: f32, y: f32) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = gray_at(src, x0, y0) as f32;
    let p10 = gray_at(src, x0 + 1, y0) as f32;
    let p01 = gray_at(src, x0, y0 + 1) as f32;
    let p11 = gray_at(src, x0 + 1, y0 + 1) as f32;

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rgb_to_gray_uses_bt601_weights() {
        let frame = RgbFrame::from_raw(2, 1, vec![255, 0, 0, 0, 0, 255]).expect("frame");
        let gray = frame.to_gray();
        assert_eq!(gray.data, vec![76, 29]);
    }

    #[test]
    fn from_raw_rejects_wrong_length() {
        let err = RgbFrame::from_raw(4, 4, vec![0; 10]).unwrap_err();
        assert_eq!(
            err,
            FrameError::InvalidBuffer {
                expected: 48,
                got: 10
            }
        );
        assert!(GrayImage::from_raw(0, 3, Vec::new()).is_err());
    }

    #[test]
    fn bilinear_interpolates_between_pixels() {
        let img = GrayImage::from_raw(2, 1, vec![0, 100]).expect("gray");
        let v = sample_bilinear(&img.view(), 0.25, 0.0);
        assert_abs_diff_eq!(v, 25.0, epsilon = 1e-4);
    }

    #[test]
    fn put_pixel_outside_is_ignored() {
        let mut frame = RgbFrame::new(3, 3);
        frame.put_pixel(-1, 0, [255, 255, 255]);
        frame.put_pixel(3, 3, [255, 255, 255]);
        frame.put_pixel(1, 1, [1, 2, 3]);
        assert!(frame.data.iter().filter(|&&v| v != 0).count() == 3);
        assert_eq!(frame.pixel(1, 1), Some([1, 2, 3]));
    }
}
