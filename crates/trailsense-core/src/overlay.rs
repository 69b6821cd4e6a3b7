//! Minimal raster overlay primitives for annotated frames.

use nalgebra::Point2;

use crate::RgbFrame;

pub const OVERLAY_GREEN: [u8; 3] = [0, 255, 0];
pub const OVERLAY_AMBER: [u8; 3] = [255, 255, 0];
pub const OVERLAY_RED: [u8; 3] = [255, 0, 0];

/// 3×5 glyphs for `0..=9` followed by `%`, one row per `u8` (low 3 bits, MSB left).
const GLYPHS: [[u8; 5]; 11] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
    [0b101, 0b001, 0b010, 0b100, 0b101],
];

/// Open circle outline (midpoint algorithm), clipped to the frame.
pub fn draw_circle(frame: &mut RgbFrame, center: Point2<f32>, radius: i32, color: [u8; 3]) {
    let cx = center.x.round() as i32;
    let cy = center.y.round() as i32;
    let mut x = radius.max(0);
    let mut y = 0;
    let mut err = 1 - x;

    while x >= y {
        for (dx, dy) in [
            (x, y),
            (y, x),
            (-y, x),
            (-x, y),
            (-x, -y),
            (-y, -x),
            (y, -x),
            (x, -y),
        ] {
            frame.put_pixel(cx + dx, cy + dy, color);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

pub fn fill_rect(frame: &mut RgbFrame, x0: i32, y0: i32, w: i32, h: i32, color: [u8; 3]) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            frame.put_pixel(x, y, color);
        }
    }
}

/// Render decimal digits and `%` with the embedded bitmap font.
///
/// Characters without a glyph are skipped. Returns the x coordinate after the
/// last rendered glyph.
pub fn draw_text(
    frame: &mut RgbFrame,
    x: i32,
    y: i32,
    text: &str,
    scale: i32,
    color: [u8; 3],
) -> i32 {
    let scale = scale.max(1);
    let mut pen = x;
    for ch in text.chars() {
        let glyph = match ch {
            '0'..='9' => GLYPHS[(ch as u8 - b'0') as usize],
            '%' => GLYPHS[10],
            _ => continue,
        };
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..3 {
                if bits & (0b100 >> col) != 0 {
                    fill_rect(
                        frame,
                        pen + col * scale,
                        y + row as i32 * scale,
                        scale,
                        scale,
                        color,
                    );
                }
            }
        }
        pen += 4 * scale;
    }
    pen
}

/// Confidence readout: an outlined gauge filled in proportion to `confidence`
/// (0..=100) followed by the integer percentage.
pub fn draw_confidence_readout(frame: &mut RgbFrame, confidence: f32, color: [u8; 3]) {
    const X: i32 = 10;
    const Y: i32 = 10;
    const W: i32 = 100;
    const H: i32 = 10;

    let pct = confidence.clamp(0.0, 100.0);
    fill_rect(frame, X - 1, Y - 1, W + 2, 1, color);
    fill_rect(frame, X - 1, Y + H, W + 2, 1, color);
    fill_rect(frame, X - 1, Y, 1, H, color);
    fill_rect(frame, X + W, Y, 1, H, color);
    fill_rect(frame, X, Y, (pct * W as f32 / 100.0) as i32, H, color);

    draw_text(frame, X + W + 8, Y, &format!("{}%", pct as i32), 2, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(frame: &RgbFrame) -> usize {
        frame.data.chunks_exact(3).filter(|p| p != &[0, 0, 0]).count()
    }

    #[test]
    fn circle_is_symmetric_and_open() {
        let mut frame = RgbFrame::new(21, 21);
        draw_circle(&mut frame, Point2::new(10.0, 10.0), 4, OVERLAY_GREEN);
        assert_eq!(frame.pixel(14, 10), Some(OVERLAY_GREEN));
        assert_eq!(frame.pixel(6, 10), Some(OVERLAY_GREEN));
        assert_eq!(frame.pixel(10, 14), Some(OVERLAY_GREEN));
        assert_eq!(frame.pixel(10, 10), Some([0, 0, 0]));
    }

    #[test]
    fn circle_near_border_is_clipped() {
        let mut frame = RgbFrame::new(5, 5);
        draw_circle(&mut frame, Point2::new(0.0, 0.0), 4, OVERLAY_RED);
        assert!(lit(&frame) > 0);
    }

    #[test]
    fn readout_grows_with_confidence() {
        let mut low = RgbFrame::new(200, 40);
        let mut high = RgbFrame::new(200, 40);
        draw_confidence_readout(&mut low, 10.0, OVERLAY_AMBER);
        draw_confidence_readout(&mut high, 90.0, OVERLAY_AMBER);
        assert!(lit(&high) > lit(&low));
    }

    #[test]
    fn text_skips_unknown_characters() {
        let mut frame = RgbFrame::new(40, 10);
        let end = draw_text(&mut frame, 0, 0, "7x%", 1, OVERLAY_RED);
        assert_eq!(end, 8);
    }
}
