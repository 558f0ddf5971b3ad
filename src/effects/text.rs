use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use image::RgbaImage;
use tracing::warn;

use crate::config::{TextOptions, TextPosition};
use crate::media::Frame;

/// A caption rasterized once per segment and composited over every frame.
#[derive(Clone, Debug)]
pub struct CaptionLayer {
    overlay: RgbaImage,
}

/// Compact built-in glyph set: 5x7 bitmaps covering ASCII letters, digits and
/// basic punctuation. Lowercase folds to uppercase; unknown characters render
/// as a filled box. Used whenever no font resource loads.
const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;

fn builtin_glyph(c: char) -> [u8; 7] {
    let c = c.to_ascii_uppercase();
    match c {
        ' ' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x1B, 0x11],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        '?' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '\'' => [0x04, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        _ => [0x1F, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F],
    }
}

/// Parse a named or `#rrggbb` color, falling back to white.
pub fn parse_color(value: &str) -> [u8; 3] {
    match value.trim().to_ascii_lowercase().as_str() {
        "black" => [0, 0, 0],
        "red" => [255, 0, 0],
        "green" => [0, 255, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "white" => [255, 255, 255],
        hex if hex.starts_with('#') && hex.len() == 7 => {
            let parse = |range| u8::from_str_radix(&hex[range], 16);
            match (parse(1..3), parse(3..5), parse(5..7)) {
                (Ok(r), Ok(g), Ok(b)) => [r, g, b],
                _ => [255, 255, 255],
            }
        }
        _ => [255, 255, 255],
    }
}

/// Anchor point for a caption, centered on the returned coordinate.
fn anchor(width: u32, height: u32, position: TextPosition) -> (f32, f32) {
    let w = width as f32;
    let h = height as f32;
    match position {
        TextPosition::Center => (w / 2.0, h / 2.0),
        TextPosition::Top => (w / 2.0, 50.0_f32.min(h / 2.0)),
        TextPosition::Bottom => (w / 2.0, (h - 100.0).max(h / 2.0)),
        TextPosition::Watermark => (50.0_f32.min(w / 2.0), 50.0_f32.min(h / 2.0)),
    }
}

impl CaptionLayer {
    /// Rasterize a caption for frames of the given dimensions.
    ///
    /// Returns `None` for empty captions. A font resource that is absent or
    /// fails to parse degrades to the built-in glyph set rather than failing
    /// the stage.
    pub fn build(width: u32, height: u32, options: &TextOptions) -> Option<Self> {
        let text = options.content.trim();
        if text.is_empty() || width == 0 || height == 0 {
            return None;
        }

        let color = parse_color(&options.color);
        let (cx, cy) = anchor(width, height, options.position);
        let mut overlay = RgbaImage::new(width, height);

        let font = options.font_path.as_ref().and_then(|path| {
            match std::fs::read(path).ok().and_then(|data| FontVec::try_from_vec(data).ok()) {
                Some(font) => Some(font),
                None => {
                    warn!("Font resource {:?} failed to load, using built-in glyphs", path);
                    None
                }
            }
        });

        match font {
            Some(font) => raster_font(&mut overlay, &font, text, options.size, color, cx, cy),
            None => raster_builtin(&mut overlay, text, options.size, color, cx, cy),
        }

        Some(Self { overlay })
    }

    /// Alpha-composite the caption over one frame.
    pub fn composite(&self, frame: &mut Frame) {
        let width = frame.width().min(self.overlay.width());
        let height = frame.height().min(self.overlay.height());
        for y in 0..height {
            for x in 0..width {
                let src = self.overlay.get_pixel(x, y).0;
                let alpha = src[3] as f32 / 255.0;
                if alpha <= 0.0 {
                    continue;
                }
                let dst = frame.get_pixel_mut(x, y);
                for c in 0..3 {
                    dst[c] = (dst[c] as f32 * (1.0 - alpha) + src[c] as f32 * alpha)
                        .round()
                        .clamp(0.0, 255.0) as u8;
                }
            }
        }
    }

    /// True if any pixel of the layer is visible
    pub fn is_visible(&self) -> bool {
        self.overlay.pixels().any(|p| p.0[3] > 0)
    }
}

fn raster_font(
    overlay: &mut RgbaImage,
    font: &FontVec,
    text: &str,
    size: f32,
    color: [u8; 3],
    cx: f32,
    cy: f32,
) {
    let scale = PxScale::from(size.max(1.0));
    let scaled = font.as_scaled(scale);

    let text_width: f32 = text.chars().map(|c| scaled.h_advance(font.glyph_id(c))).sum();
    let text_height = scaled.ascent() - scaled.descent();
    let baseline = cy - text_height / 2.0 + scaled.ascent();
    let mut caret = cx - text_width / 2.0;

    let (canvas_w, canvas_h) = (overlay.width() as i64, overlay.height() as i64);
    for c in text.chars() {
        let id = font.glyph_id(c);
        let glyph = id.with_scale_and_position(scale, point(caret, baseline));
        caret += scaled.h_advance(id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i64 + gx as i64;
                let py = bounds.min.y as i64 + gy as i64;
                if px < 0 || py < 0 || px >= canvas_w || py >= canvas_h {
                    return;
                }
                let alpha = (coverage * 255.0).round().clamp(0.0, 255.0) as u8;
                let pixel = overlay.get_pixel_mut(px as u32, py as u32);
                if alpha > pixel.0[3] {
                    *pixel = image::Rgba([color[0], color[1], color[2], alpha]);
                }
            });
        }
    }
}

fn raster_builtin(overlay: &mut RgbaImage, text: &str, size: f32, color: [u8; 3], cx: f32, cy: f32) {
    let pixel_scale = ((size / GLYPH_HEIGHT as f32).round() as u32).max(1);
    let advance = (GLYPH_WIDTH + 1) * pixel_scale;
    let glyph_h = GLYPH_HEIGHT * pixel_scale;

    let char_count = text.chars().count() as u32;
    let text_width = char_count * advance;
    let origin_x = cx - text_width as f32 / 2.0;
    let origin_y = cy - glyph_h as f32 / 2.0;

    let (canvas_w, canvas_h) = (overlay.width() as i64, overlay.height() as i64);
    for (index, c) in text.chars().enumerate() {
        let rows = builtin_glyph(c);
        let glyph_x = origin_x + (index as u32 * advance) as f32;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                // one glyph bit covers a pixel_scale square
                for sy in 0..pixel_scale {
                    for sx in 0..pixel_scale {
                        let px = (glyph_x + (col * pixel_scale + sx) as f32) as i64;
                        let py = (origin_y + (row as u32 * pixel_scale + sy) as f32) as i64;
                        if px < 0 || py < 0 || px >= canvas_w || py >= canvas_h {
                            continue;
                        }
                        overlay.put_pixel(
                            px as u32,
                            py as u32,
                            image::Rgba([color[0], color[1], color[2], 255]),
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(content: &str) -> TextOptions {
        TextOptions { enabled: true, content: content.to_string(), ..TextOptions::default() }
    }

    #[test]
    fn empty_caption_builds_nothing() {
        assert!(CaptionLayer::build(100, 100, &options("")).is_none());
        assert!(CaptionLayer::build(100, 100, &options("   ")).is_none());
    }

    #[test]
    fn builtin_glyphs_render_visible_pixels() {
        let layer = CaptionLayer::build(200, 100, &options("HELLO")).unwrap();
        assert!(layer.is_visible());
    }

    #[test]
    fn missing_font_degrades_to_builtin_glyphs() {
        let mut opts = options("FALLBACK");
        opts.font_path = Some("/no/such/font.ttf".into());
        let layer = CaptionLayer::build(200, 100, &opts).unwrap();
        assert!(layer.is_visible());
    }

    #[test]
    fn composite_changes_frame_near_the_anchor() {
        let layer = CaptionLayer::build(100, 100, &options("X")).unwrap();
        let mut frame = Frame::new_black(100, 100);
        layer.composite(&mut frame);

        let changed = (40..60)
            .flat_map(|y| (40..60).map(move |x| (x, y)))
            .any(|(x, y)| frame.get_pixel(x, y) != [0, 0, 0]);
        assert!(changed, "centered caption should touch the frame center region");
    }

    #[test]
    fn composite_respects_color() {
        let mut opts = options("I");
        opts.color = "red".to_string();
        let layer = CaptionLayer::build(60, 60, &opts).unwrap();
        let mut frame = Frame::new_black(60, 60);
        layer.composite(&mut frame);

        let mut found_red = false;
        for y in 0..60 {
            for x in 0..60 {
                let p = frame.get_pixel(x, y);
                if p != [0, 0, 0] {
                    assert_eq!(p, [255, 0, 0]);
                    found_red = true;
                }
            }
        }
        assert!(found_red);
    }

    #[test]
    fn color_parsing_handles_names_and_hex() {
        assert_eq!(parse_color("white"), [255, 255, 255]);
        assert_eq!(parse_color("RED"), [255, 0, 0]);
        assert_eq!(parse_color("#102030"), [16, 32, 48]);
        assert_eq!(parse_color("no-such-color"), [255, 255, 255]);
        assert_eq!(parse_color("#zzzzzz"), [255, 255, 255]);
    }

    #[test]
    fn watermark_anchor_sits_in_the_corner_region() {
        let mut opts = options("WM");
        opts.position = TextPosition::Watermark;
        let layer = CaptionLayer::build(400, 400, &opts).unwrap();
        let mut frame = Frame::new_black(400, 400);
        layer.composite(&mut frame);

        let top_left_touched = (0..120)
            .flat_map(|y| (0..120).map(move |x| (x, y)))
            .any(|(x, y)| frame.get_pixel(x, y) != [0, 0, 0]);
        let bottom_right_untouched = (280..400)
            .flat_map(|y| (280..400).map(move |x| (x, y)))
            .all(|(x, y)| frame.get_pixel(x, y) == [0, 0, 0]);
        assert!(top_left_touched);
        assert!(bottom_right_untouched);
    }
}
