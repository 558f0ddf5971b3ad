use image::imageops;
use image::RgbImage;

use crate::config::MirrorAxis;
use crate::media::Frame;

/// Flip a frame across the requested axis.
pub fn mirror_frame(frame: &Frame, axis: MirrorAxis) -> Frame {
    let flipped = match axis {
        MirrorAxis::Horizontal => imageops::flip_horizontal(frame.as_image()),
        MirrorAxis::Vertical => imageops::flip_vertical(frame.as_image()),
    };
    Frame::new(flipped)
}

/// Rotate a frame counter-clockwise by an arbitrary angle in degrees.
///
/// The output canvas expands so no content is clipped; uncovered corners are
/// black. Sampling is bilinear via inverse mapping.
pub fn rotate_frame(frame: &Frame, angle_degrees: f64) -> Frame {
    let theta = angle_degrees.to_radians();
    let (sin_t, cos_t) = theta.sin_cos();

    let src_w = frame.width() as f64;
    let src_h = frame.height() as f64;
    let out_w = (src_w * cos_t.abs() + src_h * sin_t.abs()).round().max(1.0) as u32;
    let out_h = (src_w * sin_t.abs() + src_h * cos_t.abs()).round().max(1.0) as u32;

    let src_cx = (src_w - 1.0) / 2.0;
    let src_cy = (src_h - 1.0) / 2.0;
    let out_cx = (out_w as f64 - 1.0) / 2.0;
    let out_cy = (out_h as f64 - 1.0) / 2.0;

    let src = frame.as_image();
    let mut out: RgbImage = image::ImageBuffer::new(out_w, out_h);

    for y in 0..out_h {
        for x in 0..out_w {
            let dx = x as f64 - out_cx;
            let dy = y as f64 - out_cy;
            let sx = cos_t * dx - sin_t * dy + src_cx;
            let sy = sin_t * dx + cos_t * dy + src_cy;
            if let Some(color) = sample_bilinear(src, sx, sy) {
                out.put_pixel(x, y, image::Rgb(color));
            }
        }
    }

    Frame::new(out)
}

fn sample_bilinear(img: &RgbImage, x: f64, y: f64) -> Option<[u8; 3]> {
    let w = img.width() as f64;
    let h = img.height() as f64;
    if x < -0.5 || y < -0.5 || x > w - 0.5 || y > h - 0.5 {
        return None;
    }

    let x0 = x.floor().clamp(0.0, w - 1.0);
    let y0 = y.floor().clamp(0.0, h - 1.0);
    let x1 = (x0 + 1.0).min(w - 1.0);
    let y1 = (y0 + 1.0).min(h - 1.0);
    let fx = (x - x0).clamp(0.0, 1.0);
    let fy = (y - y0).clamp(0.0, 1.0);

    let p00 = img.get_pixel(x0 as u32, y0 as u32).0;
    let p10 = img.get_pixel(x1 as u32, y0 as u32).0;
    let p01 = img.get_pixel(x0 as u32, y1 as u32).0;
    let p11 = img.get_pixel(x1 as u32, y1 as u32).0;

    let mut color = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
        let bottom = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
        color[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Some(color)
}
