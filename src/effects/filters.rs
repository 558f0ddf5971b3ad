use image::imageops;
use rand::Rng;

use crate::media::Frame;

/// Gaussian blur with the given radius in pixels.
pub fn blur_frame(frame: &Frame, radius: f32) -> Frame {
    if radius <= 0.0 {
        return frame.clone();
    }
    Frame::new(imageops::blur(frame.as_image(), radius))
}

/// Channel-shift glitch.
///
/// The red channel rolls right and the blue channel rolls left by
/// `intensity * width` pixels with wrap-around; green is untouched.
pub fn glitch_frame(frame: &Frame, intensity: f64) -> Frame {
    let width = frame.width();
    let height = frame.height();
    let shift = (intensity * width as f64) as i64;
    if shift == 0 || width == 0 {
        return frame.clone();
    }

    let mut out = frame.clone();
    for y in 0..height {
        for x in 0..width {
            let red_src = (x as i64 - shift).rem_euclid(width as i64) as u32;
            let blue_src = (x as i64 + shift).rem_euclid(width as i64) as u32;
            let red = frame.get_pixel(red_src, y)[0];
            let blue = frame.get_pixel(blue_src, y)[2];
            let pixel = out.get_pixel_mut(x, y);
            pixel[0] = red;
            pixel[2] = blue;
        }
    }
    out
}

/// Old-film look: sepia color matrix, probabilistic scratch band, brightness
/// flicker.
///
/// A scratch is a full-width white band 1-4 pixels tall at a uniformly random
/// row, injected with per-frame probability `scratch_intensity`. Flicker
/// multiplies the frame by a factor drawn uniformly from [0.8, 1.2].
pub fn old_film_frame<R: Rng>(frame: &Frame, scratch_intensity: f64, rng: &mut R) -> Frame {
    let width = frame.width();
    let height = frame.height();
    let mut out = frame.clone();

    let flicker = 0.8 + 0.4 * rng.gen::<f64>();

    for y in 0..height {
        for x in 0..width {
            let [r, g, b] = frame.get_pixel(x, y);
            let (r, g, b) = (r as f64, g as f64, b as f64);
            let sepia_r = (0.393 * r + 0.769 * g + 0.189 * b).min(255.0);
            let sepia_g = (0.349 * r + 0.686 * g + 0.168 * b).min(255.0);
            let sepia_b = (0.272 * r + 0.534 * g + 0.131 * b).min(255.0);
            out.set_pixel(
                x,
                y,
                [
                    (sepia_r * flicker).clamp(0.0, 255.0) as u8,
                    (sepia_g * flicker).clamp(0.0, 255.0) as u8,
                    (sepia_b * flicker).clamp(0.0, 255.0) as u8,
                ],
            );
        }
    }

    if height > 0 && rng.gen::<f64>() < scratch_intensity {
        let scratch_y = rng.gen_range(0..height);
        let band = rng.gen_range(1..5u32);
        for y in scratch_y..(scratch_y + band).min(height) {
            for x in 0..width {
                out.set_pixel(x, y, [255, 255, 255]);
            }
        }
    }

    out
}
