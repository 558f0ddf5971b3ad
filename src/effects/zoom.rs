use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::config::{ZoomDirection, ZoomOptions};
use crate::media::Frame;

/// Zoom one frame by `factor`.
///
/// Zoom-in crops a centered region of `frame / factor` and resamples it back
/// to the full frame size. Zoom-out resamples the frame down to
/// `frame / factor` and pastes it centered on a black canvas. Either way the
/// output dimensions equal the input dimensions. Factors at or below 1.0 are
/// the identity.
pub fn zoom_frame(frame: &Frame, factor: f64, direction: ZoomDirection) -> Frame {
    if factor <= 1.0 {
        return frame.clone();
    }

    let width = frame.width();
    let height = frame.height();
    let inner_w = ((width as f64 / factor) as u32).max(1);
    let inner_h = ((height as f64 / factor) as u32).max(1);

    match direction {
        ZoomDirection::In => {
            let x0 = (width - inner_w) / 2;
            let y0 = (height - inner_h) / 2;
            let cropped = imageops::crop_imm(frame.as_image(), x0, y0, inner_w, inner_h).to_image();
            let zoomed = imageops::resize(&cropped, width, height, FilterType::Lanczos3);
            Frame::new(zoomed)
        }
        ZoomDirection::Out => {
            let shrunk = imageops::resize(frame.as_image(), inner_w, inner_h, FilterType::Lanczos3);
            let mut canvas: RgbImage = image::ImageBuffer::new(width, height);
            let x0 = ((width - inner_w) / 2) as i64;
            let y0 = ((height - inner_h) / 2) as i64;
            imageops::replace(&mut canvas, &shrunk, x0, y0);
            Frame::new(canvas)
        }
    }
}

/// Effective zoom factor at time `t` for the timed sub-mode.
///
/// Each `interval`-second cycle ramps linearly across its first
/// `ramp_duration` seconds: from 1.0 up to the configured factor when zooming
/// in, from the factor back down to 1.0 when zooming out. Outside the ramp
/// the frame is unzoomed.
pub fn timed_factor(options: &ZoomOptions, t: f64) -> f64 {
    if options.interval <= 0.0 || options.ramp_duration <= 0.0 {
        return 1.0;
    }
    let cycle_pos = t % options.interval;
    if cycle_pos >= options.ramp_duration {
        return 1.0;
    }
    let progress = cycle_pos / options.ramp_duration;
    match options.direction {
        ZoomDirection::In => 1.0 + (options.factor - 1.0) * progress,
        ZoomDirection::Out => options.factor - (options.factor - 1.0) * progress,
    }
}
