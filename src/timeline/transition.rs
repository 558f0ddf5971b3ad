use image::imageops::{self, FilterType};
use tracing::warn;

use crate::config::{SlideDirection, TransitionKind, TransitionOptions};
use crate::media::{Frame, SegmentClip};

/// Stitch processed segments into one continuous frame stream.
///
/// For every adjacent pair the previous segment's tail is shortened by
/// exactly the transition duration and replaced with the blended overlap, so
/// each transition removes one overlap's worth of total duration. A single
/// segment, or `kind = none`, is plain concatenation.
pub fn join_segments(segments: &[SegmentClip], options: &TransitionOptions) -> Vec<Frame> {
    let mut timeline: Vec<Frame> = Vec::new();

    for (index, segment) in segments.iter().enumerate() {
        if index == 0 || options.kind == TransitionKind::None {
            timeline.extend(segment.frames.iter().cloned());
            continue;
        }

        let fps = segment.fps;
        let overlap = ((options.duration * fps).round() as usize)
            .min(timeline.len())
            .min(segment.frames.len());

        if overlap == 0 {
            timeline.extend(segment.frames.iter().cloned());
            continue;
        }

        let outgoing = timeline.split_off(timeline.len() - overlap);
        let incoming = &segment.frames[..overlap];

        if outgoing[0].width() != incoming[0].width()
            || outgoing[0].height() != incoming[0].height()
        {
            // mismatched canvases cannot blend; degrade to a hard cut
            warn!("Transition skipped: segment canvases differ, falling back to concatenation");
            timeline.extend(outgoing);
            timeline.extend(segment.frames.iter().cloned());
            continue;
        }

        for i in 0..overlap {
            let progress = i as f64 / overlap as f64;
            let frame = match options.kind {
                TransitionKind::Fade => fade_frame(&outgoing[i], &incoming[i], progress),
                TransitionKind::Slide => {
                    slide_frame(&outgoing[i], &incoming[i], progress, options.direction)
                }
                TransitionKind::Zoom => zoom_frame(&incoming[i], progress),
                TransitionKind::None => unreachable!("none handled above"),
            };
            timeline.push(frame);
        }
        timeline.extend(segment.frames[overlap..].iter().cloned());
    }

    timeline
}

/// Time-aligned cross-blend: the outgoing frame fades out while the incoming
/// frame fades in.
fn fade_frame(outgoing: &Frame, incoming: &Frame, progress: f64) -> Frame {
    let width = outgoing.width();
    let height = outgoing.height();
    let alpha = progress.clamp(0.0, 1.0);

    let mut out = Frame::new_black(width, height);
    for y in 0..height {
        for x in 0..width {
            let a = outgoing.get_pixel(x, y);
            let b = incoming.get_pixel(x, y);
            let mut color = [0u8; 3];
            for c in 0..3 {
                color[c] =
                    (a[c] as f64 * (1.0 - alpha) + b[c] as f64 * alpha).round().clamp(0.0, 255.0) as u8;
            }
            out.set_pixel(x, y, color);
        }
    }
    out
}

/// Push-slide: the incoming frame enters from the configured edge as a linear
/// function of elapsed overlap time, pushing the outgoing content off the
/// opposite edge.
fn slide_frame(outgoing: &Frame, incoming: &Frame, progress: f64, direction: SlideDirection) -> Frame {
    let width = outgoing.width();
    let height = outgoing.height();
    let shift = (progress.clamp(0.0, 1.0) * width as f64) as u32;

    let mut out = Frame::new_black(width, height);
    for y in 0..height {
        for x in 0..width {
            let color = match direction {
                SlideDirection::Left => {
                    // content moves left; incoming enters from the right edge
                    if x + shift < width {
                        outgoing.get_pixel(x + shift, y)
                    } else {
                        incoming.get_pixel(x + shift - width, y)
                    }
                }
                SlideDirection::Right => {
                    if x >= shift {
                        outgoing.get_pixel(x - shift, y)
                    } else {
                        incoming.get_pixel(width - shift + x, y)
                    }
                }
            };
            out.set_pixel(x, y, color);
        }
    }
    out
}

/// Zoom transition: the incoming frame grows from 1x, center-cropped back to
/// the canvas, fully covering the outgoing segment during the overlap.
fn zoom_frame(incoming: &Frame, progress: f64) -> Frame {
    let width = incoming.width();
    let height = incoming.height();
    let scale = 1.0 + progress.clamp(0.0, 1.0);

    let scaled_w = ((width as f64 * scale) as u32).max(width);
    let scaled_h = ((height as f64 * scale) as u32).max(height);
    if scaled_w == width && scaled_h == height {
        return incoming.clone();
    }

    let scaled = imageops::resize(incoming.as_image(), scaled_w, scaled_h, FilterType::Lanczos3);
    let x0 = (scaled_w - width) / 2;
    let y0 = (scaled_h - height) / 2;
    let cropped = imageops::crop_imm(&scaled, x0, y0, width, height).to_image();
    Frame::new(cropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_segment(color: [u8; 3], frame_count: usize, fps: f64) -> SegmentClip {
        let frames = vec![Frame::new_filled(20, 10, color); frame_count];
        SegmentClip::new(0.0, frame_count as f64 / fps, fps, frames)
    }

    #[test]
    fn none_kind_concatenates_without_duration_change() {
        let a = solid_segment([255, 0, 0], 12, 10.0);
        let b = solid_segment([0, 255, 0], 8, 10.0);
        let options = TransitionOptions { kind: TransitionKind::None, ..Default::default() };

        let timeline = join_segments(&[a, b], &options);
        assert_eq!(timeline.len(), 20);
        assert_eq!(timeline[11].get_pixel(0, 0), [255, 0, 0]);
        assert_eq!(timeline[12].get_pixel(0, 0), [0, 255, 0]);
    }

    #[test]
    fn single_segment_ignores_the_configured_kind() {
        let a = solid_segment([9, 9, 9], 15, 10.0);
        let options = TransitionOptions { kind: TransitionKind::Fade, duration: 1.0, ..Default::default() };
        let timeline = join_segments(&[a], &options);
        assert_eq!(timeline.len(), 15);
    }

    #[test]
    fn fade_shortens_the_pair_by_exactly_the_overlap() {
        // 1s overlap at 10 fps = 10 frames removed from the total
        let a = solid_segment([200, 0, 0], 20, 10.0);
        let b = solid_segment([0, 200, 0], 20, 10.0);
        let options = TransitionOptions { kind: TransitionKind::Fade, duration: 1.0, ..Default::default() };

        let timeline = join_segments(&[a, b], &options);
        assert_eq!(timeline.len(), 30);
    }

    #[test]
    fn fade_blends_from_outgoing_to_incoming() {
        let a = solid_segment([200, 0, 0], 10, 10.0);
        let b = solid_segment([0, 200, 0], 10, 10.0);
        let options = TransitionOptions { kind: TransitionKind::Fade, duration: 1.0, ..Default::default() };

        let timeline = join_segments(&[a, b], &options);
        // overlap spans timeline[0..10]
        assert_eq!(timeline[0].get_pixel(5, 5), [200, 0, 0], "overlap starts as outgoing");
        let mid = timeline[5].get_pixel(5, 5);
        assert_eq!(mid, [100, 100, 0], "midpoint is the even blend");
        let last = timeline[9].get_pixel(5, 5);
        assert!(last[1] > last[0], "overlap ends dominated by incoming");
    }

    #[test]
    fn slide_starts_with_outgoing_and_ends_with_incoming() {
        let a = solid_segment([255, 0, 0], 10, 10.0);
        let b = solid_segment([0, 0, 255], 10, 10.0);
        let options = TransitionOptions {
            kind: TransitionKind::Slide,
            duration: 1.0,
            direction: SlideDirection::Left,
        };

        let timeline = join_segments(&[a, b], &options);
        assert_eq!(timeline.len(), 10);
        // progress 0: pure outgoing
        assert_eq!(timeline[0].get_pixel(10, 5), [255, 0, 0]);
        // progress 0.9: the right side already shows incoming content
        assert_eq!(timeline[9].get_pixel(19, 5), [0, 0, 255]);
        // after the overlap the incoming segment continues unmodified
        assert_eq!(timeline[9].get_pixel(0, 5), [255, 0, 0]);
    }

    #[test]
    fn slide_right_mirrors_the_entry_edge() {
        let a = solid_segment([255, 0, 0], 10, 10.0);
        let b = solid_segment([0, 0, 255], 10, 10.0);
        let options = TransitionOptions {
            kind: TransitionKind::Slide,
            duration: 1.0,
            direction: SlideDirection::Right,
        };

        let timeline = join_segments(&[a, b], &options);
        // late in the overlap the incoming content occupies the left side
        assert_eq!(timeline[9].get_pixel(0, 5), [0, 0, 255]);
        assert_eq!(timeline[9].get_pixel(19, 5), [255, 0, 0]);
    }

    #[test]
    fn zoom_transition_keeps_canvas_dimensions() {
        let a = solid_segment([50, 50, 50], 10, 10.0);
        let b = solid_segment([0, 200, 0], 10, 10.0);
        let options = TransitionOptions { kind: TransitionKind::Zoom, duration: 1.0, ..Default::default() };

        let timeline = join_segments(&[a, b], &options);
        assert_eq!(timeline.len(), 10);
        for frame in &timeline {
            assert_eq!((frame.width(), frame.height()), (20, 10));
        }
        // the incoming segment covers the overlap from the start
        assert_eq!(timeline[0].get_pixel(10, 5), [0, 200, 0]);
    }

    #[test]
    fn overlap_longer_than_a_segment_is_clamped() {
        let a = solid_segment([1, 2, 3], 5, 10.0);
        let b = solid_segment([4, 5, 6], 5, 10.0);
        let options = TransitionOptions { kind: TransitionKind::Fade, duration: 10.0, ..Default::default() };

        let timeline = join_segments(&[a, b], &options);
        // overlap clamps to 5 frames; total = 5 + 5 - 5
        assert_eq!(timeline.len(), 5);
    }

    #[test]
    fn three_segments_apply_transitions_pairwise() {
        let a = solid_segment([255, 0, 0], 10, 10.0);
        let b = solid_segment([0, 255, 0], 10, 10.0);
        let c = solid_segment([0, 0, 255], 10, 10.0);
        let options = TransitionOptions { kind: TransitionKind::Fade, duration: 0.5, ..Default::default() };

        let timeline = join_segments(&[a, b, c], &options);
        // each of the two transitions removes 5 frames
        assert_eq!(timeline.len(), 20);
    }
}
