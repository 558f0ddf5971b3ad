use crate::config::FreezeOptions;
use crate::media::SegmentClip;

/// Hold the segment's closing span on a single still.
///
/// The final `hold` seconds are replaced by the frame at
/// `duration - hold`; segments shorter than the hold span are left
/// untouched.
pub fn apply_hold(clip: &mut SegmentClip, hold: f64) {
    let duration = clip.duration();
    if hold <= 0.0 || duration <= hold || clip.frames.is_empty() {
        return;
    }

    let freeze_index =
        (((duration - hold) * clip.fps + 1e-9).floor() as usize).min(clip.frames.len() - 1);
    let still = clip.frames[freeze_index].clone();
    for frame in clip.frames.iter_mut().skip(freeze_index + 1) {
        *frame = still.clone();
    }
}

/// Cyclic hold: within the last `hold` seconds of every `interval`-second
/// window, frames stop advancing at that window's freeze point.
pub fn apply_timed(clip: &mut SegmentClip, options: &FreezeOptions) {
    let interval = options.interval;
    let hold = options.duration;
    if interval <= 0.0 || hold <= 0.0 || clip.frames.is_empty() {
        return;
    }

    let fps = clip.fps;
    let last = clip.frames.len() - 1;
    // epsilon guards frame-boundary freeze points against rounding
    const EPS: f64 = 1e-9;
    let remapped: Vec<usize> = (0..clip.frames.len())
        .map(|i| {
            let t = i as f64 / fps;
            let window = (t / interval).floor();
            let hold_start = (window + 1.0) * interval - hold;
            // a hold longer than the window pins the whole window to its start
            let hold_start = hold_start.max(window * interval);
            if t >= hold_start - EPS {
                (((hold_start * fps + EPS).floor() as usize).min(last)).min(i)
            } else {
                i
            }
        })
        .collect();

    let originals = clip.frames.clone();
    for (i, &src) in remapped.iter().enumerate() {
        if src != i {
            clip.frames[i] = originals[src].clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::Frame;

    fn counting_clip(frame_count: usize, fps: f64) -> SegmentClip {
        // encode the frame index in the red channel so remaps are visible
        let frames = (0..frame_count)
            .map(|i| Frame::new_filled(2, 2, [i as u8, 0, 0]))
            .collect();
        SegmentClip::new(0.0, frame_count as f64 / fps, fps, frames)
    }

    fn red(clip: &SegmentClip, index: usize) -> u8 {
        clip.frames[index].get_pixel(0, 0)[0]
    }

    #[test]
    fn hold_replaces_tail_with_still() {
        // 10 frames at 10 fps = 1s; hold the last 0.5s
        let mut clip = counting_clip(10, 10.0);
        apply_hold(&mut clip, 0.5);

        assert_eq!(red(&clip, 4), 4);
        for i in 5..10 {
            assert_eq!(red(&clip, i), 5, "frame {} should hold the freeze still", i);
        }
    }

    #[test]
    fn short_segments_are_untouched() {
        let mut clip = counting_clip(5, 10.0); // 0.5s
        let before: Vec<u8> = (0..5).map(|i| red(&clip, i)).collect();
        apply_hold(&mut clip, 1.0);
        let after: Vec<u8> = (0..5).map(|i| red(&clip, i)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn timed_hold_freezes_each_window_tail() {
        // 20 frames at 10 fps = 2s; 1s windows, hold the last 0.4s of each
        let mut clip = counting_clip(20, 10.0);
        let options = FreezeOptions { enabled: true, duration: 0.4, timed: true, interval: 1.0 };
        apply_timed(&mut clip, &options);

        // first window: frames 0..=5 advance, 6..=9 hold frame 6
        for i in 0..6 {
            assert_eq!(red(&clip, i), i as u8);
        }
        for i in 6..10 {
            assert_eq!(red(&clip, i), 6);
        }
        // second window: frames 10..=15 advance, 16..=19 hold frame 16
        for i in 10..16 {
            assert_eq!(red(&clip, i), i as u8);
        }
        for i in 16..20 {
            assert_eq!(red(&clip, i), 16);
        }
    }

    #[test]
    fn timed_hold_is_identity_outside_hold_spans() {
        let mut clip = counting_clip(10, 10.0);
        let options = FreezeOptions { enabled: true, duration: 0.0, timed: true, interval: 1.0 };
        apply_timed(&mut clip, &options);
        for i in 0..10 {
            assert_eq!(red(&clip, i), i as u8);
        }
    }
}
