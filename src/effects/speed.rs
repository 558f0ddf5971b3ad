use crate::config::{SpeedDirection, SpeedOptions};
use crate::media::{AudioTrack, Frame};

/// Effective time-scale multiplier: `fast` plays `factor` times faster,
/// `slow` inverts the factor.
pub fn multiplier(options: &SpeedOptions) -> f64 {
    match options.direction {
        SpeedDirection::Fast => options.factor,
        SpeedDirection::Slow => 1.0 / options.factor,
    }
}

/// Retime a frame sequence by the multiplier, preserving order.
///
/// A multiplier above 1.0 drops frames (faster playback), below 1.0
/// duplicates them (slower playback).
pub fn retime_frames(frames: &[Frame], multiplier: f64) -> Vec<Frame> {
    if frames.is_empty() || multiplier <= 0.0 || (multiplier - 1.0).abs() < f64::EPSILON {
        return frames.to_vec();
    }

    let out_len = ((frames.len() as f64 / multiplier).round() as usize).max(1);
    (0..out_len)
        .map(|i| {
            let src = ((i as f64 * multiplier) as usize).min(frames.len() - 1);
            frames[src].clone()
        })
        .collect()
}

/// Retime audio by linear resampling, channel layout preserved.
pub fn retime_audio(track: &AudioTrack, multiplier: f64) -> AudioTrack {
    let channels = track.channels as usize;
    if track.samples.is_empty() || channels == 0 || multiplier <= 0.0 {
        return track.clone();
    }

    let in_frames = track.samples.len() / channels;
    let out_frames = ((in_frames as f64 / multiplier).round() as usize).max(1);
    let mut samples = Vec::with_capacity(out_frames * channels);

    for i in 0..out_frames {
        let pos = i as f64 * multiplier;
        let i0 = (pos as usize).min(in_frames - 1);
        let i1 = (i0 + 1).min(in_frames - 1);
        let frac = (pos - i0 as f64) as f32;
        for c in 0..channels {
            let a = track.samples[i0 * channels + c];
            let b = track.samples[i1 * channels + c];
            samples.push(a + (b - a) * frac);
        }
    }

    AudioTrack::new(track.sample_rate, track.channels, samples)
}
