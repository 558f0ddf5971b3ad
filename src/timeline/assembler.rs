use tracing::{debug, info, warn};

use crate::config::TransitionOptions;
use crate::error::{Result, TimelineError};
use crate::media::{AudioTrack, Frame, SegmentClip};
use crate::timeline::transition;

/// The fully composed output timeline handed to the renderer.
#[derive(Debug, Clone)]
pub struct AssembledTimeline {
    pub frames: Vec<Frame>,
    pub fps: f64,
    pub audio: Option<AudioTrack>,
}

impl AssembledTimeline {
    pub fn duration(&self) -> f64 {
        if self.fps <= 0.0 {
            return 0.0;
        }
        self.frames.len() as f64 / self.fps
    }
}

/// Which audio ends up under the assembled visuals.
///
/// `WholeSource` reattaches the original track verbatim, trimmed or
/// zero-padded to the assembled duration. `PerSegment` concatenates each
/// segment's own (possibly filtered) track; selected when the audio stage of
/// the effect chain ran, so filtered segment audio is never discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioPolicy {
    WholeSource,
    PerSegment,
}

/// Assemble processed segments into one timeline: transition composition,
/// audio reattachment, then optional background music.
///
/// Missing or empty music is a non-fatal skip. An empty segment list is an
/// assembly error (the segmenter already guarantees at least one span).
pub fn assemble(
    segments: Vec<SegmentClip>,
    transition_options: &TransitionOptions,
    policy: AudioPolicy,
    source_audio: Option<AudioTrack>,
    music: Option<(AudioTrack, f32)>,
) -> Result<AssembledTimeline> {
    let fps = segments
        .first()
        .map(|s| s.fps)
        .ok_or_else(|| TimelineError::AssemblyFailed { reason: "no segments to assemble".to_string() })?;

    let frames = transition::join_segments(&segments, transition_options);
    if frames.is_empty() {
        return Err(TimelineError::AssemblyFailed {
            reason: "composition produced an empty timeline".to_string(),
        }
        .into());
    }
    let duration = frames.len() as f64 / fps;
    debug!("Composed {} frames ({:.2}s at {:.1} fps)", frames.len(), duration, fps);

    let mut audio = match policy {
        AudioPolicy::WholeSource => source_audio,
        AudioPolicy::PerSegment => concat_segment_audio(&segments),
    };

    // fit the voice track to the composed duration without looping it
    if let Some(track) = &mut audio {
        let target = (duration * track.sample_rate as f64).round() as usize * track.channels as usize;
        track.resize_samples(target);
    }

    if let Some((mut track, volume)) = music {
        if track.is_empty() {
            warn!("Background music track is empty, skipping mix");
        } else {
            track.fit_to_duration(duration);
            track.scale_volume(volume);
            match &mut audio {
                Some(voice) => {
                    voice.mix_in(&track);
                    info!("Mixed background music at volume {:.2}", volume);
                }
                None => {
                    info!("No voice track; background music becomes the sole track");
                    audio = Some(track);
                }
            }
        }
    }

    Ok(AssembledTimeline { frames, fps, audio })
}

fn concat_segment_audio(segments: &[SegmentClip]) -> Option<AudioTrack> {
    let mut iter = segments.iter().filter_map(|s| s.audio.as_ref());
    let first = iter.next()?.clone();
    let mut combined = first;
    for track in iter {
        combined.samples.extend_from_slice(&track.samples);
    }
    Some(combined)
}
