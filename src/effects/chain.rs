use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::{
    BlurOptions, EditOptions, FreezeOptions, GlitchOptions, MirrorOptions, NoiseReductionOptions,
    OldFilmOptions, RotateOptions, SpeedOptions, TextOptions, ZoomOptions,
};
use crate::effects::{audio, filters, freeze, geometry, speed, text, zoom};
use crate::error::Result;
use crate::media::SegmentClip;

/// One resolved stage of the chain, bound to its parameters.
#[derive(Debug, Clone)]
pub enum EffectStage {
    Zoom(ZoomOptions),
    Freeze(FreezeOptions),
    Mirror(MirrorOptions),
    Rotate(RotateOptions),
    Blur(BlurOptions),
    Glitch(GlitchOptions),
    OldFilm(OldFilmOptions),
    Speed(SpeedOptions),
    Text(TextOptions),
    NoiseReduction(NoiseReductionOptions),
}

impl EffectStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Zoom(_) => "zoom",
            Self::Freeze(_) => "freeze",
            Self::Mirror(_) => "mirror",
            Self::Rotate(_) => "rotate",
            Self::Blur(_) => "blur",
            Self::Glitch(_) => "glitch",
            Self::OldFilm(_) => "old_film",
            Self::Speed(_) => "speed",
            Self::Text(_) => "text",
            Self::NoiseReduction(_) => "noise_reduction",
        }
    }
}

/// The ordered sequence of enabled transforms applied to one segment.
///
/// Application order is fixed by design; effects are not commutative on pixel
/// data, so enable flags select stages but never reorder them. Frame stages
/// run first, the audio stage last.
#[derive(Debug, Clone, Default)]
pub struct EffectChain {
    stages: Vec<EffectStage>,
}

impl EffectChain {
    /// Resolve the chain for one job's options.
    pub fn build(options: &EditOptions) -> Self {
        let mut stages = Vec::new();
        if options.zoom.enabled {
            stages.push(EffectStage::Zoom(options.zoom.clone()));
        }
        if options.freeze.enabled {
            stages.push(EffectStage::Freeze(options.freeze.clone()));
        }
        if options.mirror.enabled {
            stages.push(EffectStage::Mirror(options.mirror.clone()));
        }
        if options.rotate.enabled {
            stages.push(EffectStage::Rotate(options.rotate.clone()));
        }
        if options.blur.enabled {
            stages.push(EffectStage::Blur(options.blur.clone()));
        }
        if options.glitch.enabled {
            stages.push(EffectStage::Glitch(options.glitch.clone()));
        }
        if options.old_film.enabled {
            stages.push(EffectStage::OldFilm(options.old_film.clone()));
        }
        if options.speed.enabled {
            stages.push(EffectStage::Speed(options.speed.clone()));
        }
        if options.text.enabled && !options.text.content.trim().is_empty() {
            stages.push(EffectStage::Text(options.text.clone()));
        }
        if options.noise_reduction.enabled {
            stages.push(EffectStage::NoiseReduction(options.noise_reduction.clone()));
        }
        Self { stages }
    }

    pub fn stages(&self) -> &[EffectStage] {
        &self.stages
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// True if the chain carries the audio stage, which switches the
    /// assembler to the per-segment audio policy.
    pub fn processes_audio(&self) -> bool {
        self.stages.iter().any(|s| matches!(s, EffectStage::NoiseReduction(_)))
    }

    /// Run every stage over one segment, in order.
    pub fn apply(&self, clip: &mut SegmentClip) -> Result<()> {
        for stage in &self.stages {
            debug!("Applying {} to segment {:.2}s-{:.2}s", stage.name(), clip.start, clip.end);
            match stage {
                EffectStage::Zoom(options) => apply_zoom(clip, options),
                EffectStage::Freeze(options) => {
                    if options.timed {
                        freeze::apply_timed(clip, options);
                    } else {
                        freeze::apply_hold(clip, options.duration);
                    }
                }
                EffectStage::Mirror(options) => {
                    clip.frames
                        .par_iter_mut()
                        .for_each(|frame| *frame = geometry::mirror_frame(frame, options.axis));
                }
                EffectStage::Rotate(options) => {
                    clip.frames
                        .par_iter_mut()
                        .for_each(|frame| *frame = geometry::rotate_frame(frame, options.angle));
                }
                EffectStage::Blur(options) => {
                    clip.frames
                        .par_iter_mut()
                        .for_each(|frame| *frame = filters::blur_frame(frame, options.radius));
                }
                EffectStage::Glitch(options) => {
                    clip.frames
                        .par_iter_mut()
                        .for_each(|frame| *frame = filters::glitch_frame(frame, options.intensity));
                }
                EffectStage::OldFilm(options) => {
                    clip.frames.par_iter_mut().for_each(|frame| {
                        let mut rng = SmallRng::from_entropy();
                        *frame = filters::old_film_frame(frame, options.scratch_intensity, &mut rng);
                    });
                }
                EffectStage::Speed(options) => {
                    let multiplier = speed::multiplier(options);
                    clip.frames = speed::retime_frames(&clip.frames, multiplier);
                    if let Some(track) = &clip.audio {
                        clip.audio = Some(speed::retime_audio(track, multiplier));
                    }
                }
                EffectStage::Text(options) => {
                    // degrades to a pass-through when nothing rasterizes
                    let (width, height) = match clip.frames.first() {
                        Some(frame) => (frame.width(), frame.height()),
                        None => continue,
                    };
                    match text::CaptionLayer::build(width, height, options) {
                        Some(layer) => {
                            clip.frames.par_iter_mut().for_each(|frame| layer.composite(frame));
                        }
                        None => warn!("Text overlay produced no caption, skipping stage"),
                    }
                }
                EffectStage::NoiseReduction(options) => {
                    // audio-only stage; a segment without audio passes through
                    if let Some(track) = &clip.audio {
                        clip.audio = Some(audio::reduce_noise(track, options.strength));
                    }
                }
            }
        }
        Ok(())
    }
}

fn apply_zoom(clip: &mut SegmentClip, options: &ZoomOptions) {
    if options.timed {
        let fps = clip.fps;
        clip.frames.par_iter_mut().enumerate().for_each(|(i, frame)| {
            let factor = zoom::timed_factor(options, i as f64 / fps);
            *frame = zoom::zoom_frame(frame, factor, options.direction);
        });
    } else {
        clip.frames
            .par_iter_mut()
            .for_each(|frame| *frame = zoom::zoom_frame(frame, options.factor, options.direction));
    }
}
