//! Final encode of an assembled timeline through the external ffmpeg engine.

use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tokio::task;
use tracing::{debug, info, warn};

use crate::config::QualityProfile;
use crate::error::{RenderError, Result};
use crate::media::AudioTrack;
use crate::timeline::AssembledTimeline;

/// Audio codec of every artifact, independent of the quality profile.
const AUDIO_CODEC: &str = "aac";

/// Represents an encoded output artifact
#[derive(Debug, Clone)]
pub struct RenderedArtifact {
    pub path: PathBuf,
    pub duration: f64,
    pub frame_count: usize,
    pub file_size: u64,
}

/// Encodes an assembled timeline with a quality profile's codec, bitrate and
/// speed preset. Intermediate artifacts live in a private temp directory that
/// is discarded on completion and on drop.
pub struct Renderer {
    profile: QualityProfile,
    temp_dir: Option<PathBuf>,
}

impl Renderer {
    pub fn new(profile: QualityProfile) -> Self {
        Self { profile, temp_dir: None }
    }

    pub fn check_ffmpeg_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn ensure_temp_dir(&mut self) -> Result<PathBuf> {
        if let Some(ref temp_dir) = self.temp_dir {
            return Ok(temp_dir.clone());
        }

        let temp_dir = std::env::temp_dir().join(format!(
            "clipforge_render_{}_{}",
            std::process::id(),
            uuid::Uuid::new_v4().simple()
        ));
        create_dir_all(&temp_dir)?;
        self.temp_dir = Some(temp_dir.clone());
        Ok(temp_dir)
    }

    /// Encode the timeline to `output_path`.
    ///
    /// Deterministic given identical frames, audio and profile. Any encoder
    /// or disk failure is fatal to the job.
    pub async fn render<P: AsRef<Path>>(
        &mut self,
        timeline: &AssembledTimeline,
        output_path: P,
    ) -> Result<RenderedArtifact> {
        let output_path = output_path.as_ref();
        info!(
            "Rendering {} frames with profile {} ({} @ {}, preset {})",
            timeline.frames.len(),
            self.profile.name,
            self.profile.codec,
            self.profile.bitrate,
            self.profile.preset
        );

        if !Self::check_ffmpeg_available() {
            return Err(RenderError::EncoderUnavailable {
                reason: "ffmpeg not found on PATH".to_string(),
            }
            .into());
        }

        let temp_dir = self.ensure_temp_dir()?;

        let frame_paths = self.save_frames(timeline, &temp_dir)?;
        let list_path = create_frame_list(&frame_paths, timeline.fps, &temp_dir)?;

        let audio_path = match &timeline.audio {
            Some(track) if !track.is_empty() => {
                let wav_path = temp_dir.join("mix.wav");
                write_audio_wav(track, &wav_path)?;
                Some(wav_path)
            }
            _ => None,
        };

        self.encode(&list_path, audio_path.as_deref(), timeline.fps, output_path).await?;

        let file_size = std::fs::metadata(output_path)
            .map_err(|e| RenderError::OutputFailed {
                path: output_path.display().to_string(),
                reason: e.to_string(),
            })?
            .len();

        let artifact = RenderedArtifact {
            path: output_path.to_path_buf(),
            duration: timeline.duration(),
            frame_count: timeline.frames.len(),
            file_size,
        };

        self.cleanup()?;
        info!("Render complete: {} ({} bytes)", output_path.display(), file_size);
        Ok(artifact)
    }

    fn save_frames(&self, timeline: &AssembledTimeline, temp_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut frame_paths = Vec::with_capacity(timeline.frames.len());
        debug!("Saving {} frames to {:?}", timeline.frames.len(), temp_dir);

        for (index, frame) in timeline.frames.iter().enumerate() {
            let frame_path = temp_dir.join(format!("frame_{:06}.png", index));
            frame.save_png(&frame_path).map_err(|e| RenderError::EncodingFailed {
                reason: format!("failed to save frame {}: {}", index, e),
            })?;
            frame_paths.push(frame_path);
        }

        Ok(frame_paths)
    }

    async fn encode(
        &self,
        list_path: &Path,
        audio_path: Option<&Path>,
        fps: f64,
        output_path: &Path,
    ) -> Result<()> {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-f", "concat", "-safe", "0", "-i"]);
        cmd.arg(list_path);
        if let Some(audio) = audio_path {
            cmd.arg("-i");
            cmd.arg(audio);
        }
        cmd.args([
            "-c:v",
            self.profile.codec,
            "-b:v",
            self.profile.bitrate,
            "-preset",
            self.profile.preset,
            "-pix_fmt",
            "yuv420p",
            "-r",
            &format!("{}", fps),
        ]);
        if audio_path.is_some() {
            cmd.args(["-c:a", AUDIO_CODEC, "-shortest"]);
        }
        cmd.arg("-y");
        cmd.arg(output_path);

        let output = task::spawn_blocking(move || cmd.output())
            .await
            .map_err(|e| RenderError::EncodingFailed {
                reason: format!("failed to spawn ffmpeg process: {}", e),
            })?
            .map_err(|e| RenderError::EncodingFailed {
                reason: format!("ffmpeg execution failed: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::EncodingFailed {
                reason: format!("ffmpeg failed: {}", stderr.trim()),
            }
            .into());
        }

        Ok(())
    }

    pub fn cleanup(&mut self) -> Result<()> {
        if let Some(temp_dir) = &self.temp_dir {
            if let Err(e) = std::fs::remove_dir_all(temp_dir) {
                warn!("Failed to remove render temp directory: {}", e);
            }
            self.temp_dir = None;
        }
        Ok(())
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Write the concat demuxer list: one line per frame with its display
/// duration, the last frame repeated so its duration is honored.
fn create_frame_list(frame_paths: &[PathBuf], fps: f64, temp_dir: &Path) -> Result<PathBuf> {
    let list_path = temp_dir.join("frame_list.txt");
    let mut file = File::create(&list_path)?;

    let frame_duration = 1.0 / fps;
    for frame_path in frame_paths {
        writeln!(file, "file '{}'", frame_path.display())?;
        writeln!(file, "duration {:.6}", frame_duration)?;
    }
    if let Some(last_frame) = frame_paths.last() {
        writeln!(file, "file '{}'", last_frame.display())?;
    }

    Ok(list_path)
}

/// Write the mixed track as 32-bit float WAV for muxing.
fn write_audio_wav(track: &AudioTrack, path: &Path) -> Result<()> {
    let spec = hound::WavSpec {
        channels: track.channels,
        sample_rate: track.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).map_err(|e| RenderError::EncodingFailed {
        reason: format!("failed to create mux track: {}", e),
    })?;
    for &sample in &track.samples {
        writer.write_sample(sample).map_err(|e| RenderError::EncodingFailed {
            reason: format!("failed to write mux track: {}", e),
        })?;
    }
    writer.finalize().map_err(|e| RenderError::EncodingFailed {
        reason: format!("failed to finalize mux track: {}", e),
    })?;
    Ok(())
}
