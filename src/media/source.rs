use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tokio::task;
use tracing::{debug, info, warn};

use crate::error::{MediaError, Result};
use crate::media::types::{AudioTrack, Frame, SegmentClip};

/// Probed source metadata
#[derive(Debug, Clone)]
pub struct MediaProbe {
    pub duration: f64,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub has_audio: bool,
}

/// Decode handle bound to one source file.
///
/// Owns a private working directory for extraction artifacts; the directory
/// is removed when the handle is dropped, so every exit path of a job
/// releases the decode state.
pub struct MediaSource {
    path: PathBuf,
    probe: MediaProbe,
    work_dir: PathBuf,
}

impl MediaSource {
    /// Open and probe a source file.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.is_file() {
            return Err(MediaError::InputNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let probe = Self::probe_file(&path).await?;
        info!(
            "Opened source: {:.1}s, {:.2} fps, {}x{}, audio: {}",
            probe.duration, probe.fps, probe.width, probe.height, probe.has_audio
        );

        let work_dir = std::env::temp_dir().join(format!(
            "clipforge_{}_{}",
            std::process::id(),
            uuid::Uuid::new_v4().simple()
        ));
        std::fs::create_dir_all(&work_dir)?;

        Ok(Self { path, probe, work_dir })
    }

    pub fn probe(&self) -> &MediaProbe {
        &self.probe
    }

    pub fn path(&self) -> &Path {
        &self.path
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

    async fn probe_file(path: &Path) -> Result<MediaProbe> {
        let duration_out = Self::run_ffprobe(
            path,
            &["-show_entries", "format=duration", "-of", "default=nw=1:nk=1"],
        )
        .await?;
        let duration: f64 = duration_out
            .trim()
            .parse()
            .map_err(|_| MediaError::ProbeFailed {
                path: path.display().to_string(),
                reason: format!("unparseable duration '{}'", duration_out.trim()),
            })?;

        let stream_out = Self::run_ffprobe(
            path,
            &[
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height,r_frame_rate",
                "-of",
                "csv=p=0",
            ],
        )
        .await?;
        let fields: Vec<&str> = stream_out.trim().split(',').collect();
        if fields.len() < 3 {
            return Err(MediaError::ProbeFailed {
                path: path.display().to_string(),
                reason: "no video stream".to_string(),
            }
            .into());
        }
        let width: u32 = fields[0].parse().unwrap_or(0);
        let height: u32 = fields[1].parse().unwrap_or(0);
        let fps = parse_frame_rate(fields[2]).unwrap_or(30.0);
        if width == 0 || height == 0 {
            return Err(MediaError::ProbeFailed {
                path: path.display().to_string(),
                reason: format!("bad dimensions {}x{}", fields[0], fields[1]),
            }
            .into());
        }

        let audio_out = Self::run_ffprobe(
            path,
            &["-select_streams", "a:0", "-show_entries", "stream=index", "-of", "csv=p=0"],
        )
        .await?;
        let has_audio = !audio_out.trim().is_empty();

        Ok(MediaProbe { duration, fps, width, height, has_audio })
    }

    async fn run_ffprobe(path: &Path, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("ffprobe");
        cmd.arg("-v").arg("error");
        cmd.args(args);
        cmd.arg(path);

        let path_str = path.display().to_string();
        let output = task::spawn_blocking(move || cmd.output())
            .await
            .map_err(|e| MediaError::ProbeFailed {
                path: path_str.clone(),
                reason: format!("failed to spawn ffprobe: {}", e),
            })?
            .map_err(|e| MediaError::ProbeFailed {
                path: path_str.clone(),
                reason: format!("ffprobe execution failed: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::ProbeFailed {
                path: path_str,
                reason: format!("ffprobe failed: {}", stderr.trim()),
            }
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Decode the frames of one segment at the given rate.
    pub async fn decode_segment(
        &self,
        index: usize,
        start: f64,
        end: f64,
        fps: f64,
    ) -> Result<SegmentClip> {
        let seg_dir = self.work_dir.join(format!("seg_{:04}", index));
        std::fs::create_dir_all(&seg_dir)?;

        let duration = end - start;
        let pattern = seg_dir.join("frame_%06d.png");

        let mut cmd = Command::new("ffmpeg");
        cmd.args([
            "-ss",
            &format!("{:.6}", start),
            "-t",
            &format!("{:.6}", duration),
            "-i",
        ]);
        cmd.arg(&self.path);
        cmd.args(["-vf", &format!("fps={}", fps), "-f", "image2", "-y"]);
        cmd.arg(&pattern);

        self.run_ffmpeg(cmd, "frame extraction").await?;

        let mut frame_paths: Vec<PathBuf> = std::fs::read_dir(&seg_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("png"))
            .collect();
        frame_paths.sort();

        if frame_paths.is_empty() {
            return Err(MediaError::DecodeFailed {
                path: self.path.display().to_string(),
                reason: format!("no frames decoded for segment {:.2}s-{:.2}s", start, end),
            }
            .into());
        }

        let mut frames = Vec::with_capacity(frame_paths.len());
        for frame_path in &frame_paths {
            let img = image::open(frame_path).map_err(|e| MediaError::DecodeFailed {
                path: frame_path.display().to_string(),
                reason: e.to_string(),
            })?;
            frames.push(Frame::new(img.to_rgb8()));
        }

        // Extraction artifacts are not needed once loaded
        let _ = std::fs::remove_dir_all(&seg_dir);

        debug!("Decoded segment {}: {} frames ({:.2}s-{:.2}s)", index, frames.len(), start, end);
        Ok(SegmentClip::new(start, end, fps, frames))
    }

    /// Decode one segment's slice of the source audio track.
    pub async fn decode_segment_audio(&self, index: usize, start: f64, end: f64) -> Result<Option<AudioTrack>> {
        if !self.probe.has_audio {
            return Ok(None);
        }
        let wav_path = self.work_dir.join(format!("seg_audio_{:04}.wav", index));
        self.extract_wav(Some((start, end)), &wav_path).await?;
        let track = read_wav(&wav_path)?;
        let _ = std::fs::remove_file(&wav_path);
        Ok(Some(track))
    }

    /// Decode the whole source audio track.
    pub async fn decode_full_audio(&self) -> Result<Option<AudioTrack>> {
        if !self.probe.has_audio {
            return Ok(None);
        }
        let wav_path = self.work_dir.join("source_audio.wav");
        self.extract_wav(None, &wav_path).await?;
        let track = read_wav(&wav_path)?;
        let _ = std::fs::remove_file(&wav_path);
        Ok(Some(track))
    }

    /// Decode an external audio asset (e.g. background music) through the
    /// same engine, so compressed formats are accepted.
    pub async fn decode_audio_asset<P: AsRef<Path>>(&self, asset: P) -> Result<AudioTrack> {
        let asset = asset.as_ref();
        if !asset.is_file() {
            return Err(MediaError::InputNotFound {
                path: asset.display().to_string(),
            }
            .into());
        }
        let wav_path = self.work_dir.join(format!("asset_{}.wav", uuid::Uuid::new_v4().simple()));

        let mut cmd = Command::new("ffmpeg");
        cmd.arg("-i");
        cmd.arg(asset);
        cmd.args(["-vn", "-acodec", "pcm_f32le", "-ar", "44100", "-ac", "2", "-y"]);
        cmd.arg(&wav_path);
        self.run_ffmpeg(cmd, "audio asset decode").await?;

        let track = read_wav(&wav_path)?;
        let _ = std::fs::remove_file(&wav_path);
        Ok(track)
    }

    async fn extract_wav(&self, span: Option<(f64, f64)>, wav_path: &Path) -> Result<()> {
        let mut cmd = Command::new("ffmpeg");
        if let Some((start, end)) = span {
            cmd.args(["-ss", &format!("{:.6}", start), "-t", &format!("{:.6}", end - start)]);
        }
        cmd.arg("-i");
        cmd.arg(&self.path);
        cmd.args(["-vn", "-acodec", "pcm_f32le", "-ar", "44100", "-ac", "2", "-y"]);
        cmd.arg(wav_path);
        self.run_ffmpeg(cmd, "audio extraction").await
    }

    async fn run_ffmpeg(&self, mut cmd: Command, what: &str) -> Result<()> {
        cmd.stdout(Stdio::null());
        let what_owned = what.to_string();
        let path_str = self.path.display().to_string();

        let output = task::spawn_blocking(move || cmd.output())
            .await
            .map_err(|e| MediaError::DecodeFailed {
                path: path_str.clone(),
                reason: format!("failed to spawn ffmpeg for {}: {}", what_owned, e),
            })?
            .map_err(|e| MediaError::DecodeFailed {
                path: path_str.clone(),
                reason: format!("ffmpeg execution failed during {}: {}", what_owned, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::DecodeFailed {
                path: path_str,
                reason: format!("ffmpeg failed during {}: {}", what, stderr.trim()),
            }
            .into());
        }
        Ok(())
    }
}

impl Drop for MediaSource {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.work_dir) {
            if self.work_dir.exists() {
                warn!("Failed to remove media working directory: {}", e);
            }
        }
    }
}

/// Parse ffprobe's rational frame rate ("30000/1001" or "25")
fn parse_frame_rate(value: &str) -> Option<f64> {
    if let Some((num, den)) = value.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        if den == 0.0 {
            return None;
        }
        Some(num / den)
    } else {
        value.trim().parse().ok()
    }
}

/// Read a WAV file into an [`AudioTrack`], converting integer samples.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<AudioTrack> {
    let path = path.as_ref();
    let mut reader = hound::WavReader::open(path).map_err(|e| MediaError::AudioExtractionFailed {
        reason: format!("{}: {}", path.display(), e),
    })?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| MediaError::AudioExtractionFailed { reason: e.to_string() })?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| MediaError::AudioExtractionFailed { reason: e.to_string() })?
        }
    };

    Ok(AudioTrack::new(spec.sample_rate, spec.channels, samples))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rate_parsing_handles_rationals() {
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        let ntsc = parse_frame_rate("30000/1001").unwrap();
        assert!((ntsc - 29.97).abs() < 0.01);
        assert_eq!(parse_frame_rate("30/0"), None);
        assert_eq!(parse_frame_rate("garbage"), None);
    }

    #[tokio::test]
    async fn open_missing_file_is_input_not_found() {
        let result = MediaSource::open("/definitely/not/here.mp4").await;
        match result {
            Err(crate::error::EditorError::Media(MediaError::InputNotFound { path })) => {
                assert!(path.contains("not/here.mp4"));
            }
            other => panic!("expected InputNotFound, got {:?}", other.err()),
        }
    }

    #[test]
    fn wav_roundtrip_preserves_int_samples() {
        let dir = tempfile::tempdir().unwrap();
        let wav_path = dir.path().join("tone.wav");

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&wav_path, spec).unwrap();
        writer.write_sample(i16::MAX).unwrap();
        writer.write_sample(0i16).unwrap();
        writer.write_sample(i16::MIN).unwrap();
        writer.finalize().unwrap();

        let track = read_wav(&wav_path).unwrap();
        assert_eq!(track.sample_rate, 8000);
        assert_eq!(track.channels, 1);
        assert_eq!(track.samples.len(), 3);
        assert!(track.samples[0] > 0.99);
        assert_eq!(track.samples[1], 0.0);
        assert_eq!(track.samples[2], -1.0);
    }
}
