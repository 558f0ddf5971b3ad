use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Full option set for one edit job.
///
/// Every field has a documented default so a job submitted with an empty
/// option map is still valid. The flat string-keyed wire form is ingested by
/// [`EditOptions::from_map`]; unknown keys are ignored and missing keys
/// resolve to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditOptions {
    pub segmentation: SegmentationOptions,
    pub zoom: ZoomOptions,
    pub freeze: FreezeOptions,
    pub mirror: MirrorOptions,
    pub rotate: RotateOptions,
    pub blur: BlurOptions,
    pub glitch: GlitchOptions,
    pub old_film: OldFilmOptions,
    pub speed: SpeedOptions,
    pub text: TextOptions,
    pub noise_reduction: NoiseReductionOptions,
    pub transition: TransitionOptions,
    pub music: MusicOptions,
    pub quality: QualityOptions,
}

/// Timeline slicing parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationOptions {
    /// Window length in seconds
    pub split_interval: f64,
    /// Seconds cut from the end of every full window
    pub trim_amount: f64,
}

impl Default for SegmentationOptions {
    fn default() -> Self {
        Self { split_interval: 6.0, trim_amount: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    fn parse(s: &str) -> Self {
        match s {
            "out" => Self::Out,
            _ => Self::In,
        }
    }
}

/// Continuous or cyclic zoom
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomOptions {
    pub enabled: bool,
    /// Magnification at full zoom
    pub factor: f64,
    pub direction: ZoomDirection,
    /// Timed sub-mode: pulse once per `interval` instead of holding the zoom
    pub timed: bool,
    /// Cycle length of the timed pulse in seconds
    pub interval: f64,
    /// Seconds of each cycle spent ramping the factor
    pub ramp_duration: f64,
}

impl Default for ZoomOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            factor: 1.5,
            direction: ZoomDirection::In,
            timed: false,
            interval: 5.0,
            ramp_duration: 2.0,
        }
    }
}

/// Hold-last-frame or cyclic freeze
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FreezeOptions {
    pub enabled: bool,
    /// Seconds held still (at the segment end, or per window in timed mode)
    pub duration: f64,
    pub timed: bool,
    /// Window length of the timed sub-mode in seconds
    pub interval: f64,
}

impl Default for FreezeOptions {
    fn default() -> Self {
        Self { enabled: false, duration: 1.0, timed: false, interval: 5.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorAxis {
    Horizontal,
    Vertical,
}

impl MirrorAxis {
    fn parse(s: &str) -> Self {
        match s {
            "vertical" => Self::Vertical,
            _ => Self::Horizontal,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorOptions {
    pub enabled: bool,
    pub axis: MirrorAxis,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self { enabled: false, axis: MirrorAxis::Horizontal }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RotateOptions {
    pub enabled: bool,
    /// Counter-clockwise rotation in degrees; the canvas expands to fit
    pub angle: f64,
}

impl Default for RotateOptions {
    fn default() -> Self {
        Self { enabled: false, angle: 90.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurOptions {
    pub enabled: bool,
    /// Gaussian blur radius in pixels
    pub radius: f32,
}

impl Default for BlurOptions {
    fn default() -> Self {
        Self { enabled: false, radius: 5.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlitchOptions {
    pub enabled: bool,
    /// Channel shift as a fraction of the frame width
    pub intensity: f64,
}

impl Default for GlitchOptions {
    fn default() -> Self {
        Self { enabled: false, intensity: 0.1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OldFilmOptions {
    pub enabled: bool,
    /// Per-frame probability of a scratch band
    pub scratch_intensity: f64,
}

impl Default for OldFilmOptions {
    fn default() -> Self {
        Self { enabled: false, scratch_intensity: 0.1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedDirection {
    Fast,
    Slow,
}

impl SpeedDirection {
    fn parse(s: &str) -> Self {
        match s {
            "slow" => Self::Slow,
            _ => Self::Fast,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedOptions {
    pub enabled: bool,
    /// Time-scale factor; `slow` inverts it
    pub factor: f64,
    pub direction: SpeedDirection,
}

impl Default for SpeedOptions {
    fn default() -> Self {
        Self { enabled: false, factor: 1.5, direction: SpeedDirection::Fast }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextPosition {
    Center,
    Top,
    Bottom,
    Watermark,
}

impl TextPosition {
    fn parse(s: &str) -> Self {
        match s {
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            "watermark" => Self::Watermark,
            _ => Self::Center,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    pub enabled: bool,
    pub content: String,
    /// Path to a TTF/OTF font; the built-in glyph set is used when absent
    pub font_path: Option<PathBuf>,
    pub size: f32,
    /// Named color or `#rrggbb`; unknown names fall back to white
    pub color: String,
    pub position: TextPosition,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            content: String::new(),
            font_path: None,
            size: 40.0,
            color: "white".to_string(),
            position: TextPosition::Center,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseReductionOptions {
    pub enabled: bool,
    /// Dry/wet mix of the low-pass filtered track (0 = untouched, 1 = fully filtered)
    pub strength: f32,
}

impl Default for NoiseReductionOptions {
    fn default() -> Self {
        Self { enabled: false, strength: 0.5 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    None,
    Fade,
    Slide,
    Zoom,
}

impl TransitionKind {
    fn parse(s: &str) -> Self {
        match s {
            "fade" => Self::Fade,
            "slide" => Self::Slide,
            "zoom" => Self::Zoom,
            _ => Self::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideDirection {
    Left,
    Right,
}

impl SlideDirection {
    fn parse(s: &str) -> Self {
        match s {
            "right" => Self::Right,
            _ => Self::Left,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionOptions {
    pub kind: TransitionKind,
    /// Overlap length in seconds
    pub duration: f64,
    pub direction: SlideDirection,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self { kind: TransitionKind::None, duration: 1.0, direction: SlideDirection::Left }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicOptions {
    pub enabled: bool,
    /// Path to the background music asset; missing assets skip mixing
    pub path: Option<PathBuf>,
    pub volume: f32,
}

impl Default for MusicOptions {
    fn default() -> Self {
        Self { enabled: false, path: None, volume: 0.5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityOptions {
    /// Named preset; unknown names fall back to 1080p
    pub preset: String,
}

impl Default for QualityOptions {
    fn default() -> Self {
        Self { preset: "1080p".to_string() }
    }
}

/// Encoder triple resolved from a quality preset name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityProfile {
    pub name: &'static str,
    pub codec: &'static str,
    pub bitrate: &'static str,
    pub preset: &'static str,
}

impl QualityProfile {
    /// Resolve a preset name, falling back to the 1080p default
    pub fn resolve(name: &str) -> Self {
        match name {
            "720p" => Self { name: "720p", codec: "libx264", bitrate: "2000k", preset: "medium" },
            "4k" => Self { name: "4k", codec: "libx264", bitrate: "20000k", preset: "slow" },
            _ => Self { name: "1080p", codec: "libx264", bitrate: "5000k", preset: "medium" },
        }
    }
}

impl EditOptions {
    /// Load options from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let options: EditOptions = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(options)
    }

    /// Build options from the flat string-keyed wire map.
    ///
    /// Toggle values are "on"/"true"/"1"; anything else (and any missing key)
    /// is off. Numeric values that fail to parse fall back to the default.
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        let flag = |key: &str| {
            matches!(map.get(key).map(String::as_str), Some("on") | Some("true") | Some("1"))
        };
        let f64_or = |key: &str, default: f64| {
            map.get(key).and_then(|v| v.parse::<f64>().ok()).unwrap_or(default)
        };
        let f32_or = |key: &str, default: f32| {
            map.get(key).and_then(|v| v.parse::<f32>().ok()).unwrap_or(default)
        };
        let str_or = |key: &str, default: &str| {
            map.get(key).cloned().unwrap_or_else(|| default.to_string())
        };
        let path_of = |key: &str| {
            map.get(key).filter(|v| !v.is_empty()).map(PathBuf::from)
        };

        Self {
            segmentation: SegmentationOptions {
                split_interval: f64_or("split_time", 6.0),
                trim_amount: f64_or("remove_time", 1.0),
            },
            zoom: ZoomOptions {
                enabled: flag("zoom_enabled"),
                factor: f64_or("zoom_factor", 1.5),
                direction: ZoomDirection::parse(&str_or("zoom_type", "in")),
                timed: flag("zoom_timed"),
                interval: f64_or("zoom_interval", 5.0),
                ramp_duration: f64_or("zoom_duration", 2.0),
            },
            freeze: FreezeOptions {
                enabled: flag("freeze_enabled"),
                duration: f64_or("freeze_duration", 1.0),
                timed: flag("freeze_timed"),
                interval: f64_or("freeze_interval", 5.0),
            },
            mirror: MirrorOptions {
                enabled: flag("mirror_enabled"),
                axis: MirrorAxis::parse(&str_or("mirror_type", "horizontal")),
            },
            rotate: RotateOptions {
                enabled: flag("rotate_enabled"),
                angle: f64_or("rotate_angle", 90.0),
            },
            blur: BlurOptions {
                enabled: flag("blur_enabled"),
                radius: f32_or("blur_radius", 5.0),
            },
            glitch: GlitchOptions {
                enabled: flag("glitch_enabled"),
                intensity: f64_or("glitch_intensity", 0.1),
            },
            old_film: OldFilmOptions {
                enabled: flag("oldfilm_enabled"),
                scratch_intensity: f64_or("scratch_intensity", 0.1),
            },
            speed: SpeedOptions {
                enabled: flag("speed_enabled"),
                factor: f64_or("speed_factor", 1.5),
                direction: SpeedDirection::parse(&str_or("speed_type", "fast")),
            },
            text: TextOptions {
                enabled: flag("text_enabled"),
                content: str_or("text_content", ""),
                font_path: path_of("text_font"),
                size: f32_or("text_size", 40.0),
                color: str_or("text_color", "white"),
                position: TextPosition::parse(&str_or("text_position", "center")),
            },
            noise_reduction: NoiseReductionOptions {
                enabled: flag("noise_reduction"),
                strength: f32_or("noise_strength", 0.5),
            },
            transition: TransitionOptions {
                kind: TransitionKind::parse(&str_or("transition_type", "none")),
                duration: f64_or("transition_duration", 1.0),
                direction: SlideDirection::parse(&str_or("slide_direction", "left")),
            },
            music: MusicOptions {
                enabled: flag("music_enabled"),
                path: path_of("music_path"),
                volume: f32_or("music_volume", 0.5),
            },
            quality: QualityOptions {
                preset: str_or("output_quality", "1080p"),
            },
        }
    }

    /// Validate ranges; invalid values are rejected at submission time
    pub fn validate(&self) -> Result<()> {
        fn invalid(key: &str, value: impl ToString) -> ConfigError {
            ConfigError::InvalidValue { key: key.to_string(), value: value.to_string() }
        }

        if self.segmentation.split_interval <= 0.0 {
            return Err(invalid("segmentation.split_interval", self.segmentation.split_interval).into());
        }
        if self.segmentation.trim_amount < 0.0 {
            return Err(invalid("segmentation.trim_amount", self.segmentation.trim_amount).into());
        }
        if self.zoom.factor <= 0.0 {
            return Err(invalid("zoom.factor", self.zoom.factor).into());
        }
        if self.zoom.timed && (self.zoom.interval <= 0.0 || self.zoom.ramp_duration < 0.0) {
            return Err(invalid("zoom.interval", self.zoom.interval).into());
        }
        if self.freeze.duration < 0.0 {
            return Err(invalid("freeze.duration", self.freeze.duration).into());
        }
        if self.freeze.timed && self.freeze.interval <= 0.0 {
            return Err(invalid("freeze.interval", self.freeze.interval).into());
        }
        if self.blur.radius < 0.0 {
            return Err(invalid("blur.radius", self.blur.radius).into());
        }
        if !(0.0..=1.0).contains(&self.glitch.intensity) {
            return Err(invalid("glitch.intensity", self.glitch.intensity).into());
        }
        if !(0.0..=1.0).contains(&self.old_film.scratch_intensity) {
            return Err(invalid("old_film.scratch_intensity", self.old_film.scratch_intensity).into());
        }
        if self.speed.factor <= 0.0 {
            return Err(invalid("speed.factor", self.speed.factor).into());
        }
        if self.text.size <= 0.0 {
            return Err(invalid("text.size", self.text.size).into());
        }
        if !(0.0..=1.0).contains(&self.noise_reduction.strength) {
            return Err(invalid("noise_reduction.strength", self.noise_reduction.strength).into());
        }
        if self.transition.duration < 0.0 {
            return Err(invalid("transition.duration", self.transition.duration).into());
        }
        if self.music.volume < 0.0 {
            return Err(invalid("music.volume", self.music.volume).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_valid_and_all_off() {
        let options = EditOptions::default();
        assert!(options.validate().is_ok());
        assert!(!options.zoom.enabled);
        assert!(!options.freeze.enabled);
        assert!(!options.mirror.enabled);
        assert!(!options.music.enabled);
        assert_eq!(options.segmentation.split_interval, 6.0);
        assert_eq!(options.segmentation.trim_amount, 1.0);
    }

    #[test]
    fn from_map_fills_defaults_and_ignores_unknown_keys() {
        let mut map = HashMap::new();
        map.insert("zoom_enabled".to_string(), "on".to_string());
        map.insert("zoom_factor".to_string(), "2.0".to_string());
        map.insert("bogus_key".to_string(), "whatever".to_string());

        let options = EditOptions::from_map(&map);
        assert!(options.zoom.enabled);
        assert_eq!(options.zoom.factor, 2.0);
        // missing keys resolve to defaults
        assert_eq!(options.blur.radius, 5.0);
        assert_eq!(options.text.color, "white");
        assert_eq!(options.transition.kind, TransitionKind::None);
    }

    #[test]
    fn from_map_unparseable_numbers_fall_back() {
        let mut map = HashMap::new();
        map.insert("blur_enabled".to_string(), "on".to_string());
        map.insert("blur_radius".to_string(), "not-a-number".to_string());

        let options = EditOptions::from_map(&map);
        assert_eq!(options.blur.radius, 5.0);
    }

    #[test]
    fn unknown_quality_falls_back_to_1080p() {
        let profile = QualityProfile::resolve("potato");
        assert_eq!(profile.name, "1080p");
        assert_eq!(profile.codec, "libx264");
        assert_eq!(profile.bitrate, "5000k");
        assert_eq!(profile.preset, "medium");

        let fourk = QualityProfile::resolve("4k");
        assert_eq!(fourk.bitrate, "20000k");
        assert_eq!(fourk.preset, "slow");
    }

    #[test]
    fn validation_rejects_out_of_range_values() {
        let mut options = EditOptions::default();
        options.segmentation.split_interval = 0.0;
        assert!(options.validate().is_err());

        let mut options = EditOptions::default();
        options.freeze.duration = -1.0;
        assert!(options.validate().is_err());

        let mut options = EditOptions::default();
        options.glitch.intensity = 1.5;
        assert!(options.validate().is_err());
    }

    #[test]
    fn toml_roundtrip_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("options.toml");

        let mut original = EditOptions::default();
        original.zoom.enabled = true;
        original.zoom.factor = 2.5;
        original.transition.kind = TransitionKind::Fade;

        let content = toml::to_string_pretty(&original).unwrap();
        std::fs::write(&file_path, content).unwrap();

        let loaded = EditOptions::from_file(&file_path).unwrap();
        assert!(loaded.zoom.enabled);
        assert_eq!(loaded.zoom.factor, 2.5);
        assert_eq!(loaded.transition.kind, TransitionKind::Fade);
    }
}
