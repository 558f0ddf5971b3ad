//! Media decode handles and the frame/audio data model.

pub mod source;
pub mod types;

pub use source::{read_wav, MediaProbe, MediaSource};
pub use types::{AudioTrack, Frame, SegmentClip};
