//! # Frame Transform Library & Effect Chain
//!
//! Pure frame/sample transforms plus the builder that resolves a job's
//! options into the fixed-order chain applied to every segment:
//!
//! 1. Zoom (continuous or timed pulse)
//! 2. Freeze (closing hold or cyclic hold)
//! 3. Mirror
//! 4. Rotate
//! 5. Gaussian blur
//! 6. Channel-shift glitch
//! 7. Old-film look
//! 8. Speed change
//! 9. Text overlay
//! 10. Audio noise reduction (audio only, always last)
//!
//! Disabled stages are exact identity transforms because they are simply not
//! part of the built chain.

pub mod audio;
pub mod chain;
pub mod filters;
pub mod freeze;
pub mod geometry;
pub mod speed;
pub mod text;
pub mod zoom;

pub use chain::{EffectChain, EffectStage};
pub use text::CaptionLayer;
