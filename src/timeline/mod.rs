//! Timeline slicing, transition composition and final assembly.

pub mod assembler;
pub mod segmenter;
pub mod transition;

pub use assembler::{assemble, AssembledTimeline, AudioPolicy};
pub use segmenter::{estimated_count, segment, SegmentSpan};
