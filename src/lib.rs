//! # Clipforge
//!
//! Batch-transform an uploaded video into an edited output: slice the source
//! into timed segments, run a configurable chain of per-frame and per-sample
//! effects over each segment, stitch the segments back together with optional
//! transitions, overlay background music and render at a chosen quality
//! profile. Each submission is one asynchronous job driven end-to-end by its
//! own worker.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use clipforge::{
//!     config::EditOptions,
//!     job::{InMemoryJobStore, JobController},
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let store = Arc::new(InMemoryJobStore::new());
//! let controller = JobController::new(store, "outputs/", 4);
//!
//! let mut options = EditOptions::default();
//! options.zoom.enabled = true;
//!
//! let job_id = controller.submit("user-1", "input.mp4", options)?;
//! // poll controller.status(&job_id) until the job reaches a terminal state
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The pipeline runs strictly sequentially within one job:
//!
//! - [`timeline::segmenter`] - partitions the source into timed spans
//! - [`effects`] - the frame transform library and the fixed-order effect chain
//! - [`timeline::transition`] - blends adjacent processed segments
//! - [`timeline::assembler`] - concatenation, audio reattachment, music mixing
//! - [`render`] - encodes the assembled timeline via the external engine
//! - [`job`] - the lifecycle state machine, store and worker pool
//!
//! Decode and encode are delegated to the ffmpeg CLI; everything between the
//! decoded frames and the final encode is pure Rust.

pub mod config;
pub mod effects;
pub mod error;
pub mod job;
pub mod media;
pub mod render;
pub mod timeline;

// Re-export commonly used types for convenience
pub use crate::{
    config::{EditOptions, QualityProfile},
    effects::EffectChain,
    error::{EditorError, Result},
    job::{InMemoryJobStore, JobController, JobStatus},
};
