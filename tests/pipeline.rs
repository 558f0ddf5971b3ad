//! Pipeline-level properties exercised through the public API, without the
//! external decode/encode engine: segmentation feeding synthetic segments
//! through the chain, transition composition and assembly, plus the job
//! state machine.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use clipforge::config::{EditOptions, TransitionKind, TransitionOptions};
use clipforge::effects::EffectChain;
use clipforge::job::{InMemoryJobStore, JobController, JobStatus, JobStore};
use clipforge::media::{Frame, SegmentClip};
use clipforge::timeline::{self, AudioPolicy};

const FPS: f64 = 10.0;

/// Build a synthetic decoded segment for a segmentation span.
fn synthetic_segment(span: &timeline::SegmentSpan, color: [u8; 3]) -> SegmentClip {
    let frame_count = ((span.end - span.start) * FPS).round() as usize;
    let frames = vec![Frame::new_filled(32, 18, color); frame_count];
    SegmentClip::new(span.start, span.end, FPS, frames)
}

#[test]
fn segmentation_to_assembly_preserves_total_duration_without_transitions() {
    let spans = timeline::segment(20.0, 6.0, 1.0).unwrap();
    assert_eq!(spans.len(), 4);

    let segments: Vec<SegmentClip> =
        spans.iter().map(|s| synthetic_segment(s, [10, 20, 30])).collect();
    let expected_duration: f64 = spans.iter().map(|s| s.duration()).sum();

    let transition = TransitionOptions { kind: TransitionKind::None, ..Default::default() };
    let assembled =
        timeline::assemble(segments, &transition, AudioPolicy::WholeSource, None, None).unwrap();

    assert!((assembled.duration() - expected_duration).abs() < 1e-9);
}

#[test]
fn each_transition_removes_exactly_one_overlap() {
    let spans = timeline::segment(20.0, 6.0, 1.0).unwrap();
    let segments: Vec<SegmentClip> =
        spans.iter().map(|s| synthetic_segment(s, [40, 50, 60])).collect();
    let plain_duration: f64 = spans.iter().map(|s| s.duration()).sum();

    let transition = TransitionOptions { kind: TransitionKind::Fade, duration: 1.0, ..Default::default() };
    let assembled =
        timeline::assemble(segments, &transition, AudioPolicy::WholeSource, None, None).unwrap();

    // three pairwise transitions, one second each
    let expected = plain_duration - 3.0;
    assert!((assembled.duration() - expected).abs() < 1e-9, "got {}", assembled.duration());
}

#[test]
fn identity_chain_leaves_synthetic_segments_untouched() {
    let spans = timeline::segment(12.0, 6.0, 1.0).unwrap();
    let chain = EffectChain::build(&EditOptions::default());

    for span in &spans {
        let mut clip = synthetic_segment(span, [1, 2, 3]);
        let before = clip.frames.clone();
        chain.apply(&mut clip).unwrap();
        assert_eq!(clip.frames, before);
    }
}

#[test]
fn wire_map_chain_applies_mirror_before_rotate() {
    // a marker pixel distinguishes the orders: mirror-then-rotate lands it at
    // a different spot than rotate-then-mirror would
    let mut map = HashMap::new();
    map.insert("mirror_enabled".to_string(), "on".to_string());
    map.insert("rotate_enabled".to_string(), "on".to_string());
    let chain = EffectChain::build(&EditOptions::from_map(&map));

    let mut frame = Frame::new_black(8, 8);
    frame.set_pixel(0, 0, [255, 255, 255]);
    let mut clip = SegmentClip::new(0.0, 0.1, 10.0, vec![frame]);
    chain.apply(&mut clip).unwrap();

    // mirror moves the marker to (7,0); rotate 90 ccw sends the right edge of
    // the top row to the top-left corner
    assert_eq!(clip.frames[0].get_pixel(0, 7), [0, 0, 0]);
    assert_eq!(clip.frames[0].get_pixel(0, 0), [255, 255, 255]);
}

#[tokio::test]
async fn job_reaches_error_for_an_unreadable_input() {
    let store = Arc::new(InMemoryJobStore::new());
    let dir = tempfile::tempdir().unwrap();
    let controller = JobController::new(store.clone(), dir.path(), 1);

    let id = controller.submit("tester", "/no/such/video.mp4", EditOptions::default()).unwrap();

    let job = wait_terminal(&controller, &id).await;
    assert_eq!(job.status, JobStatus::Error);
    assert!(job.error.is_some());
    // the job is visible through the owner listing
    let listed = store.list_by_owner("tester");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id);
}

#[tokio::test]
async fn cancelled_submission_never_reports_completed() {
    let store = Arc::new(InMemoryJobStore::new());
    let dir = tempfile::tempdir().unwrap();
    let controller = JobController::new(store, dir.path(), 1);

    let id = controller.submit("tester", "/no/such/video.mp4", EditOptions::default()).unwrap();
    controller.cancel(&id);

    let job = wait_terminal(&controller, &id).await;
    assert!(job.status.is_terminal());
    assert_ne!(job.status, JobStatus::Completed);
}

async fn wait_terminal(controller: &JobController, id: &clipforge::job::JobId) -> clipforge::job::Job {
    for _ in 0..300 {
        if let Some(job) = controller.status(id) {
            if job.status.is_terminal() {
                return job;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job never reached a terminal state");
}
