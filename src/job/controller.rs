use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::{watch, Semaphore};
use tracing::{debug, error, info, warn};

use crate::config::{EditOptions, QualityProfile};
use crate::effects::EffectChain;
use crate::error::{EditorError, Result};
use crate::job::store::JobStore;
use crate::job::types::{Job, JobId, JobStatus};
use crate::media::MediaSource;
use crate::render::Renderer;
use crate::timeline::{self, AudioPolicy};

/// Drives one job per worker through the pipeline:
/// segmentation, per-segment effects, transition composition, assembly,
/// render. Owns the lifecycle state machine
/// `queued -> processing -> {completed | error | cancelled}` and publishes
/// progress through the injected store after each discrete stage.
pub struct JobController {
    store: Arc<dyn JobStore>,
    output_dir: PathBuf,
    workers: Arc<Semaphore>,
    cancellations: Arc<Mutex<HashMap<JobId, watch::Sender<bool>>>>,
}

impl JobController {
    /// `max_workers` bounds the number of concurrently processing jobs;
    /// further submissions queue on the pool.
    pub fn new(store: Arc<dyn JobStore>, output_dir: impl Into<PathBuf>, max_workers: usize) -> Self {
        Self {
            store,
            output_dir: output_dir.into(),
            workers: Arc::new(Semaphore::new(max_workers.max(1))),
            cancellations: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn store(&self) -> Arc<dyn JobStore> {
        self.store.clone()
    }

    /// Validate options, record the job as queued and dispatch a worker.
    pub fn submit(
        &self,
        owner: impl Into<String>,
        input_path: impl Into<PathBuf>,
        options: EditOptions,
    ) -> Result<JobId> {
        options.validate()?;
        std::fs::create_dir_all(&self.output_dir)?;

        let job = Job::new(owner, input_path, options);
        let id = job.id.clone();
        let input = job.input_path.clone();
        let options = job.options.clone();
        self.store.put(job);

        let (cancel_tx, cancel_rx) = watch::channel(false);
        self.cancellations
            .lock()
            .expect("cancellation map lock poisoned")
            .insert(id.clone(), cancel_tx);

        let store = self.store.clone();
        let workers = self.workers.clone();
        let cancellations = self.cancellations.clone();
        let output_dir = self.output_dir.clone();
        let job_id = id.clone();

        tokio::spawn(async move {
            run_worker(store, workers, output_dir, job_id.clone(), input, options, cancel_rx).await;
            cancellations
                .lock()
                .expect("cancellation map lock poisoned")
                .remove(&job_id);
        });

        info!("Submitted job {}", id);
        Ok(id)
    }

    /// Request cooperative cancellation. The job observes the request at its
    /// next checkpoint; an in-flight encode is never interrupted.
    pub fn cancel(&self, id: &JobId) -> bool {
        let cancellations = self.cancellations.lock().expect("cancellation map lock poisoned");
        match cancellations.get(id) {
            Some(sender) => {
                info!("Cancellation requested for job {}", id);
                sender.send(true).is_ok()
            }
            None => false,
        }
    }

    pub fn status(&self, id: &JobId) -> Option<Job> {
        self.store.get(id)
    }

    pub fn list_jobs(&self, owner: &str) -> Vec<Job> {
        self.store.list_by_owner(owner)
    }
}

async fn run_worker(
    store: Arc<dyn JobStore>,
    workers: Arc<Semaphore>,
    output_dir: PathBuf,
    id: JobId,
    input: PathBuf,
    options: EditOptions,
    cancel_rx: watch::Receiver<bool>,
) {
    let permit = match workers.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => {
            apply_outcome(&store, &id, Err(EditorError::generic("worker pool closed")));
            return;
        }
    };

    store.update(&id, &mut |job| {
        job.status = JobStatus::Processing;
        job.progress = 0;
    });
    info!("Job {} picked up for processing", id);

    let result = run_pipeline(&store, &id, &input, &options, &output_dir, &cancel_rx).await;
    apply_outcome(&store, &id, result);
    drop(permit);
}

/// Map the pipeline outcome onto the terminal state machine transition.
fn apply_outcome(store: &Arc<dyn JobStore>, id: &JobId, result: Result<PathBuf>) {
    match result {
        Ok(output_path) => {
            store.update(id, &mut |job| {
                job.status = JobStatus::Completed;
                job.progress = 100;
                job.output_path = Some(output_path.clone());
            });
            info!("Job {} completed", id);
        }
        Err(err) if err.is_cancellation() => {
            store.update(id, &mut |job| job.status = JobStatus::Cancelled);
            info!("Job {} cancelled", id);
        }
        Err(err) => {
            let message = err.user_message();
            error!("Job {} failed: {}", id, message);
            store.update(id, &mut |job| {
                job.status = JobStatus::Error;
                job.error = Some(message.clone());
            });
        }
    }
}

fn check_cancelled(cancel_rx: &watch::Receiver<bool>) -> Result<()> {
    if *cancel_rx.borrow() {
        return Err(EditorError::Cancelled);
    }
    Ok(())
}

fn publish_progress(store: &Arc<dyn JobStore>, id: &JobId, progress: u8) {
    store.update(id, &mut |job| job.progress = job.progress.max(progress));
}

/// The sequential per-job pipeline. Every held media handle lives in this
/// scope, so success, failure and cancellation all release resources when
/// the function returns.
async fn run_pipeline(
    store: &Arc<dyn JobStore>,
    id: &JobId,
    input: &Path,
    options: &EditOptions,
    output_dir: &Path,
    cancel_rx: &watch::Receiver<bool>,
) -> Result<PathBuf> {
    check_cancelled(cancel_rx)?;

    let source = MediaSource::open(input).await?;
    let probe = source.probe().clone();

    let spans = timeline::segment(
        probe.duration,
        options.segmentation.split_interval,
        options.segmentation.trim_amount,
    )?;
    let estimated = timeline::estimated_count(probe.duration, options.segmentation.split_interval);

    let chain = EffectChain::build(options);
    let policy = if chain.processes_audio() {
        AudioPolicy::PerSegment
    } else {
        AudioPolicy::WholeSource
    };
    debug!(
        "Job {}: {} spans, {} chain stages, audio policy {:?}",
        id,
        spans.len(),
        chain.stages().len(),
        policy
    );

    let mut segments = Vec::with_capacity(spans.len());
    for (index, span) in spans.iter().enumerate() {
        check_cancelled(cancel_rx)?;

        let mut clip = source.decode_segment(index, span.start, span.end, probe.fps).await?;
        if policy == AudioPolicy::PerSegment {
            clip.audio = source.decode_segment_audio(index, span.start, span.end).await?;
        }
        chain.apply(&mut clip)?;
        segments.push(clip);

        // progress is an estimate: trimming may have dropped windows, so the
        // ratio is clamped into the segmentation band
        let progress = (((index + 1) * 90) / estimated.max(1)).min(90) as u8;
        publish_progress(store, id, progress);
    }
    publish_progress(store, id, 90);

    check_cancelled(cancel_rx)?;
    let source_audio = match policy {
        AudioPolicy::WholeSource => source.decode_full_audio().await?,
        AudioPolicy::PerSegment => None,
    };

    let music = resolve_music(&source, options).await;

    check_cancelled(cancel_rx)?;
    let assembled = timeline::assemble(segments, &options.transition, policy, source_audio, music)?;

    check_cancelled(cancel_rx)?;
    let profile = QualityProfile::resolve(&options.quality.preset);
    let mut renderer = Renderer::new(profile);
    let output_path = output_dir.join(format!("{}_edited.mp4", id));
    let artifact = renderer.render(&assembled, &output_path).await?;
    publish_progress(store, id, 100);

    Ok(artifact.path)
}

/// Resolve the background music asset; any failure is a non-fatal skip.
async fn resolve_music(source: &MediaSource, options: &EditOptions) -> Option<(crate::media::AudioTrack, f32)> {
    if !options.music.enabled {
        return None;
    }
    let path = match &options.music.path {
        Some(path) => path,
        None => {
            warn!("Background music enabled without a path, skipping");
            return None;
        }
    };
    match source.decode_audio_asset(path).await {
        Ok(track) => Some((track, options.music.volume)),
        Err(err) => {
            warn!("Background music asset unavailable ({}), skipping", err);
            None
        }
    }
}
