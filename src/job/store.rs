use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::job::types::{Job, JobId};

/// Owned, thread-safe job registry injected into the controller.
///
/// Updates against a terminal job are ignored: once a job reaches
/// `completed`, `error` or `cancelled` its record is immutable and a retry
/// requires a new job.
pub trait JobStore: Send + Sync {
    fn put(&self, job: Job);
    fn get(&self, id: &JobId) -> Option<Job>;
    /// Apply a mutation to a live job. Returns false if the job is unknown
    /// or already terminal.
    fn update(&self, id: &JobId, mutate: &mut dyn FnMut(&mut Job)) -> bool;
    fn list_by_owner(&self, owner: &str) -> Vec<Job>;
}

/// In-memory store backing a single-process deployment.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for InMemoryJobStore {
    fn put(&self, job: Job) {
        let mut jobs = self.jobs.write().expect("job store lock poisoned");
        jobs.insert(job.id.clone(), job);
    }

    fn get(&self, id: &JobId) -> Option<Job> {
        let jobs = self.jobs.read().expect("job store lock poisoned");
        jobs.get(id).cloned()
    }

    fn update(&self, id: &JobId, mutate: &mut dyn FnMut(&mut Job)) -> bool {
        let mut jobs = self.jobs.write().expect("job store lock poisoned");
        match jobs.get_mut(id) {
            Some(job) if !job.status.is_terminal() => {
                mutate(job);
                true
            }
            Some(_) => {
                debug!("Ignoring update to terminal job {}", id);
                false
            }
            None => false,
        }
    }

    fn list_by_owner(&self, owner: &str) -> Vec<Job> {
        let jobs = self.jobs.read().expect("job store lock poisoned");
        let mut owned: Vec<Job> = jobs.values().filter(|j| j.owner == owner).cloned().collect();
        owned.sort_by_key(|j| j.created_at);
        owned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditOptions;
    use crate::job::types::JobStatus;

    fn store_with_job(owner: &str) -> (InMemoryJobStore, JobId) {
        let store = InMemoryJobStore::new();
        let job = Job::new(owner, "/tmp/in.mp4", EditOptions::default());
        let id = job.id.clone();
        store.put(job);
        (store, id)
    }

    #[test]
    fn put_then_get_roundtrips() {
        let (store, id) = store_with_job("alice");
        let job = store.get(&id).unwrap();
        assert_eq!(job.owner, "alice");
        assert!(store.get(&JobId::new()).is_none());
    }

    #[test]
    fn update_mutates_live_jobs() {
        let (store, id) = store_with_job("alice");
        assert!(store.update(&id, &mut |job| {
            job.status = JobStatus::Processing;
            job.progress = 40;
        }));
        let job = store.get(&id).unwrap();
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.progress, 40);
    }

    #[test]
    fn terminal_jobs_are_immutable() {
        let (store, id) = store_with_job("alice");
        assert!(store.update(&id, &mut |job| job.status = JobStatus::Completed));

        let touched = store.update(&id, &mut |job| job.progress = 10);
        assert!(!touched);
        assert_eq!(store.get(&id).unwrap().progress, 0);
    }

    #[test]
    fn list_by_owner_filters_and_orders() {
        let store = InMemoryJobStore::new();
        for owner in ["alice", "bob", "alice"] {
            store.put(Job::new(owner, "/tmp/in.mp4", EditOptions::default()));
        }
        assert_eq!(store.list_by_owner("alice").len(), 2);
        assert_eq!(store.list_by_owner("bob").len(), 1);
        assert!(store.list_by_owner("carol").is_empty());
    }
}
