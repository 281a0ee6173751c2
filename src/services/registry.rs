use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{Job, JobStatus, PlatformProgress, SearchRequest};

/// Errors that can occur with registry operations
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("search job not found: {0}")]
    NotFound(String),
}

/// In-memory store of search jobs, keyed by job id
///
/// The registry is the only shared mutable structure in the service. Every
/// mutation goes through `update`, which holds the write lock for the whole
/// closure, so a concurrent reader never observes a half-updated job.
/// Terminal jobs older than the retention window are purged lazily on access
/// and by the periodic sweep; a queued or running job is never purged.
pub struct JobRegistry {
    jobs: RwLock<HashMap<String, Job>>,
    retention: chrono::Duration,
}

impl JobRegistry {
    pub fn new(retention: Duration) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            retention: chrono::Duration::from_std(retention)
                .unwrap_or_else(|_| chrono::Duration::hours(6)),
        }
    }

    /// Allocate a new job in `queued` state and return its id.
    pub async fn create(&self, request: SearchRequest) -> String {
        let mut jobs = self.jobs.write().await;

        let mut id = short_id();
        while jobs.contains_key(&id) {
            id = short_id();
        }

        let platforms = request
            .platforms
            .iter()
            .map(|p| (*p, PlatformProgress::pending()))
            .collect();

        let job = Job {
            id: id.clone(),
            request,
            status: JobStatus::Queued,
            platforms,
            progress: "Queued".to_string(),
            results: Vec::new(),
            created_at: Utc::now(),
            completed_at: None,
            report_location: None,
            error: None,
        };

        jobs.insert(id.clone(), job);
        tracing::debug!("Created job {} ({} jobs held)", id, jobs.len());

        id
    }

    /// Fetch a snapshot of a job. Expired terminal jobs are evicted here.
    pub async fn get(&self, job_id: &str) -> Result<Job, RegistryError> {
        let mut jobs = self.jobs.write().await;

        match jobs.get(job_id) {
            Some(job) if self.expired(job) => {
                jobs.remove(job_id);
                Err(RegistryError::NotFound(job_id.to_string()))
            }
            Some(job) => Ok(job.clone()),
            None => Err(RegistryError::NotFound(job_id.to_string())),
        }
    }

    /// Apply an atomic mutation to a stored job.
    pub async fn update<F>(&self, job_id: &str, mutator: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut Job),
    {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| RegistryError::NotFound(job_id.to_string()))?;
        mutator(job);
        Ok(())
    }

    /// Purge expired terminal jobs; returns how many were evicted.
    pub async fn sweep(&self) -> usize {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| !self.expired(job));
        before - jobs.len()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    fn expired(&self, job: &Job) -> bool {
        if !job.status.is_terminal() {
            return false;
        }
        let reference = job.completed_at.unwrap_or(job.created_at);
        Utc::now() - reference > self.retention
    }
}

/// 8-hex-char token; collision-checked against held jobs at creation
fn short_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}
