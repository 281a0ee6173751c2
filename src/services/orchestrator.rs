use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::core::{normalize, Aggregator};
use crate::models::{
    JobStatus, ListingRecord, Platform, PlatformStatus, SearchRequest,
};
use crate::scrapers::{PlatformScraper, ScrapeError, ScraperAdapter};
use crate::services::maps::DistanceLookup;
use crate::services::registry::{JobRegistry, RegistryError};
use crate::services::report::ReportSink;

/// Wall-clock budgets for one job
#[derive(Debug, Clone, Copy)]
pub struct SearchTimeouts {
    /// Overall deadline for the whole job
    pub job: Duration,
    /// Budget for a single platform scrape
    pub platform: Duration,
}

impl Default for SearchTimeouts {
    fn default() -> Self {
        Self {
            job: Duration::from_secs(300),
            platform: Duration::from_secs(120),
        }
    }
}

/// Runs search jobs: concurrent per-platform dispatch, progress tracking,
/// aggregation and report publication
///
/// Platforms execute independently; one platform's failure or slowness never
/// blocks its siblings. All job mutation goes through the registry's atomic
/// `update`, and every fold is gated on the platform sub-status still being
/// non-terminal, so results arriving after the deadline are discarded.
pub struct Orchestrator {
    registry: Arc<JobRegistry>,
    scrapers: HashMap<Platform, Arc<dyn PlatformScraper>>,
    distance: Arc<dyn DistanceLookup>,
    sink: Arc<dyn ReportSink>,
    aggregator: Aggregator,
    timeouts: SearchTimeouts,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<JobRegistry>,
        scrapers: HashMap<Platform, Arc<dyn PlatformScraper>>,
        distance: Arc<dyn DistanceLookup>,
        sink: Arc<dyn ReportSink>,
        aggregator: Aggregator,
        timeouts: SearchTimeouts,
    ) -> Self {
        Self {
            registry,
            scrapers,
            distance,
            sink,
            aggregator,
            timeouts,
        }
    }

    /// Drive a job to a terminal state. Never panics the caller: an
    /// unexpected registry failure marks the job failed instead.
    pub async fn run(&self, job_id: &str) {
        if let Err(err) = self.execute(job_id).await {
            tracing::error!("Job {} aborted: {}", job_id, err);
            let _ = self
                .registry
                .update(job_id, |job| {
                    if !job.status.is_terminal() {
                        job.status = JobStatus::Failed;
                        job.error = Some(err.to_string());
                        job.completed_at = Some(Utc::now());
                    }
                })
                .await;
        }
    }

    async fn execute(&self, job_id: &str) -> Result<(), RegistryError> {
        let job = self.registry.get(job_id).await?;
        let request = job.request.clone();
        let total = request.platforms.len();

        tracing::info!(
            "Job {}: searching {} for {} platform(s)",
            job_id,
            request.location,
            total
        );

        self.registry
            .update(job_id, |job| {
                job.status = JobStatus::Running;
                job.progress = format!("0/{} platforms done", total);
                for progress in job.platforms.values_mut() {
                    progress.status = PlatformStatus::Running;
                }
            })
            .await?;

        let deadline = Instant::now() + self.timeouts.job;
        let mut tasks: JoinSet<(Platform, Result<Vec<ListingRecord>, ScrapeError>)> =
            JoinSet::new();

        for platform in request.platforms.iter().copied() {
            let Some(scraper) = self.scrapers.get(&platform).cloned() else {
                self.registry
                    .update(job_id, |job| {
                        if let Some(progress) = job.platforms.get_mut(&platform) {
                            progress.status = PlatformStatus::Failed;
                            progress.reason = Some("No scraper registered".to_string());
                        }
                    })
                    .await?;
                continue;
            };

            let adapter = ScraperAdapter::new(scraper, self.timeouts.platform);
            let task_request = request.clone();
            tasks.spawn(async move {
                let outcome = adapter.run(&task_request).await.map(|raw| {
                    raw.into_iter()
                        .filter_map(|listing| normalize(platform, listing))
                        .collect::<Vec<_>>()
                });
                (platform, outcome)
            });
        }

        let mut done = 0usize;
        let mut deadline_hit = false;

        while !tasks.is_empty() {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Err(_) => {
                    // Overall deadline: stop waiting, abandon the rest and
                    // proceed with whatever partial state exists.
                    deadline_hit = true;
                    tasks.abort_all();
                    tracing::warn!(
                        "Job {}: deadline of {}s elapsed with platforms outstanding",
                        job_id,
                        self.timeouts.job.as_secs()
                    );
                    break;
                }
                Ok(None) => break,
                Ok(Some(Err(join_err))) => {
                    tracing::error!("Job {}: scrape task died: {}", job_id, join_err);
                    continue;
                }
                Ok(Some(Ok((platform, outcome)))) => {
                    done += 1;
                    match outcome {
                        Ok(mut records) => {
                            self.fill_distances(&request.location, &mut records).await;
                            let count = records.len();
                            self.registry
                                .update(job_id, move |job| {
                                    let Some(progress) = job.platforms.get_mut(&platform) else {
                                        return;
                                    };
                                    if progress.status.is_terminal() {
                                        // Late result, platform already closed out
                                        return;
                                    }
                                    progress.status = PlatformStatus::Succeeded;
                                    progress.listings = count;
                                    job.results.extend(records);
                                    job.progress = format!("{}/{} platforms done", done, total);
                                })
                                .await?;
                            tracing::info!(
                                "Job {}: {} succeeded with {} listings",
                                job_id,
                                platform,
                                count
                            );
                        }
                        Err(err) => {
                            let reason = err.to_string();
                            self.registry
                                .update(job_id, move |job| {
                                    let Some(progress) = job.platforms.get_mut(&platform) else {
                                        return;
                                    };
                                    if progress.status.is_terminal() {
                                        return;
                                    }
                                    progress.status = PlatformStatus::Failed;
                                    progress.reason = Some(reason);
                                    job.progress = format!("{}/{} platforms done", done, total);
                                })
                                .await?;
                            tracing::warn!("Job {}: {} failed: {}", job_id, platform, err);
                        }
                    }
                }
            }
        }

        // Close out anything that never reached a terminal sub-status (the
        // deadline path, or a scrape task that died).
        let leftover_reason = if deadline_hit {
            ScrapeError::Timeout.to_string()
        } else {
            "Scrape task failed unexpectedly".to_string()
        };
        self.registry
            .update(job_id, |job| {
                for progress in job.platforms.values_mut() {
                    if !progress.status.is_terminal() {
                        progress.status = PlatformStatus::Failed;
                        progress.reason = Some(leftover_reason.clone());
                    }
                }
            })
            .await?;

        self.finalize(job_id, &request, deadline_hit).await
    }

    async fn finalize(
        &self,
        job_id: &str,
        request: &SearchRequest,
        deadline_hit: bool,
    ) -> Result<(), RegistryError> {
        let job = self.registry.get(job_id).await?;
        let succeeded: Vec<Platform> = job
            .platforms
            .iter()
            .filter(|(_, progress)| progress.status == PlatformStatus::Succeeded)
            .map(|(platform, _)| *platform)
            .collect();

        if succeeded.is_empty() {
            let status = if deadline_hit {
                JobStatus::TimedOut
            } else {
                JobStatus::Failed
            };
            tracing::warn!("Job {}: no platform succeeded, marking {:?}", job_id, status);
            return self
                .registry
                .update(job_id, |job| {
                    job.status = status;
                    job.progress = "All platforms failed".to_string();
                    job.error = Some("All platforms failed".to_string());
                    job.completed_at = Some(Utc::now());
                })
                .await;
        }

        let mut aggregated = self.aggregator.aggregate(job.results.clone(), request);
        for (platform, counts) in aggregated.platform_counts.iter_mut() {
            counts.succeeded = succeeded.contains(platform);
        }

        let listing_count = aggregated.listings.len();
        tracing::info!(
            "Job {}: aggregated {} listings from {} platform(s)",
            job_id,
            listing_count,
            succeeded.len()
        );

        match self.sink.publish(job_id, request, &aggregated).await {
            Ok(location) => {
                // Completion becomes client-visible only now, with the
                // report durably written.
                self.registry
                    .update(job_id, move |job| {
                        job.status = JobStatus::Completed;
                        job.progress = format!("Done! {} listings in report", listing_count);
                        job.report_location = Some(location);
                        job.completed_at = Some(Utc::now());
                    })
                    .await
            }
            Err(err) => {
                tracing::error!("Job {}: report publication failed: {}", job_id, err);
                let reason = format!("Report could not be written: {}", err);
                self.registry
                    .update(job_id, move |job| {
                        job.status = JobStatus::Failed;
                        job.progress = "Report publication failed".to_string();
                        job.error = Some(reason);
                        job.completed_at = Some(Utc::now());
                    })
                    .await
            }
        }
    }

    /// Best-effort distance enrichment; lookup failures leave the field
    /// unknown.
    async fn fill_distances(&self, origin: &str, records: &mut [ListingRecord]) {
        for record in records.iter_mut() {
            if record.distance_km.is_some() {
                continue;
            }
            let destination = record
                .address
                .clone()
                .unwrap_or_else(|| format!("{}, {}", record.title, origin));

            match self.distance.distance_km(origin, &destination).await {
                Ok(Some(km)) => record.distance_km = Some(km),
                Ok(None) => {}
                Err(err) => {
                    tracing::debug!("Distance lookup failed for {}: {}", record.title, err);
                }
            }
        }
    }
}
