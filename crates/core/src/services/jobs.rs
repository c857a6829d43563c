//! Background jobs.
//!
//! An in-memory queue for maintenance work that must not run inside a
//! request, such as revoking proposals whose deadline passed.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, warn};

use crate::services::proposal::ProposalService;

/// Maximum number of concurrent job workers.
const MAX_WORKERS: usize = 1;

/// Channel buffer size for jobs.
const JOB_BUFFER_SIZE: usize = 100;

/// Job types that can be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Revoke every proposal whose revocation deadline passed.
    RevokeExpired,
}

/// Job sender for enqueueing jobs.
#[derive(Clone)]
pub struct JobSender {
    sender: mpsc::Sender<Job>,
}

impl JobSender {
    /// Enqueue a job for processing.
    pub async fn enqueue(&self, job: Job) -> Result<(), &'static str> {
        self.sender.send(job).await.map_err(|_| "Job queue is closed")
    }

    /// Enqueue a revocation run.
    pub async fn revoke_expired(&self) -> Result<(), &'static str> {
        self.enqueue(Job::RevokeExpired).await
    }
}

/// Services needed for job processing.
#[derive(Clone)]
pub struct JobWorkerContext {
    pub proposals: ProposalService,
}

/// Job processing service.
pub struct JobService {
    sender: mpsc::Sender<Job>,
    receiver: mpsc::Receiver<Job>,
}

impl JobService {
    /// Create a new job service.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel(JOB_BUFFER_SIZE);
        Self { sender, receiver }
    }

    /// Get a job sender for enqueueing jobs.
    #[must_use]
    pub fn sender(&self) -> JobSender {
        JobSender {
            sender: self.sender.clone(),
        }
    }

    /// Start the job processor with the given context.
    ///
    /// The processor stops once every sender is dropped.
    pub fn start(self, context: JobWorkerContext) -> tokio::task::JoinHandle<()> {
        let Self { sender, receiver } = self;
        drop(sender);
        let context = Arc::new(context);

        tokio::spawn(async move {
            info!("Job worker starting with {} workers", MAX_WORKERS);
            run_job_processor(receiver, context).await;
            info!("Job worker stopped");
        })
    }
}

impl Default for JobService {
    fn default() -> Self {
        Self::new()
    }
}

/// Enqueue a revocation run every `interval` until the queue closes.
pub fn spawn_revoke_scheduler(sender: JobSender, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if sender.revoke_expired().await.is_err() {
                debug!("Job queue closed, stopping revocation scheduler");
                break;
            }
        }
    })
}

async fn run_job_processor(mut receiver: mpsc::Receiver<Job>, context: Arc<JobWorkerContext>) {
    let semaphore = Arc::new(Semaphore::new(MAX_WORKERS));

    while let Some(job) = receiver.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            warn!("Job semaphore closed");
            break;
        };
        let ctx = context.clone();

        tokio::spawn(async move {
            let _permit = permit;
            process_job(job, &ctx).await;
        });
    }
}

async fn process_job(job: Job, context: &JobWorkerContext) {
    match job {
        Job::RevokeExpired => match context.proposals.revoke_expired(Utc::now()).await {
            Ok(revoked) => {
                debug!(count = revoked.len(), "Revocation run finished");
            }
            Err(e) => {
                error!(error = %e, "Revocation run failed");
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_enqueue_fails_once_processor_is_gone() {
        let service = JobService::new();
        let sender = service.sender();
        drop(service);

        assert!(sender.revoke_expired().await.is_err());
    }
}
