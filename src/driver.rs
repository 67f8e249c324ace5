//! Driver spawns and manages the playback worker
//!
//! Triggers can arrive from many tasks at once, but a soundboard plays one
//! sound at a time. The worker task owns the [`Soundboard`] and takes jobs
//! from a bounded queue strictly one after another: a job's load and play
//! both finish, transport released, before the next job is looked at.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::playback::PlaybackSummary;
use crate::source::SoundSource;
use crate::transport::Connector;
use crate::types::PlaybackTarget;
use crate::{Result, Soundboard, SoundboardError};

type Reply = oneshot::Sender<Result<PlaybackSummary>>;

/// One queued load-and-play job.
struct PlayJob {
    identifier: String,
    target: PlaybackTarget,
    reply: Reply,
}

/// Cloneable handle for submitting jobs to a running worker.
#[derive(Debug, Clone)]
pub struct Requester {
    jobs: mpsc::Sender<PlayJob>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for PlayJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayJob")
            .field("identifier", &self.identifier)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Result of a job that has been queued but not necessarily played yet.
#[derive(Debug)]
pub struct PendingPlayback {
    reply: oneshot::Receiver<Result<PlaybackSummary>>,
}

impl PendingPlayback {
    /// Wait for the job to finish.
    ///
    /// Resolves to [`SoundboardError::WorkerStopped`] if the worker shut down
    /// before starting this job.
    pub async fn wait(self) -> Result<PlaybackSummary> {
        self.reply.await.map_err(|_| SoundboardError::WorkerStopped)?
    }
}

impl Requester {
    /// Queue a job, waiting for queue space if needed.
    pub async fn enqueue(
        &self,
        identifier: impl Into<String>,
        target: PlaybackTarget,
    ) -> Result<PendingPlayback> {
        if self.cancel.is_cancelled() {
            return Err(SoundboardError::WorkerStopped);
        }

        let (reply, rx) = oneshot::channel();
        let job = PlayJob { identifier: identifier.into(), target, reply };
        debug!("Queueing {:?}", job);
        self.jobs.send(job).await.map_err(|_| SoundboardError::WorkerStopped)?;
        Ok(PendingPlayback { reply: rx })
    }

    /// Queue a job and wait for it to finish.
    pub async fn submit(
        &self,
        identifier: impl Into<String>,
        target: PlaybackTarget,
    ) -> Result<PlaybackSummary> {
        self.enqueue(identifier, target).await?.wait().await
    }
}

/// Owner handle for the worker task.
#[derive(Debug)]
pub struct WorkerHandle {
    requester: Requester,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    pub fn requester(&self) -> Requester {
        self.requester.clone()
    }

    /// See [`Requester::submit`].
    pub async fn submit(
        &self,
        identifier: impl Into<String>,
        target: PlaybackTarget,
    ) -> Result<PlaybackSummary> {
        self.requester.submit(identifier, target).await
    }

    /// See [`Requester::enqueue`].
    pub async fn enqueue(
        &self,
        identifier: impl Into<String>,
        target: PlaybackTarget,
    ) -> Result<PendingPlayback> {
        self.requester.enqueue(identifier, target).await
    }

    /// Token that stops the worker when cancelled, for wiring to signal handling.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.requester.cancel.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop taking jobs, let the current job finish, and wait for the worker
    /// to exit. Jobs still queued resolve to [`SoundboardError::WorkerStopped`].
    pub async fn shutdown(self) {
        self.requester.cancel.cancel();
        if let Err(e) = self.task.await {
            error!("Playback worker panicked: {}", e);
        }
    }
}

/// Spawns the playback worker.
pub struct Driver;

impl Driver {
    /// Spawn a worker owning `board`, with room for `queue_depth` waiting jobs.
    pub fn spawn<S, C>(board: Soundboard<S, C>, queue_depth: usize) -> WorkerHandle
    where
        S: SoundSource,
        C: Connector,
    {
        let (job_tx, job_rx) = mpsc::channel(queue_depth.max(1));
        let cancel = CancellationToken::new();

        let cancel_worker = cancel.clone();
        let task = tokio::spawn(async move {
            Self::worker_task(board, job_rx, cancel_worker).await;
        });

        WorkerHandle { requester: Requester { jobs: job_tx, cancel }, task }
    }

    async fn worker_task<S, C>(
        board: Soundboard<S, C>,
        mut jobs: mpsc::Receiver<PlayJob>,
        cancel: CancellationToken,
    ) where
        S: SoundSource,
        C: Connector,
    {
        info!("Playback worker started");
        let mut processed = 0u64;

        loop {
            // Cancellation is only observed between jobs; a job in flight
            // always runs through to releasing its transport.
            let job = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Playback worker cancelled");
                    break;
                }
                job = jobs.recv() => match job {
                    Some(job) => job,
                    None => {
                        debug!("All requesters dropped");
                        break;
                    }
                },
            };

            let result = board.load_and_play(&job.identifier, &job.target).await;
            if let Err(e) = &result {
                error!("Job '{}' for {} failed: {}", job.identifier, job.target, e);
            }
            if job.reply.send(result).is_err() {
                debug!("Requester for '{}' stopped waiting", job.identifier);
            }
            processed += 1;
        }

        jobs.close();
        info!("Playback worker stopped ({} jobs processed)", processed);
    }
}
