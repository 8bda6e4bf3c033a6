//! Queued reporter: remote calls off the alarm loop
//!
//! ## Overview
//!
//! [`QueuedRemote::spawn`] moves a chat notifier and a store onto a
//! dedicated reporter thread and hands back two cheap handles,
//! [`QueuedChat`] and [`QueuedStore`], that implement the core capability
//! traits by enqueueing jobs. The alarm loop never waits on HTTP except for
//! the threshold read, which needs the answer.
//!
//! ## Ordering
//!
//! One bounded `tokio::sync::mpsc` channel, one consumer. Jobs run strictly
//! in submission order, so an edge report can never land after a later
//! heartbeat and overwrite it in the store.
//!
//! ## Backpressure
//!
//! | Job                         | Queue full                       |
//! |-----------------------------|----------------------------------|
//! | Chat message                | waits for space                  |
//! | Edge / `Starting` report    | waits for space                  |
//! | Heartbeat report            | dropped, `ConnectorError::QueueFull` |
//! | Threshold read              | waits for space and for the reply |
//!
//! A returned `Ok` means "accepted by the queue". Delivery failures on the
//! reporter thread are logged there.
//!
//! ## Shutdown
//!
//! The thread exits once every handle is dropped and the queue is drained.
//! [`ReporterThread::join`] waits for that; drop the handles first (for
//! example via `Reporter::into_parts`) or it waits forever.

use std::thread::{self, JoinHandle};

use tokio::sync::{mpsc, oneshot};
use vayuveer_core::{ChatNotifier, RemoteStore, Report, StatusLabel, ThresholdPayload};

use crate::{ConnectorError, Result};

type ThresholdReply = oneshot::Sender<Result<ThresholdPayload>>;

enum Job {
    Chat(String),
    Report(Report),
    FetchThreshold(ThresholdReply),
}

/// Entry point for building a queued chat/store pair
pub struct QueuedRemote;

impl QueuedRemote {
    /// Start the reporter thread
    ///
    /// `chat` and `store` move onto the thread; `capacity` is the queue
    /// depth and must be at least 1.
    pub fn spawn<C, R>(
        chat: C,
        store: R,
        capacity: usize,
    ) -> Result<(QueuedChat, QueuedStore, ReporterThread)>
    where
        C: ChatNotifier + Send + 'static,
        R: RemoteStore<Error = ConnectorError> + Send + 'static,
    {
        if capacity == 0 {
            return Err(ConnectorError::Config("queue capacity must be at least 1".into()));
        }

        let runtime = tokio::runtime::Builder::new_current_thread().build()?;
        let (tx, rx) = mpsc::channel(capacity);

        let handle = thread::Builder::new()
            .name("vayuveer-reporter".into())
            .spawn(move || runtime.block_on(drain(rx, chat, store)))?;

        Ok((
            QueuedChat { tx: tx.clone() },
            QueuedStore { tx },
            ReporterThread { handle },
        ))
    }
}

// The transports block; this thread has nothing else to do while they run.
async fn drain<C, R>(mut rx: mpsc::Receiver<Job>, mut chat: C, mut store: R)
where
    C: ChatNotifier,
    R: RemoteStore<Error = ConnectorError>,
{
    log::debug!("Reporter thread started");

    while let Some(job) = rx.recv().await {
        match job {
            Job::Chat(text) => {
                if let Err(e) = chat.send_message(&text) {
                    log::warn!("Queued chat notification failed: {:?}", e);
                }
            }
            Job::Report(report) => {
                if let Err(e) = store.put_state(&report) {
                    log::warn!("Queued state report {} failed: {}", report.status.as_str(), e);
                }
            }
            Job::FetchThreshold(reply) => {
                // The caller may have given up; nothing to do then.
                let _ = reply.send(store.fetch_threshold());
            }
        }
    }

    log::debug!("Reporter thread drained, exiting");
}

/// Handle to the reporter thread
pub struct ReporterThread {
    handle: JoinHandle<()>,
}

impl ReporterThread {
    /// Wait for the queue to drain and the thread to exit
    pub fn join(self) -> Result<()> {
        self.handle
            .join()
            .map_err(|_| ConnectorError::Transport("reporter thread panicked".into()))
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// [`ChatNotifier`] that enqueues messages
#[derive(Clone)]
pub struct QueuedChat {
    tx: mpsc::Sender<Job>,
}

impl ChatNotifier for QueuedChat {
    type Error = ConnectorError;

    fn send_message(&mut self, text: &str) -> Result<()> {
        self.tx
            .blocking_send(Job::Chat(text.to_owned()))
            .map_err(|_| ConnectorError::QueueClosed)
    }
}

/// [`RemoteStore`] that enqueues writes and waits for reads
#[derive(Clone)]
pub struct QueuedStore {
    tx: mpsc::Sender<Job>,
}

fn must_deliver(status: StatusLabel) -> bool {
    status.is_edge() || status == StatusLabel::Starting
}

impl RemoteStore for QueuedStore {
    type Error = ConnectorError;

    fn put_state(&mut self, report: &Report) -> Result<()> {
        let job = Job::Report(*report);

        if must_deliver(report.status) {
            return self
                .tx
                .blocking_send(job)
                .map_err(|_| ConnectorError::QueueClosed);
        }

        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ConnectorError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => ConnectorError::QueueClosed,
        })
    }

    fn fetch_threshold(&mut self) -> Result<ThresholdPayload> {
        let (reply, answer) = oneshot::channel();
        self.tx
            .blocking_send(Job::FetchThreshold(reply))
            .map_err(|_| ConnectorError::QueueClosed)?;

        answer
            .blocking_recv()
            .map_err(|_| ConnectorError::QueueClosed)?
    }
}
