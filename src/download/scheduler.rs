//! Bounded-concurrency download scheduler.

use std::sync::atomic::{AtomicU64, Ordering};

use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;

use crate::download::acquire::{Acquire, AcquireOutcome};
use crate::download::state::{ItemFailure, RunReport};
use crate::error::Result;
use crate::fs::DownloadLayout;
use crate::media::MediaDescriptor;
use crate::output::create_item_bar;

/// Runs an [`Acquire`] implementation over many items, at most
/// `concurrency` at a time.
pub struct DownloadScheduler<A> {
    acquirer: A,
    layout: DownloadLayout,
    concurrency: usize,
    show_progress: bool,
    completed: AtomicU64,
}

impl<A: Acquire> DownloadScheduler<A> {
    pub fn new(acquirer: A, layout: DownloadLayout, concurrency: usize) -> Self {
        Self {
            acquirer,
            layout,
            concurrency: concurrency.max(1),
            show_progress: false,
            completed: AtomicU64::new(0),
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Items finished (including skips) since the scheduler was created.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Acquire every item.
    ///
    /// Items whose marker exists are skipped without touching the acquirer.
    /// Per-item errors are collected in the report; a fatal error (see
    /// [`crate::Error::is_fatal`]) stops the batch and is returned.
    pub async fn run(&self, items: Vec<MediaDescriptor>, label: &str) -> Result<RunReport> {
        let progress = if self.show_progress {
            create_item_bar(items.len() as u64, label)
        } else {
            ProgressBar::hidden()
        };

        let mut results = stream::iter(items)
            .map(|item| {
                let progress = progress.clone();
                async move {
                    let result = match self.layout.is_complete(&item).await {
                        Ok(true) => Ok(AcquireOutcome::AlreadyDone),
                        Ok(false) => self.acquirer.acquire(&item).await,
                        Err(e) => Err(e),
                    };
                    self.completed.fetch_add(1, Ordering::Relaxed);
                    progress.inc(1);
                    (item, result)
                }
            })
            .buffer_unordered(self.concurrency);

        let mut report = RunReport::default();
        while let Some((item, result)) = results.next().await {
            match result {
                Ok(outcome) => report.record(outcome),
                Err(e) if e.is_fatal() => {
                    progress.abandon();
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!("Media {} of {} failed: {}", item.media_id, item.author_id, e);
                    report.record_failure(ItemFailure {
                        media_id: item.media_id,
                        author_id: item.author_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        progress.finish_and_clear();
        Ok(report)
    }
}
