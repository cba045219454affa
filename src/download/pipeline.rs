//! Subscription processing: list, aggregate, dump, download.

use crate::api::{OnlyFansApi, Subscription};
use crate::download::acquire::MediaAcquirer;
use crate::download::posts::all_posts;
use crate::download::scheduler::DownloadScheduler;
use crate::download::state::{GlobalState, SubscriptionState};
use crate::error::Result;
use crate::fs::DownloadLayout;
use crate::media::extract_media;

/// Drives the whole run over every active subscription.
pub struct Downloader {
    api: OnlyFansApi,
    layout: DownloadLayout,
    scheduler: DownloadScheduler<MediaAcquirer>,
    page_concurrency: usize,
}

impl Downloader {
    pub fn new(
        api: OnlyFansApi,
        acquirer: MediaAcquirer,
        page_concurrency: usize,
        download_concurrency: usize,
    ) -> Self {
        let layout = acquirer.layout().clone();
        Self {
            api,
            scheduler: DownloadScheduler::new(acquirer, layout.clone(), download_concurrency),
            layout,
            page_concurrency,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.scheduler = self.scheduler.with_progress(show);
        self
    }

    /// Process every active subscription.
    ///
    /// Listing failures and fatal errors end the run. Any other error while
    /// processing a subscription is recorded and the next one is processed.
    pub async fn run_all(&self) -> Result<GlobalState> {
        let subscriptions = self.api.list_active_subscriptions().await?;
        tracing::info!("Found {} active subscription(s)", subscriptions.len());

        let mut global = GlobalState::default();
        for subscription in &subscriptions {
            match self.process_subscription(subscription).await {
                Ok(state) => global.add_subscription(state),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!("Failed to process {}: {}", subscription.username, e);
                    global.mark_subscription_failed(&subscription.username, e.to_string());
                }
            }
        }

        Ok(global)
    }

    /// Aggregate, dump and download one subscription.
    pub async fn process_subscription(&self, subscription: &Subscription) -> Result<SubscriptionState> {
        tracing::info!(
            "Processing {} ({})",
            subscription.username,
            subscription.id
        );
        let mut state = SubscriptionState::new(subscription.username.clone(), subscription.id);

        let posts = all_posts(&self.api, subscription.id, self.page_concurrency).await?;
        state.posts = posts.len() as u64;

        let dump = self.layout.write_posts_dump(subscription.id, &posts).await?;
        tracing::debug!("Wrote listing dump {}", dump.display());

        let items = extract_media(&posts);
        state.media = items.len() as u64;
        tracing::info!(
            "{}: {} post(s), {} media item(s)",
            subscription.username,
            state.posts,
            state.media
        );

        state.report = self.scheduler.run(items, &subscription.username).await?;
        Ok(state)
    }
}
