//! Per-item acquisition.

use std::path::Path;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::api::OnlyFansApi;
use crate::drm::DecryptionPipeline;
use crate::error::{Error, Result};
use crate::fs::DownloadLayout;
use crate::media::{MediaDescriptor, MediaSource};

/// Terminal state of a successful acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// File written and marked complete.
    Downloaded,
    /// Marker already present; nothing fetched.
    AlreadyDone,
    /// The account cannot view the media.
    Unavailable,
}

/// Something that can materialize one media item on disk.
#[async_trait]
pub trait Acquire: Send + Sync {
    async fn acquire(&self, item: &MediaDescriptor) -> Result<AcquireOutcome>;
}

/// Downloads plain media and hands protected media to the decryption pipeline.
#[derive(Debug, Clone)]
pub struct MediaAcquirer {
    api: OnlyFansApi,
    layout: DownloadLayout,
    decryptor: DecryptionPipeline,
}

impl MediaAcquirer {
    pub fn new(api: OnlyFansApi, layout: DownloadLayout, decryptor: DecryptionPipeline) -> Self {
        Self {
            api,
            layout,
            decryptor,
        }
    }

    pub fn layout(&self) -> &DownloadLayout {
        &self.layout
    }

    /// Stream a plain file to disk. An empty body is an error.
    async fn stream_plain(&self, url: &str, output: &Path) -> Result<()> {
        let response = self.api.download(url, None).await?;

        let mut file = File::create(output).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::Download(format!("Stream error: {}", e)))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;

        if written == 0 {
            drop(file);
            let _ = tokio::fs::remove_file(output).await;
            return Err(Error::Download(format!("Empty response body from {}", url)));
        }

        tracing::debug!("Wrote {} bytes to {}", written, output.display());
        Ok(())
    }
}

#[async_trait]
impl Acquire for MediaAcquirer {
    async fn acquire(&self, item: &MediaDescriptor) -> Result<AcquireOutcome> {
        if self.layout.is_complete(item).await? {
            return Ok(AcquireOutcome::AlreadyDone);
        }

        let Some(source) = &item.source else {
            tracing::debug!("Media {} is not viewable, skipping", item.media_id);
            return Ok(AcquireOutcome::Unavailable);
        };

        self.layout.ensure_author_dir(item.author_id).await?;
        let output = self.layout.media_path(item);

        match source {
            MediaSource::Plain { url } => self.stream_plain(url, &output).await?,
            MediaSource::Protected(protection) => {
                self.decryptor.decrypt(item, protection, &output).await?
            }
        }

        self.layout.mark_complete(item).await?;
        tracing::debug!("Acquired {} {} -> {}", item.kind, item.media_id, output.display());

        Ok(AcquireOutcome::Downloaded)
    }
}
