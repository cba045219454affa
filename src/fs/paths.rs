//! On-disk layout: media files, completion markers and listing dumps.
//!
//! ```text
//! {root}/{authorId}/{mediaId}.{ext}   media file
//! {root}/{authorId}/{mediaId}.done    completion marker (empty)
//! {root}/{authorId}/posts.json        raw post listing
//! ```

use std::path::{Path, PathBuf};

use crate::api::types::Post;
use crate::error::{Error, Result};
use crate::media::MediaDescriptor;

/// Marker file extension.
const MARKER_EXTENSION: &str = "done";

/// Listing dump file name.
const POSTS_DUMP: &str = "posts.json";

/// Path scheme for everything written under the download root.
#[derive(Debug, Clone)]
pub struct DownloadLayout {
    root: PathBuf,
}

impl DownloadLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder of one author.
    pub fn author_dir(&self, author_id: u64) -> PathBuf {
        self.root.join(author_id.to_string())
    }

    /// Final media file of an item.
    pub fn media_path(&self, item: &MediaDescriptor) -> PathBuf {
        self.author_dir(item.author_id)
            .join(format!("{}.{}", item.media_id, item.extension()))
    }

    /// Completion marker of an item.
    pub fn marker_path(&self, item: &MediaDescriptor) -> PathBuf {
        self.author_dir(item.author_id)
            .join(format!("{}.{}", item.media_id, MARKER_EXTENSION))
    }

    /// Listing dump of an author.
    pub fn posts_dump_path(&self, author_id: u64) -> PathBuf {
        self.author_dir(author_id).join(POSTS_DUMP)
    }

    /// Whether the item's marker exists.
    pub async fn is_complete(&self, item: &MediaDescriptor) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.marker_path(item)).await?)
    }

    /// Write the item's marker. Refuses to mark a missing or empty file.
    pub async fn mark_complete(&self, item: &MediaDescriptor) -> Result<()> {
        let media_path = self.media_path(item);
        let size = match tokio::fs::metadata(&media_path).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(Error::Io(e)),
        };

        if size == 0 {
            return Err(Error::Download(format!(
                "Refusing to mark {} complete: output is missing or empty",
                media_path.display()
            )));
        }

        tokio::fs::write(self.marker_path(item), b"").await?;
        Ok(())
    }

    /// Ensure the author folder exists.
    pub async fn ensure_author_dir(&self, author_id: u64) -> Result<PathBuf> {
        let dir = self.author_dir(author_id);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Write the raw listing of an author, replacing any previous dump.
    pub async fn write_posts_dump(&self, author_id: u64, posts: &[Post]) -> Result<PathBuf> {
        self.ensure_author_dir(author_id).await?;
        let path = self.posts_dump_path(author_id);
        let json = serde_json::to_vec_pretty(posts)?;
        tokio::fs::write(&path, json).await?;
        Ok(path)
    }
}
