//! Protected media: manifest, license exchange and ffmpeg decryption.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;

use crate::api::OnlyFansApi;
use crate::drm::device::WidevineDevice;
use crate::drm::pssh::find_widevine_pssh;
use crate::drm::session::{ContentKey, LicenseSession};
use crate::error::{Error, Result};
use crate::media::{MediaDescriptor, Protection};

/// Bytes of ffmpeg's stderr kept in error messages.
const STDERR_TAIL: usize = 500;

/// Turns a protected descriptor into a decrypted file on disk.
#[derive(Debug, Clone)]
pub struct DecryptionPipeline {
    api: OnlyFansApi,
    device: Option<Arc<WidevineDevice>>,
    ffmpeg: PathBuf,
}

impl DecryptionPipeline {
    pub fn new(api: OnlyFansApi, device: Option<Arc<WidevineDevice>>, ffmpeg: PathBuf) -> Self {
        Self {
            api,
            device,
            ffmpeg,
        }
    }

    /// Decrypt one item into `output`. The caller writes the completion marker.
    pub async fn decrypt(
        &self,
        item: &MediaDescriptor,
        protection: &Protection,
        output: &Path,
    ) -> Result<()> {
        let device = self.device.as_deref().ok_or_else(|| {
            Error::License(format!(
                "media {} is protected but no Widevine device is configured",
                item.media_id
            ))
        })?;

        let cookie = protection.cookie_header();
        let manifest = self
            .api
            .download(&protection.manifest_url, Some(&cookie))
            .await?
            .text()
            .await?;
        tracing::debug!(
            "Fetched manifest for media {} ({} bytes)",
            item.media_id,
            manifest.len()
        );

        let pssh = find_widevine_pssh(&manifest)?;
        let key = self.content_key(device, item, &pssh.data).await?;
        tracing::debug!(
            "Media {}: using content key {}",
            item.media_id,
            key.key_id_hex()
        );

        self.run_ffmpeg(&key, &cookie, &protection.manifest_url, output)
            .await
    }

    /// License exchange for one PSSH payload; returns the first content key.
    async fn content_key(
        &self,
        device: &WidevineDevice,
        item: &MediaDescriptor,
        init_data: &[u8],
    ) -> Result<ContentKey> {
        let mut session = LicenseSession::new(device, init_data);
        let challenge = session.license_request()?;

        let license = self
            .api
            .request_license(item.media_id, item.post_id, challenge)
            .await?;

        session
            .parse_license(&license)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::License("license contains no content keys".into()))
    }

    async fn run_ffmpeg(
        &self,
        key: &ContentKey,
        cookie: &str,
        manifest_url: &str,
        output: &Path,
    ) -> Result<()> {
        let args = ffmpeg_args(&key.key_hex(), cookie, manifest_url, output)?;

        let result = Command::new(&self.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::FFmpegNotFound
                } else {
                    Error::FFmpeg(format!("Failed to run ffmpeg: {}", e))
                }
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let skip = stderr.chars().count().saturating_sub(STDERR_TAIL);
            return Err(Error::FFmpeg(format!(
                "ffmpeg exited with status {}: {}",
                result.status,
                stderr.chars().skip(skip).collect::<String>().trim()
            )));
        }

        let size = tokio::fs::metadata(output).await.map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            return Err(Error::FFmpeg(format!(
                "ffmpeg produced no output at {}",
                output.display()
            )));
        }

        Ok(())
    }
}

/// Argument list for a cenc decryption + remux.
pub fn ffmpeg_args(
    key_hex: &str,
    cookie: &str,
    manifest_url: &str,
    output: &Path,
) -> Result<Vec<String>> {
    let output = output
        .to_str()
        .ok_or_else(|| Error::FFmpeg("Invalid path encoding for output".into()))?;

    Ok(vec![
        "-y".into(),
        "-loglevel".into(),
        "error".into(),
        "-cenc_decryption_key".into(),
        key_hex.into(),
        "-headers".into(),
        format!("Cookie: {}\r\n", cookie),
        "-i".into(),
        manifest_url.into(),
        "-codec".into(),
        "copy".into(),
        output.into(),
    ])
}
