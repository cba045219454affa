//! Widevine-protected media.
//!
//! This module provides:
//! - PSSH box parsing and manifest scanning
//! - Device credential loading
//! - The license session (challenge and key unwrapping)
//! - The decryption pipeline that drives ffmpeg

pub mod decrypt;
pub mod device;
pub mod protocol;
pub mod pssh;
pub mod session;

pub use decrypt::{ffmpeg_args, DecryptionPipeline};
pub use device::WidevineDevice;
pub use pssh::{find_widevine_pssh, PsshBox, WIDEVINE_SYSTEM_ID};
pub use session::{ContentKey, LicenseSession};
