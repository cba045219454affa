//! Media handling module.

pub mod extract;
pub mod item;

pub use extract::{extract_media, resolve_source};
pub use item::{MediaDescriptor, MediaKind, MediaSource, Protection};
