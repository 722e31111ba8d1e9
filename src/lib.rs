pub mod api;
pub mod config;
pub mod crypto;
pub mod error;
pub mod mapping;
pub mod tracker;
pub mod transport;
pub mod types;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::api::MangaPlusClient;
    pub use crate::config::{Config, KomgaCredentials, TrackedManga};
    pub use crate::crypto::{decode_image, EncryptionKey};
    pub use crate::error::{ApiError, ConfigError, DecodeError, MappingError, PayloadKind};
    pub use crate::tracker::{SyncReport, SyncSummary, Tracker};
    pub use crate::transport::{Request, Response, Transport};
    pub use crate::types::{Chapter, ChapterListEntry, ChapterPage, ImageQuality, Manga, Title};
}
