//! Domain model structs persisted in the SQLite database.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to the API layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ContentKind
// ---------------------------------------------------------------------------

/// What a vanish record carries: inline text, an image, or an arbitrary file.
///
/// IMAGE and FILE are both blob-backed; TEXT is stored inline in `content`.
/// Serialized in uppercase both in SQLite and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentKind {
    Text,
    Image,
    File,
}

impl ContentKind {
    /// Stable string form used as the SQLite column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "TEXT",
            ContentKind::Image => "IMAGE",
            ContentKind::File => "FILE",
        }
    }

    /// Parse the SQLite column value back into the enum.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TEXT" => Some(ContentKind::Text),
            "IMAGE" => Some(ContentKind::Image),
            "FILE" => Some(ContentKind::File),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Vanish
// ---------------------------------------------------------------------------

/// A persisted vanish record.
///
/// `id` is the store-internal row id and is never exposed through the API;
/// readers address records by `public_id` only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vanish {
    /// Internal SQLite row id.
    pub id: i64,
    /// Short opaque external identifier, unique, assigned once at insert.
    pub public_id: String,
    /// Optional user-supplied title.
    pub title: Option<String>,
    /// Inline text for TEXT records; display name of the primary blob
    /// for IMAGE/FILE records.
    pub content: String,
    /// What the record carries.
    pub content_kind: ContentKind,
    /// URL of the first attached blob, kept for single-file responses.
    pub file_url: Option<String>,
    /// When true the record is deleted after its first successful read.
    pub is_one_time: bool,
    /// Stamped by the store at insert time, never client-supplied.
    pub created_at: DateTime<Utc>,
    /// Absolute expiry; `None` means the record never expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Uploaded files owned by this record, in upload order.
    pub attachments: Vec<Attachment>,
}

/// Metadata for one uploaded file, owned by exactly one vanish record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    /// Internal SQLite row id.
    pub id: i64,
    /// File name as supplied by the uploader.
    pub original_file_name: String,
    /// Blob store URL where the bytes live.
    pub file_url: String,
    /// Size in bytes.
    pub file_size: i64,
    /// Declared MIME type, if any.
    pub file_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Insert inputs
// ---------------------------------------------------------------------------

/// Input for creating a vanish record.  The store assigns the internal id
/// and stamps `created_at`; everything else is caller-supplied.
#[derive(Debug, Clone)]
pub struct NewVanish {
    pub public_id: String,
    pub title: Option<String>,
    pub content: String,
    pub content_kind: ContentKind,
    pub file_url: Option<String>,
    pub is_one_time: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub attachments: Vec<NewAttachment>,
}

/// Input for one attachment row, inserted with its parent.
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub original_file_name: String,
    pub file_url: String,
    pub file_size: i64,
    pub file_type: Option<String>,
}
