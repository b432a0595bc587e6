//! Lifecycle service for vanish records.
//!
//! Owns the create/read/purge orchestration: blob uploads happen before
//! anything is persisted, expiry is enforced lazily on the read path, and
//! one-time records are deleted in the same locked section that read them,
//! so two concurrent readers can never both observe a live one-time record.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use vink_store::{ContentKind, Database, NewAttachment, NewVanish, StoreError, Vanish};

use crate::blob_store::BlobStore;
use crate::error::ServerError;
use crate::expiry;
use crate::ident;

/// Injectable time source so expiry behavior is deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// How many freshly generated public ids to try before giving up on a
/// uniqueness collision.
const MAX_ID_ATTEMPTS: u32 = 5;

/// Input for creating a vanish record.
#[derive(Debug, Default)]
pub struct CreateVanish {
    pub title: Option<String>,
    /// Inline text or code.
    pub content: Option<String>,
    /// Expiry directive ("never", "30m", "1h", ...); absent means the
    /// default of one hour.
    pub expiry_directive: Option<String>,
    pub is_one_time: bool,
    /// Uploaded files, in upload order.
    pub files: Vec<UploadedFile>,
}

/// One uploaded file as received from the transport layer.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Read-side view of a record, captured before any one-time deletion.
///
/// Field names match what the web frontend reads; `file_url` and
/// `original_file_name` flatten the first attachment for single-file
/// clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VanishSnapshot {
    pub public_id: String,
    pub title: Option<String>,
    pub content: String,
    pub content_type: ContentKind,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_one_time: bool,
    pub files: Vec<AttachmentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_file_name: Option<String>,
}

/// One attachment as exposed to readers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentView {
    pub original_file_name: String,
    pub file_url: String,
    pub file_size: i64,
    pub file_type: Option<String>,
}

pub struct VanishService {
    db: Arc<Mutex<Database>>,
    blobs: Arc<BlobStore>,
    clock: Arc<dyn Clock>,
}

impl VanishService {
    pub fn new(db: Arc<Mutex<Database>>, blobs: Arc<BlobStore>, clock: Arc<dyn Clock>) -> Self {
        Self { db, blobs, clock }
    }

    /// Create a record and return its public id.
    ///
    /// All blob uploads complete before the record is persisted; any upload
    /// failure aborts the whole creation and nothing is stored.  A create
    /// with neither text nor files still produces an empty TEXT record.
    pub async fn create(&self, input: CreateVanish) -> Result<String, ServerError> {
        let now = self.clock.now();

        let files: Vec<&UploadedFile> =
            input.files.iter().filter(|f| !f.data.is_empty()).collect();

        let mut attachments = Vec::with_capacity(files.len());
        for file in &files {
            let stored = self
                .blobs
                .store(&file.data, file.content_type.as_deref())
                .await?;
            attachments.push(NewAttachment {
                original_file_name: file.file_name.clone(),
                file_url: stored.url,
                file_size: stored.size as i64,
                file_type: file.content_type.clone(),
            });
        }

        let (content_kind, content) = if let Some(first) = attachments.first() {
            let kind = if files.len() == 1
                && files[0]
                    .content_type
                    .as_deref()
                    .is_some_and(|t| t.starts_with("image/"))
            {
                ContentKind::Image
            } else {
                ContentKind::File
            };
            (kind, first.original_file_name.clone())
        } else {
            let text = input
                .content
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_default();
            (ContentKind::Text, text)
        };

        let directive = input
            .expiry_directive
            .as_deref()
            .unwrap_or(expiry::DEFAULT_DIRECTIVE);
        let expires_at = expiry::compute(directive, now);

        let file_url = attachments.first().map(|a| a.file_url.clone());

        let mut db = self.db.lock().await;
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let new = NewVanish {
                public_id: ident::generate(),
                title: input.title.clone(),
                content: content.clone(),
                content_kind,
                file_url: file_url.clone(),
                is_one_time: input.is_one_time,
                expires_at,
                attachments: attachments.clone(),
            };

            match db.insert_vanish(&new, now) {
                Ok(vanish) => {
                    debug!(
                        public_id = %vanish.public_id,
                        kind = vanish.content_kind.as_str(),
                        one_time = vanish.is_one_time,
                        "created vanish"
                    );
                    return Ok(vanish.public_id);
                }
                Err(StoreError::DuplicatePublicId(id)) => {
                    warn!(public_id = %id, attempt, "public id collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ServerError::Internal(
            "could not assign a unique public id".to_string(),
        ))
    }

    /// Fetch a record by public id, enforcing expiry and one-time semantics.
    ///
    /// Returns `None` uniformly for missing, expired, and already-consumed
    /// records.  The store lock is held across the fetch, the checks, and
    /// the delete, so no other reader (or the reaper) can observe the record
    /// between its check and its deletion.
    pub async fn read(&self, public_id: &str) -> Result<Option<VanishSnapshot>, ServerError> {
        let now = self.clock.now();
        let db = self.db.lock().await;

        let Some(vanish) = db.get_vanish_by_public_id(public_id)? else {
            return Ok(None);
        };

        if let Some(expires_at) = vanish.expires_at {
            if expires_at < now {
                // Lazy expiry: an expired record reads as never-existed.
                db.delete_vanish(vanish.id)?;
                debug!(public_id, "deleted expired vanish on read");
                return Ok(None);
            }
        }

        let snapshot = snapshot_of(&vanish);

        if vanish.is_one_time {
            db.delete_vanish(vanish.id)?;
            debug!(public_id, "consumed one-time vanish");
        }

        Ok(Some(snapshot))
    }

    /// Bulk-purge every record whose expiry has passed.
    ///
    /// Called only by the background reaper; the read path deletes expired
    /// records lazily on its own.
    pub async fn purge_expired(&self) -> Result<usize, ServerError> {
        let now = self.clock.now();
        let db = self.db.lock().await;
        Ok(db.delete_expired_before(now)?)
    }
}

fn snapshot_of(vanish: &Vanish) -> VanishSnapshot {
    let first = vanish.attachments.first();
    VanishSnapshot {
        public_id: vanish.public_id.clone(),
        title: vanish.title.clone(),
        content: vanish.content.clone(),
        content_type: vanish.content_kind,
        created_at: vanish.created_at,
        expires_at: vanish.expires_at,
        is_one_time: vanish.is_one_time,
        files: vanish
            .attachments
            .iter()
            .map(|a| AttachmentView {
                original_file_name: a.original_file_name.clone(),
                file_url: a.file_url.clone(),
                file_size: a.file_size,
                file_type: a.file_type.clone(),
            })
            .collect(),
        file_url: first
            .map(|a| a.file_url.clone())
            .or_else(|| vanish.file_url.clone()),
        original_file_name: first.map(|a| a.original_file_name.clone()),
    }
}
