//! Background reaper for expired records.
//!
//! Storage hygiene only: the read path already hides and deletes expired
//! records lazily, so correctness never depends on this task running.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::service::VanishService;

/// Spawn the recurring purge task.
///
/// A failed run is logged and swallowed; it never propagates into request
/// handling and never prevents the next scheduled run.
pub fn spawn(service: Arc<VanishService>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(period_secs = period.as_secs(), "reaper started");

        loop {
            ticker.tick().await;
            match service.purge_expired().await {
                Ok(0) => {}
                Ok(deleted) => info!(deleted, "purged expired vanishes"),
                Err(e) => error!(error = %e, "expired vanish purge failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob_store::BlobStore;
    use crate::service::SystemClock;
    use chrono::Utc;
    use tempfile::TempDir;
    use tokio::sync::Mutex;
    use vink_store::{ContentKind, Database, NewVanish};

    #[tokio::test(start_paused = true)]
    async fn reaper_purges_expired_records() {
        let dir = TempDir::new().unwrap();
        let db = Arc::new(Mutex::new(
            Database::open_at(&dir.path().join("test.db")).unwrap(),
        ));
        let blobs = Arc::new(
            BlobStore::new(
                dir.path().join("blobs"),
                "http://localhost:8080".to_string(),
                1024,
            )
            .await
            .unwrap(),
        );
        let service = Arc::new(VanishService::new(
            db.clone(),
            blobs,
            Arc::new(SystemClock),
        ));

        let now = Utc::now();
        db.lock()
            .await
            .insert_vanish(
                &NewVanish {
                    public_id: "expired1".to_string(),
                    title: None,
                    content: "old".to_string(),
                    content_kind: ContentKind::Text,
                    file_url: None,
                    is_one_time: false,
                    expires_at: Some(now - chrono::Duration::hours(1)),
                    attachments: Vec::new(),
                },
                now,
            )
            .unwrap();

        let handle = spawn(service, Duration::from_secs(3600));

        // The first tick fires immediately; give the task a chance to run it.
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(db
            .lock()
            .await
            .get_vanish_by_public_id("expired1")
            .unwrap()
            .is_none());

        handle.abort();
    }
}
