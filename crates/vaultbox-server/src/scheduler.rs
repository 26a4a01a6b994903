//! Periodic background work: the inactivity sweep and expired-entry purge.
//!
//! The scheduler is created and started by the composition root and stopped
//! through its [`SchedulerHandle`].

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use vaultbox_core::db::unix_timestamp;

use crate::emergency::EmergencyAccessService;
use crate::vault::VaultService;

pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

pub struct Scheduler {
    emergency: EmergencyAccessService,
    vault: VaultService,
    interval: Duration,
}

/// Running scheduler task.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Scheduler {
    pub const fn new(
        emergency: EmergencyAccessService,
        vault: VaultService,
        interval: Duration,
    ) -> Self {
        Self {
            emergency,
            vault,
            interval,
        }
    }

    /// Spawn the periodic task. The first run happens one interval after
    /// start.
    pub fn start(self) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut timer = tokio::time::interval(self.interval);
            timer.tick().await; // Skip first immediate tick
            info!(interval_secs = self.interval.as_secs(), "Scheduler started");

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        self.run_once(unix_timestamp()).await;
                    }
                    _ = shutdown_rx.changed() => {
                        info!("Scheduler shutting down");
                        return;
                    }
                }
            }
        });

        SchedulerHandle {
            shutdown: shutdown_tx,
            task,
        }
    }

    /// One pass: sweep trusted contacts, then purge expired entries.
    /// Failures are logged; the next tick tries again.
    pub async fn run_once(&self, now: i64) {
        match self.emergency.check_inactive_users(now).await {
            Ok(report) => {
                if report.granted > 0 {
                    info!(granted = report.granted, "Emergency access granted to inactive owners' contacts");
                }
            }
            Err(e) => warn!(error = %e, "Inactivity sweep failed"),
        }

        if let Err(e) = self.vault.purge_expired(now).await {
            warn!(error = %e, "Expired entry purge failed");
        }
    }
}

impl SchedulerHandle {
    /// Signal the task to stop and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Scheduler task ended abnormally");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::email::RecordingMailer;
    use crate::emergency::AccessPolicy;
    use crate::notifications::NotificationService;
    use crate::storage::{ContentType, EntryCategory, NewVaultEntry, VaultDatabase, Visibility};

    async fn scheduler(interval: Duration) -> (Scheduler, VaultDatabase) {
        let db = VaultDatabase::open_in_memory().await.unwrap();
        db.create_user("u-alice", "alice@example.com", "h").await.unwrap();
        db.create_user("u-bob", "bob@example.com", "h").await.unwrap();
        db.insert_trusted_contact("tc", "u-alice", "bob@example.com", 2)
            .await
            .unwrap();
        db.set_user_last_active("u-alice", unix_timestamp() - 5 * 86_400)
            .await
            .unwrap();

        let emergency = EmergencyAccessService::new(
            db.clone(),
            NotificationService::new(db.clone()),
            Arc::new(RecordingMailer::new()),
            AccessPolicy::default(),
        );
        let vault = VaultService::new(db.clone());
        (Scheduler::new(emergency, vault, interval), db)
    }

    #[tokio::test]
    async fn run_once_sweeps_and_purges() {
        let (scheduler, db) = scheduler(DEFAULT_SWEEP_INTERVAL).await;
        let now = unix_timestamp();
        db.insert_vault_entry(&NewVaultEntry {
            id: "expired",
            user_id: "u-alice",
            title: "old",
            category: EntryCategory::Notes,
            encrypted_content: "eA==",
            content_type: ContentType::Text,
            file: None,
            visibility: Visibility::Private,
            auto_delete_at: Some(now - 1),
            unlock_after: None,
        })
        .await
        .unwrap();

        scheduler.run_once(now).await;

        assert!(db.get_trusted_contact("tc").await.unwrap().is_unlock_active);
        assert!(db.list_vault_entries("u-alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn started_scheduler_runs_on_its_interval() {
        let (scheduler, db) = scheduler(Duration::from_millis(20)).await;
        let handle = scheduler.start();

        let mut unlocked = false;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if db.get_trusted_contact("tc").await.unwrap().is_unlock_active {
                unlocked = true;
                break;
            }
        }
        handle.shutdown().await;
        assert!(unlocked);
    }

    #[tokio::test]
    async fn shutdown_does_not_wait_for_next_tick() {
        let (scheduler, db) = scheduler(DEFAULT_SWEEP_INTERVAL).await;
        let handle = scheduler.start();

        tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
            .await
            .unwrap();
        assert!(!db.get_trusted_contact("tc").await.unwrap().is_unlock_active);
    }
}
