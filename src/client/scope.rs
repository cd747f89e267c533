use std::sync::Arc;

use tokio::sync::watch;

use crate::client::error::ClientResult;
use crate::client::state::LocalStore;
use crate::shared::scope::ClinicScope;

/// Selected clinic, persisted under `clinicScope` and broadcast to subscribers.
///
/// Views holding a receiver refetch when the selection changes.
pub struct ClinicScopeStore {
    local: Arc<LocalStore>,
    tx: watch::Sender<ClinicScope>,
}

impl ClinicScopeStore {
    /// Restore the last selection; unknown values fall back to all clinics
    pub async fn load(local: Arc<LocalStore>) -> Self {
        let scope = match local.snapshot().await.clinic_scope {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("{}; using all clinics", e);
                ClinicScope::All
            }),
            None => ClinicScope::All,
        };
        let (tx, _) = watch::channel(scope);
        Self { local, tx }
    }

    pub fn current(&self) -> ClinicScope {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ClinicScope> {
        self.tx.subscribe()
    }

    pub async fn select(&self, scope: ClinicScope) -> ClientResult<()> {
        self.local
            .update(|s| s.clinic_scope = Some(scope.to_string()))
            .await?;
        self.tx.send_replace(scope);
        tracing::info!("Clinic scope set to {}", scope);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_select_persists_and_broadcasts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        let local = Arc::new(LocalStore::open(&path).await.unwrap());
        let store = ClinicScopeStore::load(Arc::clone(&local)).await;
        assert_eq!(store.current(), ClinicScope::All);

        let mut rx = store.subscribe();
        let clinic = Uuid::new_v4();
        store.select(ClinicScope::Clinic(clinic)).await.unwrap();

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), ClinicScope::Clinic(clinic));

        let reopened = Arc::new(LocalStore::open(&path).await.unwrap());
        let restored = ClinicScopeStore::load(reopened).await;
        assert_eq!(restored.current().clinic_id(), Some(clinic));
    }

    #[tokio::test]
    async fn test_failed_select_changes_nothing() {
        let dir = tempdir().unwrap();
        let local = Arc::new(
            LocalStore::open(dir.path().join("sub").join("state.json"))
                .await
                .unwrap(),
        );
        let store = ClinicScopeStore::load(Arc::clone(&local)).await;
        let rx = store.subscribe();
        std::fs::write(dir.path().join("sub"), b"").unwrap();

        assert!(store.select(ClinicScope::Clinic(Uuid::new_v4())).await.is_err());
        assert!(store.current().is_all());
        assert!(!rx.has_changed().unwrap());
        assert!(local.snapshot().await.clinic_scope.is_none());
    }

    #[tokio::test]
    async fn test_unknown_value_falls_back_to_all() {
        let dir = tempdir().unwrap();
        let local = Arc::new(LocalStore::open(dir.path().join("state.json")).await.unwrap());
        local
            .update(|s| s.clinic_scope = Some("downtown".to_string()))
            .await
            .unwrap();

        let store = ClinicScopeStore::load(local).await;
        assert!(store.current().is_all());
    }
}
