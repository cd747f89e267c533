//! Small JSON file holding what a browser would keep in local storage.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::client::error::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

/// Persisted keys: `token`, `clinicScope`, `themeMode`, `hasVisitedBefore`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_mode: Option<ThemeMode>,
    #[serde(default)]
    pub has_visited_before: bool,
}

/// File-backed store; every update is written through
pub struct LocalStore {
    path: PathBuf,
    state: Mutex<PersistedState>,
}

impl LocalStore {
    /// Load the state file. A missing or unreadable file starts empty.
    pub async fn open(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref().to_path_buf();

        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!("Ignoring corrupt state file {}: {}", path.display(), e);
                PersistedState::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => PersistedState::default(),
            Err(e) => {
                return Err(ClientError::State(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn snapshot(&self) -> PersistedState {
        self.state.lock().await.clone()
    }

    /// Apply `change` and persist the result. Memory only moves once the
    /// file is replaced.
    pub async fn update<F>(&self, change: F) -> ClientResult<()>
    where
        F: FnOnce(&mut PersistedState),
    {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        change(&mut next);

        self.persist(&next).await?;
        *state = next;
        Ok(())
    }

    async fn persist(&self, state: &PersistedState) -> ClientResult<()> {
        let body = serde_json::to_vec_pretty(state)
            .map_err(|e| ClientError::State(format!("Failed to encode state: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    ClientError::State(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        // Write then rename so a crash never leaves half a file behind
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| ClientError::State(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            ClientError::State(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;

        Ok(())
    }

    pub async fn theme_mode(&self) -> ThemeMode {
        self.state.lock().await.theme_mode.unwrap_or_default()
    }

    pub async fn set_theme_mode(&self, mode: ThemeMode) -> ClientResult<()> {
        self.update(|s| s.theme_mode = Some(mode)).await
    }

    /// True on the first call for this state file, false afterwards
    pub async fn mark_visited(&self) -> ClientResult<bool> {
        let first = !self.state.lock().await.has_visited_before;
        if first {
            self.update(|s| s.has_visited_before = true).await?;
        }
        Ok(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("state.json")).await.unwrap();
        assert_eq!(store.snapshot().await, PersistedState::default());
    }

    #[tokio::test]
    async fn test_keys_are_persisted_in_camel_case() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let store = LocalStore::open(&path).await.unwrap();

        store
            .update(|s| {
                s.token = Some("abc".to_string());
                s.clinic_scope = Some("all".to_string());
            })
            .await
            .unwrap();
        store.set_theme_mode(ThemeMode::Dark).await.unwrap();
        assert!(store.mark_visited().await.unwrap());
        assert!(!store.mark_visited().await.unwrap());

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["token"], "abc");
        assert_eq!(raw["clinicScope"], "all");
        assert_eq!(raw["themeMode"], "dark");
        assert_eq!(raw["hasVisitedBefore"], true);

        let reopened = LocalStore::open(&path).await.unwrap();
        assert_eq!(reopened.theme_mode().await, ThemeMode::Dark);
        assert_eq!(reopened.snapshot().await.token.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_state() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("sub").join("state.json"))
            .await
            .unwrap();
        // a plain file where the state directory should go
        std::fs::write(dir.path().join("sub"), b"").unwrap();

        let result = store.update(|s| s.clinic_scope = Some("all".to_string())).await;
        assert!(matches!(result, Err(ClientError::State(_))));
        assert_eq!(store.snapshot().await, PersistedState::default());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store = LocalStore::open(&path).await.unwrap();
        assert!(store.snapshot().await.token.is_none());
    }
}
