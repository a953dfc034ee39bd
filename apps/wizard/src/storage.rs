use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::persist::PersistedWizard;

/// Key the persisted wizard is stored under.
pub const STORAGE_KEY: &str = "resume-wizard-storage";

/// File-backed key/value storage for the persisted wizard subset, the
/// counterpart of browser local storage.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self) -> PathBuf {
        self.dir.join(format!("{STORAGE_KEY}.json"))
    }

    /// Returns `None` when nothing was saved yet. Unreadable contents are
    /// discarded so the wizard starts fresh instead of failing.
    pub async fn load(&self) -> Result<Option<PersistedWizard>> {
        let path = self.path();
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };

        match serde_json::from_str(&raw) {
            Ok(saved) => Ok(Some(saved)),
            Err(e) => {
                warn!("Discarding unreadable wizard storage at {}: {e}", path.display());
                Ok(None)
            }
        }
    }

    pub async fn save(&self, saved: &PersistedWizard) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let path = self.path();
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(saved)?;
        tokio::fs::write(&tmp, body)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        debug!("Saved wizard state to {}", path.display());
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        remove_if_exists(&self.path()).await
    }
}

async fn remove_if_exists(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::WizardState;

    #[tokio::test]
    async fn test_load_without_save_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        assert!(storage.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_then_clear() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("nested"));

        let mut state = WizardState::new();
        state.set_job_text("A backend role working on Rust services at scale, remote-friendly.");
        storage.save(&state.to_persisted()).await.unwrap();

        let loaded = storage.load().await.unwrap().unwrap();
        assert_eq!(loaded, state.to_persisted());

        storage.clear().await.unwrap();
        assert!(storage.load().await.unwrap().is_none());
        storage.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_storage_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        tokio::fs::write(storage.path(), "{not json").await.unwrap();

        assert!(storage.load().await.unwrap().is_none());
    }
}
