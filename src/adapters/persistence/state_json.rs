//! Implements StateStore using a JSON file.
//!
//! Tracks excuses and mention tags per user. The whole document is rewritten
//! on every change.

use crate::domain::DomainError;
use crate::ports::StateStore;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// State document: user id -> flags.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct StateData {
    /// One-day excuses: user id -> the day it applies to.
    #[serde(default)]
    excused_on: HashMap<i64, NaiveDate>,
    /// Multi-day excuses: user id -> last excused day (inclusive).
    #[serde(default)]
    excused_until: HashMap<i64, NaiveDate>,
    /// user id -> "@username" or HTML user link.
    #[serde(default)]
    mentions: HashMap<i64, String>,
}

/// JSON file-based state storage.
pub struct StateJson {
    path: std::path::PathBuf,
    cache: tokio::sync::RwLock<StateData>,
}

impl StateJson {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache: tokio::sync::RwLock::new(StateData::default()),
        }
    }

    /// Load state from disk. A missing or unreadable file starts empty.
    pub async fn load(&self) -> Result<(), DomainError> {
        let data = match fs::read_to_string(&self.path).await {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "state file unreadable, starting empty");
                StateData::default()
            }),
            Err(_) => StateData::default(),
        };
        *self.cache.write().await = data;
        Ok(())
    }

    /// Atomic save: write temp file, fsync, rename over the target.
    ///
    /// Callers hold the cache write guard and pass the locked data in, so
    /// saves never overlap on the shared temp file.
    async fn save(&self, data: &StateData) -> Result<(), DomainError> {
        let json =
            serde_json::to_string_pretty(data).map_err(|e| DomainError::State(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::State(format!("create state dir: {}", e)))?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::State(format!("create temp file: {}", e)))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| DomainError::State(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::State(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| DomainError::State(format!("atomic rename failed: {}", e)))?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl StateStore for StateJson {
    async fn is_excused_today(&self, sender_id: i64, today: NaiveDate) -> Result<bool, DomainError> {
        let cache = self.cache.read().await;
        if cache.excused_on.get(&sender_id) == Some(&today) {
            return Ok(true);
        }
        Ok(cache
            .excused_until
            .get(&sender_id)
            .is_some_and(|until| today <= *until))
    }

    async fn mark_excused(&self, sender_id: i64, today: NaiveDate) -> Result<(), DomainError> {
        let mut cache = self.cache.write().await;
        cache.excused_on.insert(sender_id, today);
        self.save(&cache).await
    }

    async fn set_excused_until(&self, sender_id: i64, until: NaiveDate) -> Result<(), DomainError> {
        let mut cache = self.cache.write().await;
        cache.excused_until.insert(sender_id, until);
        self.save(&cache).await
    }

    async fn record_mention(&self, sender_id: i64, tag: &str) -> Result<(), DomainError> {
        let mut cache = self.cache.write().await;
        if cache.mentions.get(&sender_id).map(String::as_str) == Some(tag) {
            return Ok(());
        }
        cache.mentions.insert(sender_id, tag.to_string());
        self.save(&cache).await
    }

    async fn mentions(&self) -> Result<HashMap<i64, String>, DomainError> {
        Ok(self.cache.read().await.mentions.clone())
    }

    async fn cleanup_expired(&self, today: NaiveDate) -> Result<(), DomainError> {
        let mut cache = self.cache.write().await;
        let before = cache.excused_on.len() + cache.excused_until.len();
        cache.excused_on.retain(|_, day| *day == today);
        cache.excused_until.retain(|_, until| *until >= today);
        if before != cache.excused_on.len() + cache.excused_until.len() {
            self.save(&cache).await?;
        }
        Ok(())
    }
}
