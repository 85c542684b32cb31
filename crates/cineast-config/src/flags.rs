//! Client-side flags: which movies this client already rated or reviewed,
//! and whether the user accepted the storage notice.
//!
//! Reviewed flags expire; an expired flag reads as absent and is dropped on save.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use cineast_models::Score;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReviewedFlag {
    pub expires_at: DateTime<Utc>,
    pub score: Score,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct FlagsData {
    #[serde(default)]
    consent: bool,
    /// keyed by imdbID
    #[serde(default)]
    reviewed: BTreeMap<String, ReviewedFlag>,
}

pub struct FlagStore {
    path: PathBuf,
    data: FlagsData,
}

impl FlagStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: FlagsData::default(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            self.data = toml::from_str(&content)?;
        }
        Ok(())
    }

    pub fn save(&mut self) -> Result<()> {
        self.prune_expired(Utc::now());
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&self.data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    /// The live flag for a movie, if any
    pub fn reviewed(&self, movie_id: &str, now: DateTime<Utc>) -> Option<ReviewedFlag> {
        self.data
            .reviewed
            .get(movie_id)
            .filter(|flag| flag.expires_at > now)
            .copied()
    }

    pub fn is_reviewed(&self, movie_id: &str, now: DateTime<Utc>) -> bool {
        self.reviewed(movie_id, now).is_some()
    }

    pub fn mark_reviewed(&mut self, movie_id: &str, score: Score, now: DateTime<Utc>, ttl: Duration) {
        let expires_at = now + ttl;
        debug!("Flagging {} as reviewed until {}", movie_id, expires_at);
        self.data
            .reviewed
            .insert(movie_id.to_string(), ReviewedFlag { expires_at, score });
    }

    pub fn reviewed_until(&self, movie_id: &str) -> Option<DateTime<Utc>> {
        self.data.reviewed.get(movie_id).map(|flag| flag.expires_at)
    }

    /// Remove expired flags, returning how many were dropped
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.data.reviewed.len();
        self.data.reviewed.retain(|_, flag| flag.expires_at > now);
        before - self.data.reviewed.len()
    }

    pub fn clear_reviewed(&mut self) -> usize {
        let count = self.data.reviewed.len();
        self.data.reviewed.clear();
        count
    }

    pub fn has_consent(&self) -> bool {
        self.data.consent
    }

    pub fn set_consent(&mut self, consent: bool) {
        self.data.consent = consent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn score(value: u8) -> Score {
        Score::new(value).unwrap()
    }

    #[test]
    fn test_reviewed_flag_expires() {
        let mut store = FlagStore::new(PathBuf::from("/tmp/cineast-flags-test"));
        let now = Utc::now();
        store.mark_reviewed("tt1", score(3), now, Duration::hours(24));
        assert_eq!(store.reviewed("tt1", now).map(|f| f.score), Some(score(3)));

        assert!(store.is_reviewed("tt1", now));
        assert!(store.is_reviewed("tt1", now + Duration::hours(23)));
        assert!(!store.is_reviewed("tt1", now + Duration::hours(24)));
        assert!(!store.is_reviewed("tt2", now));
    }

    #[test]
    fn test_save_drops_expired_flags() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();
        let now = Utc::now();

        let mut store = FlagStore::new(path.clone());
        store.mark_reviewed("fresh", score(4), now, Duration::hours(24));
        store.mark_reviewed("stale", score(1), now - Duration::hours(48), Duration::hours(24));
        store.set_consent(true);
        store.save().unwrap();

        let mut loaded = FlagStore::new(path);
        loaded.load().unwrap();
        assert!(loaded.has_consent());
        assert!(loaded.reviewed_until("fresh").is_some());
        assert!(loaded.reviewed_until("stale").is_none());
    }

    #[test]
    fn test_clear_reviewed() {
        let mut store = FlagStore::new(PathBuf::from("/tmp/cineast-flags-clear"));
        let now = Utc::now();
        store.mark_reviewed("a", score(2), now, Duration::hours(1));
        store.mark_reviewed("b", score(2), now, Duration::hours(1));
        assert_eq!(store.clear_reviewed(), 2);
        assert!(!store.is_reviewed("a", now));
    }
}
