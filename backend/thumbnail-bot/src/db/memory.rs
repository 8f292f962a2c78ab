//! In-process thumbnail store for tests

use super::thumbnail_store::ThumbnailStore;
use crate::error::Result;
use crate::models::{UserId, UserThumbnailPreference};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

#[derive(Default)]
pub struct InMemoryThumbnailStore {
    records: DashMap<UserId, UserThumbnailPreference>,
}

impl InMemoryThumbnailStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records, including ones whose thumbnail was cleared
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ThumbnailStore for InMemoryThumbnailStore {
    async fn get(&self, user_id: UserId) -> Result<Option<UserThumbnailPreference>> {
        Ok(self.records.get(&user_id).map(|entry| entry.value().clone()))
    }

    async fn set(&self, user_id: UserId, thumbnail_reference: &str) -> Result<()> {
        let now = Some(Utc::now());
        self.records
            .entry(user_id)
            .and_modify(|record| {
                record.thumbnail_path = Some(thumbnail_reference.to_string());
                record.updated_at = now;
            })
            .or_insert_with(|| UserThumbnailPreference {
                user_id: user_id.0,
                thumbnail_path: Some(thumbnail_reference.to_string()),
                updated_at: now,
            });
        Ok(())
    }

    async fn clear(&self, user_id: UserId) -> Result<()> {
        if let Some(mut record) = self.records.get_mut(&user_id) {
            if record.thumbnail_path.take().is_some() {
                record.updated_at = Some(Utc::now());
            }
        }
        Ok(())
    }
}
