//! Profile lookups and counters consumed by the tenant router.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::profile::{ProfileRow, ProfileViewRow};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Profile store unavailable: {0}")]
    Unavailable(String),
}

/// Visitor details captured with each profile view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewMeta {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

/// Carried in `AppState` as `Arc<dyn ProfileStore>`.
/// Lookups only return published profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn profile_by_slug(&self, slug: &str) -> Result<Option<ProfileRow>, StoreError>;
    async fn profile_by_domain(&self, host: &str) -> Result<Option<ProfileRow>, StoreError>;
    async fn increment_view_count(&self, profile_id: Uuid) -> Result<(), StoreError>;
    async fn increment_download_count(&self, profile_id: Uuid) -> Result<(), StoreError>;
    async fn record_profile_view(&self, profile_id: Uuid, meta: &ViewMeta)
        -> Result<(), StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL
// ────────────────────────────────────────────────────────────────────────────

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn profile_by_slug(&self, slug: &str) -> Result<Option<ProfileRow>, StoreError> {
        Ok(sqlx::query_as::<_, ProfileRow>(
            "SELECT * FROM profiles WHERE slug = $1 AND is_published = TRUE",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn profile_by_domain(&self, host: &str) -> Result<Option<ProfileRow>, StoreError> {
        Ok(sqlx::query_as::<_, ProfileRow>(
            "SELECT * FROM profiles WHERE LOWER(custom_domain) = LOWER($1) AND is_published = TRUE",
        )
        .bind(host)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn increment_view_count(&self, profile_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE profiles SET view_count = view_count + 1 WHERE id = $1")
            .bind(profile_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn increment_download_count(&self, profile_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE profiles SET download_count = download_count + 1 WHERE id = $1")
            .bind(profile_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn record_profile_view(
        &self,
        profile_id: Uuid,
        meta: &ViewMeta,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO profile_views (id, profile_id, ip, user_agent, referrer)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(profile_id)
        .bind(&meta.ip)
        .bind(&meta.user_agent)
        .bind(&meta.referrer)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory
// ────────────────────────────────────────────────────────────────────────────

/// Store used by tests and by local runs without a database.
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<Vec<ProfileRow>>,
    views: Mutex<Vec<ProfileViewRow>>,
    fail_writes: bool,
}

impl MemoryProfileStore {
    pub fn new(profiles: Vec<ProfileRow>) -> Self {
        Self {
            profiles: Mutex::new(profiles),
            ..Default::default()
        }
    }

    /// Reads succeed, every write fails.
    #[cfg(test)]
    pub fn with_failing_writes(profiles: Vec<ProfileRow>) -> Self {
        Self {
            fail_writes: true,
            ..Self::new(profiles)
        }
    }

    #[cfg(test)]
    pub fn profile(&self, id: Uuid) -> Option<ProfileRow> {
        self.lock_profiles().iter().find(|p| p.id == id).cloned()
    }

    #[cfg(test)]
    pub fn views(&self) -> Vec<ProfileViewRow> {
        self.views.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn lock_profiles(&self) -> std::sync::MutexGuard<'_, Vec<ProfileRow>> {
        self.profiles.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn find_published<F>(&self, pred: F) -> Option<ProfileRow>
    where
        F: Fn(&ProfileRow) -> bool,
    {
        self.lock_profiles()
            .iter()
            .find(|p| p.is_published && pred(p))
            .cloned()
    }

    fn update<F>(&self, profile_id: Uuid, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut ProfileRow),
    {
        if self.fail_writes {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        if let Some(profile) = self.lock_profiles().iter_mut().find(|p| p.id == profile_id) {
            apply(profile);
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn profile_by_slug(&self, slug: &str) -> Result<Option<ProfileRow>, StoreError> {
        Ok(self.find_published(|p| p.slug == slug))
    }

    async fn profile_by_domain(&self, host: &str) -> Result<Option<ProfileRow>, StoreError> {
        Ok(self.find_published(|p| {
            p.custom_domain
                .as_deref()
                .is_some_and(|d| d.eq_ignore_ascii_case(host))
        }))
    }

    async fn increment_view_count(&self, profile_id: Uuid) -> Result<(), StoreError> {
        self.update(profile_id, |p| p.view_count += 1)
    }

    async fn increment_download_count(&self, profile_id: Uuid) -> Result<(), StoreError> {
        self.update(profile_id, |p| p.download_count += 1)
    }

    async fn record_profile_view(
        &self,
        profile_id: Uuid,
        meta: &ViewMeta,
    ) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        self.views
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ProfileViewRow {
                id: Uuid::new_v4(),
                profile_id,
                ip: meta.ip.clone(),
                user_agent: meta.user_agent.clone(),
                referrer: meta.referrer.clone(),
                viewed_at: Utc::now(),
            });
        Ok(())
    }
}
