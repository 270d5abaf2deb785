use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A user's public profile. `slug` routes `{slug}.{main_domain}`,
/// `custom_domain` routes a host the user owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub slug: String,
    pub display_name: String,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub is_published: bool,
    pub view_count: i64,
    pub download_count: i64,
    pub custom_domain: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub theme: Option<String>,
    /// `[{company, role, start, end, summary}]`
    pub work_history: Value,
    /// `[{name, description, url}]`
    pub projects: Value,
    /// `[{label, url}]`
    pub links: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What anonymous visitors receive: the page shell's inline data and
/// `GET /api/profiles/:slug`. Internal ids, counters and publication state
/// stay server-side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub slug: String,
    pub display_name: String,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub custom_domain: Option<String>,
    pub theme: Option<String>,
    pub work_history: Value,
    pub projects: Value,
    pub links: Value,
    pub updated_at: DateTime<Utc>,
}

impl From<&ProfileRow> for PublicProfile {
    fn from(row: &ProfileRow) -> Self {
        Self {
            slug: row.slug.clone(),
            display_name: row.display_name.clone(),
            headline: row.headline.clone(),
            bio: row.bio.clone(),
            avatar_url: row.avatar_url.clone(),
            location: row.location.clone(),
            custom_domain: row.custom_domain.clone(),
            theme: row.theme.clone(),
            work_history: row.work_history.clone(),
            projects: row.projects.clone(),
            links: row.links.clone(),
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileViewRow {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub viewed_at: DateTime<Utc>,
}
