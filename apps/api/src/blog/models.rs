use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A blog post in the shape served to clients, whichever source it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    /// Rendered HTML.
    pub content: String,
    pub author: String,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<String>,
    pub category: String,
    pub featured: bool,
    /// Minutes, never below 1.
    pub reading_time: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogCategory {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub post_count: u32,
}

/// Reduced post used by "related content" panels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedArticle {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub category: String,
    pub reading_time: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl From<&BlogPost> for RelatedArticle {
    fn from(post: &BlogPost) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: post.excerpt.clone(),
            category: post.category.clone(),
            reading_time: post.reading_time,
            featured_image: post.featured_image.clone(),
            published_at: post.published_at,
        }
    }
}
