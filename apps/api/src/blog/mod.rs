//! Content Retrieval Gateway: WordPress first, bundled posts when it yields nothing.
//!
//! CMS failures never reach handlers. They are logged and treated as an
//! empty result, which in turn activates the fallback content.

pub mod cache;
pub mod client;
pub mod fallback;
pub mod handlers;
pub mod models;
pub mod normalize;

use std::collections::HashSet;

use serde_json::Value;
use tracing::{info, warn};
use url::form_urlencoded;

use crate::blog::client::WordPressClient;
use crate::blog::models::{BlogCategory, BlogPost, RelatedArticle};
use crate::blog::normalize::{normalize_categories, normalize_posts};

pub const MAX_LIMIT: usize = 100;

#[derive(Clone)]
pub struct BlogGateway {
    client: Option<WordPressClient>,
}

impl BlogGateway {
    pub fn new(client: Option<WordPressClient>) -> Self {
        if client.is_none() {
            info!("WordPress not configured, blog will serve bundled content");
        }
        Self { client }
    }

    /// Gateway that never contacts a CMS.
    pub fn fallback_only() -> Self {
        Self { client: None }
    }

    /// Fetches and returns the raw body, or `Value::Null` when the CMS is
    /// absent or failed.
    async fn fetch(&self, path: &str, params: &[(&str, &str)]) -> Value {
        let Some(client) = &self.client else {
            return Value::Null;
        };
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();
        match client.fetch_json(&format!("{path}?{query}")).await {
            Ok(body) => body,
            Err(e) => {
                warn!("CMS fetch {path}?{query} failed, using fallback content: {e}");
                Value::Null
            }
        }
    }

    async fn primary_posts(&self, params: &[(&str, &str)]) -> Vec<BlogPost> {
        normalize_posts(self.fetch("/posts", params).await)
    }

    async fn primary_categories(&self) -> Vec<BlogCategory> {
        normalize_categories(self.fetch("/categories", &[("per_page", "100")]).await)
    }

    /// Recent posts, optionally restricted to a category (slug or name).
    pub async fn posts(&self, limit: usize, category: Option<&str>) -> Vec<BlogPost> {
        let limit = clamp_limit(limit);
        let per_page = limit.to_string();

        let primary = match category {
            Some(wanted) => {
                let id = self
                    .primary_categories()
                    .await
                    .into_iter()
                    .find(|c| c.slug == wanted || fallback::category_matches(&c.name, wanted))
                    .map(|c| c.id.to_string());
                match id {
                    Some(id) => {
                        self.primary_posts(&[
                            ("per_page", per_page.as_str()),
                            ("_embed", "1"),
                            ("categories", id.as_str()),
                        ])
                        .await
                    }
                    None => Vec::new(),
                }
            }
            None => {
                self.primary_posts(&[("per_page", per_page.as_str()), ("_embed", "1")])
                    .await
            }
        };

        if primary.is_empty() {
            return fallback::fallback_recent(limit, category);
        }
        primary
    }

    pub async fn post_by_slug(&self, slug: &str) -> Option<BlogPost> {
        let primary = self.primary_posts(&[("slug", slug), ("_embed", "1")]).await;
        match primary.into_iter().find(|p| p.slug == slug) {
            Some(post) => Some(post),
            None => fallback::fallback_post_by_slug(slug),
        }
    }

    pub async fn categories(&self) -> Vec<BlogCategory> {
        let primary = self.primary_categories().await;
        if primary.is_empty() {
            return fallback::fallback_categories();
        }
        primary
    }

    /// Sticky posts from the CMS, or bundled posts flagged `featured`.
    pub async fn featured(&self, limit: usize) -> Vec<BlogPost> {
        let limit = clamp_limit(limit);
        let per_page = limit.to_string();
        let mut primary = self
            .primary_posts(&[
                ("per_page", per_page.as_str()),
                ("sticky", "true"),
                ("_embed", "1"),
            ])
            .await;
        if primary.is_empty() {
            return fallback::fallback_featured(limit);
        }
        primary.truncate(limit);
        primary
    }

    pub async fn search(&self, query: &str, limit: usize) -> Vec<BlogPost> {
        let limit = clamp_limit(limit);
        let per_page = limit.to_string();
        let primary = self
            .primary_posts(&[
                ("search", query),
                ("per_page", per_page.as_str()),
                ("_embed", "1"),
            ])
            .await;
        if primary.is_empty() {
            return fallback::fallback_search(query, limit);
        }
        primary
    }

    /// Articles for the "related content" panel of `slug`: same category
    /// first, then the most recent others. `None` when the post is unknown.
    pub async fn related(&self, slug: &str, limit: usize) -> Option<Vec<RelatedArticle>> {
        let post = self.post_by_slug(slug).await?;
        let limit = clamp_limit(limit);
        let candidates = self.posts(MAX_LIMIT, None).await;
        Some(pick_related(&post, &candidates, limit))
    }
}

pub fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_LIMIT)
}

fn pick_related(post: &BlogPost, candidates: &[BlogPost], limit: usize) -> Vec<RelatedArticle> {
    let mut seen = HashSet::from([post.id]);
    let same_category = candidates.iter().filter(|c| c.category == post.category);
    let others = candidates.iter().filter(|c| c.category != post.category);

    same_category
        .chain(others)
        .filter(|c| seen.insert(c.id))
        .take(limit)
        .map(RelatedArticle::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::blog::cache::MemoryCache;
    use crate::config::WordPressConfig;
    use crate::retry::RetryPolicy;

    fn gateway_for(base_url: String) -> BlogGateway {
        let config = WordPressConfig {
            base_url,
            username: "editor".into(),
            app_password: "secret".into(),
        };
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(5),
            deadline: Duration::from_secs(2),
        };
        let client =
            WordPressClient::new(&config, Arc::new(MemoryCache::default()), policy).unwrap();
        BlogGateway::new(Some(client))
    }

    fn wp_post(id: u64, slug: &str, category: &str) -> Value {
        json!({
            "id": id,
            "slug": slug,
            "title": { "rendered": format!("Post {id}") },
            "excerpt": { "rendered": "<p>Excerpt</p>" },
            "content": { "rendered": "<p>Body</p>" },
            "date_gmt": "2024-05-01T12:00:00",
            "sticky": false,
            "_embedded": { "wp:term": [[{ "name": category, "taxonomy": "category" }], []] }
        })
    }

    #[tokio::test]
    async fn test_unreachable_cms_serves_fallback_post_by_slug() {
        // nothing listens on port 9 (discard); connection is refused
        let gateway = gateway_for("http://127.0.0.1:9/wp-json/wp/v2".into());
        let post = gateway
            .post_by_slug("build-professional-cv-gets-noticed")
            .await
            .unwrap();
        assert_eq!(
            post,
            fallback::fallback_post_by_slug("build-professional-cv-gets-noticed").unwrap()
        );
    }

    #[tokio::test]
    async fn test_unknown_slug_is_none() {
        let gateway = BlogGateway::fallback_only();
        assert!(gateway.post_by_slug("no-such-post").await.is_none());
        assert!(gateway.related("no-such-post", 3).await.is_none());
    }

    #[tokio::test]
    async fn test_empty_primary_activates_featured_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .and(query_param("sticky", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(server.uri());
        let featured = gateway.featured(2).await;
        assert_eq!(featured.len(), 2);
        assert!(featured.iter().all(|p| p.featured));
        assert_eq!(featured, fallback::fallback_featured(2));
    }

    #[tokio::test]
    async fn test_primary_content_is_not_merged_with_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([wp_post(501, "fresh", "News")])),
            )
            .mount(&server)
            .await;

        let gateway = gateway_for(server.uri());
        let posts = gateway.posts(10, None).await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, 501);
    }

    #[tokio::test]
    async fn test_category_filter_resolves_upstream_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 4, "name": "Interviews", "slug": "interviews", "count": 1 }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .and(query_param("categories", "4"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([wp_post(77, "star-method", "Interviews")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(server.uri());
        let posts = gateway.posts(5, Some("interviews")).await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "star-method");
    }

    #[tokio::test]
    async fn test_unknown_category_falls_back_to_bundled_posts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let gateway = gateway_for(server.uri());
        let posts = gateway.posts(10, Some("cv-writing")).await;
        assert_eq!(posts.len(), 2);
        assert!(posts.iter().all(|p| p.category == "CV Writing"));
    }

    #[tokio::test]
    async fn test_categories_fallback_when_cms_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let gateway = gateway_for(server.uri());
        assert_eq!(gateway.categories().await, fallback::fallback_categories());
    }

    #[tokio::test]
    async fn test_search_falls_back_to_bundled_posts() {
        let gateway = BlogGateway::fallback_only();
        let hits = gateway.search("portfolio", 10).await;
        assert!(!hits.is_empty());
        assert!(hits.iter().any(|p| p.slug == "showcase-projects-portfolio"));
    }

    #[tokio::test]
    async fn test_related_prefers_same_category_and_excludes_self() {
        let gateway = BlogGateway::fallback_only();
        let related = gateway
            .related("link-in-bio-for-professionals", 3)
            .await
            .unwrap();
        assert_eq!(related.len(), 3);
        assert!(related.iter().all(|r| r.slug != "link-in-bio-for-professionals"));
        assert_eq!(related[0].category, "Personal Branding");
        assert_eq!(related[1].category, "Personal Branding");
    }

    #[test]
    fn test_pick_related_deduplicates_by_id() {
        let base = fallback::fallback_post_by_slug("ats-friendly-resume-tips").unwrap();
        let other = fallback::fallback_post_by_slug("build-professional-cv-gets-noticed").unwrap();
        let candidates = vec![other.clone(), other.clone(), base.clone()];
        let related = pick_related(&base, &candidates, 5);
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].id, other.id);
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(0), 1);
        assert_eq!(clamp_limit(500), MAX_LIMIT);
        assert_eq!(clamp_limit(7), 7);
    }
}
