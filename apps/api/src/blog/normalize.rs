//! Maps WordPress REST API records (`/wp/v2/posts?_embed=1`, `/wp/v2/categories`)
//! into `BlogPost` / `BlogCategory`.

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::blog::models::{BlogCategory, BlogPost};

pub const DEFAULT_AUTHOR: &str = "Folio Team";
pub const DEFAULT_CATEGORY: &str = "General";
const WORDS_PER_MINUTE: usize = 200;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

// ────────────────────────────────────────────────────────────────────────────
// Upstream shapes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

#[derive(Debug, Deserialize)]
pub struct WpPost {
    pub id: u64,
    pub slug: String,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub excerpt: Rendered,
    #[serde(default)]
    pub content: Rendered,
    pub date_gmt: Option<String>,
    pub date: Option<String>,
    pub modified_gmt: Option<String>,
    #[serde(default)]
    pub sticky: bool,
    #[serde(rename = "_embedded", default)]
    pub embedded: WpEmbedded,
    pub yoast_head_json: Option<WpSeo>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WpEmbedded {
    #[serde(default)]
    pub author: Vec<WpAuthor>,
    #[serde(rename = "wp:featuredmedia", default)]
    pub featured_media: Vec<WpMedia>,
    #[serde(rename = "wp:term", default)]
    pub terms: Vec<Vec<WpTerm>>,
}

#[derive(Debug, Deserialize)]
pub struct WpAuthor {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WpMedia {
    pub source_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WpTerm {
    pub name: String,
    pub taxonomy: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WpSeo {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WpCategory {
    pub id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub count: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Text helpers
// ────────────────────────────────────────────────────────────────────────────

/// Removes every tag and decodes the entities WordPress puts in titles and excerpts.
pub fn strip_html(html: &str) -> String {
    let text = TAG_RE.replace_all(html, "");
    decode_entities(&text).trim().to_string()
}

fn decode_entities(text: &str) -> String {
    const ENTITIES: &[(&str, &str)] = &[
        ("&nbsp;", " "),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&#039;", "'"),
        ("&#39;", "'"),
        ("&#8216;", "\u{2018}"),
        ("&#8217;", "\u{2019}"),
        ("&#8220;", "\u{201c}"),
        ("&#8221;", "\u{201d}"),
        ("&#8211;", "\u{2013}"),
        ("&#8212;", "\u{2014}"),
        ("&#8230;", "\u{2026}"),
        ("[&hellip;]", "\u{2026}"),
        ("&hellip;", "\u{2026}"),
    ];
    let mut out = text.to_string();
    for (entity, replacement) in ENTITIES {
        out = out.replace(entity, replacement);
    }
    // last, so "&amp;lt;" stays literal "&lt;"
    out.replace("&amp;", "&")
}

/// Minutes to read `html` at 200 words per minute, rounded up, never below 1.
pub fn reading_time(html: &str) -> u32 {
    let words = TAG_RE.replace_all(html, " ").split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

/// WordPress `*_gmt` fields carry no offset: `2024-03-01T09:30:00`.
fn parse_wp_date(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

// ────────────────────────────────────────────────────────────────────────────
// Normalization
// ────────────────────────────────────────────────────────────────────────────

/// Category and tag names from the embedded term groups.
///
/// Terms are matched by their `taxonomy` name. Only when the upstream omits
/// taxonomy names entirely do we fall back to position (group 0 = categories,
/// group 1 = tags).
fn taxonomy(terms: &[Vec<WpTerm>]) -> (Option<String>, Vec<String>) {
    let all = || terms.iter().flatten();
    let named = all().any(|t| t.taxonomy.is_some());

    if named {
        let category = all()
            .find(|t| t.taxonomy.as_deref() == Some("category"))
            .map(|t| t.name.clone());
        let tags = all()
            .filter(|t| t.taxonomy.as_deref() == Some("post_tag"))
            .map(|t| t.name.clone())
            .collect();
        (category, tags)
    } else {
        let category = terms.first().and_then(|g| g.first()).map(|t| t.name.clone());
        let tags = terms
            .get(1)
            .map(|g| g.iter().map(|t| t.name.clone()).collect())
            .unwrap_or_default();
        (category, tags)
    }
}

pub fn normalize_post(post: WpPost) -> BlogPost {
    let published_at = parse_wp_date(post.date_gmt.as_deref())
        .or_else(|| parse_wp_date(post.date.as_deref()))
        .unwrap_or_default();
    let updated_at = parse_wp_date(post.modified_gmt.as_deref()).unwrap_or(published_at);

    let author = post
        .embedded
        .author
        .first()
        .and_then(|a| a.name.clone())
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

    let featured_image = post
        .embedded
        .featured_media
        .first()
        .and_then(|m| m.source_url.clone());

    let (category, tags) = taxonomy(&post.embedded.terms);
    let (seo_title, seo_description) = match post.yoast_head_json {
        Some(seo) => (seo.title, seo.description),
        None => (None, None),
    };

    BlogPost {
        id: post.id,
        title: strip_html(&post.title.rendered),
        slug: post.slug,
        excerpt: strip_html(&post.excerpt.rendered),
        reading_time: reading_time(&post.content.rendered),
        content: post.content.rendered,
        author,
        published_at,
        updated_at,
        tags,
        category: category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        featured: post.sticky,
        featured_image,
        seo_title,
        seo_description,
    }
}

pub fn normalize_category(category: WpCategory) -> BlogCategory {
    BlogCategory {
        id: category.id,
        name: strip_html(&category.name),
        slug: category.slug,
        description: strip_html(&category.description),
        post_count: category.count,
    }
}

/// A body that is not an array yields no posts; records that fail to
/// deserialize are skipped.
pub fn normalize_posts(body: Value) -> Vec<BlogPost> {
    records::<WpPost>(body).into_iter().map(normalize_post).collect()
}

pub fn normalize_categories(body: Value) -> Vec<BlogCategory> {
    records::<WpCategory>(body)
        .into_iter()
        .map(normalize_category)
        .collect()
}

fn records<T: serde::de::DeserializeOwned>(body: Value) -> Vec<T> {
    let Value::Array(items) = body else {
        debug!("CMS body is not an array, treating as empty");
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("Skipping malformed CMS record: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn words(n: usize) -> String {
        format!("<p>{}</p>", vec!["word"; n].join(" "))
    }

    fn sample_post() -> Value {
        json!({
            "id": 42,
            "slug": "ats-friendly-resume",
            "title": { "rendered": "Writing an <em>ATS&#8209;friendly</em> Resume &amp; Cover Letter" },
            "excerpt": { "rendered": "<p>Get past the robots.</p>\n" },
            "content": { "rendered": words(450) },
            "date_gmt": "2024-03-01T09:30:00",
            "modified_gmt": "2024-03-05T10:00:00",
            "sticky": true,
            "yoast_head_json": { "title": "ATS Resume Guide", "description": "How to pass ATS filters" },
            "_embedded": {
                "author": [{ "name": "Dana Reyes" }],
                "wp:featuredmedia": [{ "source_url": "https://cdn.example.com/ats.png" }],
                "wp:term": [
                    [{ "name": "Career Advice", "taxonomy": "category" }],
                    [{ "name": "ats", "taxonomy": "post_tag" }, { "name": "resume", "taxonomy": "post_tag" }]
                ]
            }
        })
    }

    #[test]
    fn test_reading_time_floor_for_short_content() {
        assert_eq!(reading_time(&words(10)), 1);
        assert_eq!(reading_time(&words(199)), 1);
        assert_eq!(reading_time(""), 1);
    }

    #[test]
    fn test_reading_time_exact_multiple() {
        assert_eq!(reading_time(&words(400)), 2);
    }

    #[test]
    fn test_reading_time_rounds_up() {
        assert_eq!(reading_time(&words(401)), 3);
    }

    #[test]
    fn test_reading_time_ignores_markup() {
        let html = "<div class=\"a b c d e f\"><p>one</p><p>two</p></div>";
        assert_eq!(TAG_RE.replace_all(html, " ").split_whitespace().count(), 2);
    }

    #[test]
    fn test_strip_html_removes_tags_and_decodes() {
        assert_eq!(strip_html("<p>Tips &amp; Tricks&#8230;</p>\n"), "Tips & Tricks\u{2026}");
        assert_eq!(strip_html("It&#8217;s <strong>here</strong>"), "It\u{2019}s here");
    }

    #[test]
    fn test_normalize_full_post() {
        let posts = normalize_posts(json!([sample_post()]));
        assert_eq!(posts.len(), 1);
        let post = &posts[0];
        assert_eq!(post.id, 42);
        assert_eq!(post.slug, "ats-friendly-resume");
        assert!(!post.title.contains('<'));
        assert_eq!(post.excerpt, "Get past the robots.");
        assert!(post.content.starts_with("<p>"));
        assert_eq!(post.author, "Dana Reyes");
        assert_eq!(post.category, "Career Advice");
        assert_eq!(post.tags, vec!["ats", "resume"]);
        assert!(post.featured);
        assert_eq!(post.reading_time, 3);
        assert_eq!(post.featured_image.as_deref(), Some("https://cdn.example.com/ats.png"));
        assert_eq!(post.seo_title.as_deref(), Some("ATS Resume Guide"));
        assert_eq!(post.seo_description.as_deref(), Some("How to pass ATS filters"));
        assert_eq!(post.published_at.to_rfc3339(), "2024-03-01T09:30:00+00:00");
        assert_eq!(post.updated_at.to_rfc3339(), "2024-03-05T10:00:00+00:00");
    }

    #[test]
    fn test_missing_embeds_use_defaults() {
        let posts = normalize_posts(json!([{
            "id": 7,
            "slug": "bare",
            "title": { "rendered": "Bare" },
            "content": { "rendered": "" }
        }]));
        let post = &posts[0];
        assert_eq!(post.author, DEFAULT_AUTHOR);
        assert_eq!(post.category, DEFAULT_CATEGORY);
        assert!(post.tags.is_empty());
        assert!(!post.featured);
        assert_eq!(post.featured_image, None);
        assert_eq!(post.seo_title, None);
        assert_eq!(post.reading_time, 1);
    }

    #[test]
    fn test_taxonomy_matched_by_name_not_position() {
        let terms = vec![
            vec![WpTerm { name: "remote".into(), taxonomy: Some("post_tag".into()) }],
            vec![WpTerm { name: "Job Search".into(), taxonomy: Some("category".into()) }],
        ];
        let (category, tags) = taxonomy(&terms);
        assert_eq!(category.as_deref(), Some("Job Search"));
        assert_eq!(tags, vec!["remote"]);
    }

    #[test]
    fn test_taxonomy_positional_when_unnamed() {
        let terms = vec![
            vec![WpTerm { name: "Interviews".into(), taxonomy: None }],
            vec![
                WpTerm { name: "prep".into(), taxonomy: None },
                WpTerm { name: "behavioral".into(), taxonomy: None },
            ],
        ];
        let (category, tags) = taxonomy(&terms);
        assert_eq!(category.as_deref(), Some("Interviews"));
        assert_eq!(tags, vec!["prep", "behavioral"]);
    }

    #[test]
    fn test_non_array_body_is_empty() {
        assert!(normalize_posts(json!({ "code": "rest_no_route" })).is_empty());
        assert!(normalize_categories(Value::Null).is_empty());
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let posts = normalize_posts(json!([{ "slug": "no-id" }, sample_post()]));
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, 42);
    }

    #[test]
    fn test_normalize_category() {
        let categories = normalize_categories(json!([{
            "id": 3,
            "name": "Career &amp; Growth",
            "slug": "career-growth",
            "description": "<p>Grow</p>",
            "count": 12
        }]));
        assert_eq!(
            categories,
            vec![BlogCategory {
                id: 3,
                name: "Career & Growth".into(),
                slug: "career-growth".into(),
                description: "Grow".into(),
                post_count: 12,
            }]
        );
    }
}
