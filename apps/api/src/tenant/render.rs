//! Server-rendered HTML shell for published profiles.
//!
//! The page carries SEO, Open Graph and Twitter Card tags for crawlers plus
//! `window.__PROFILE_DATA__` so the client bundle can hydrate without a
//! second round trip.

use askama::Template;

use crate::models::profile::{ProfileRow, PublicProfile};

const DESCRIPTION_MAX_CHARS: usize = 160;

/// Paths of the client bundle referenced by the shell.
#[derive(Debug, Clone)]
pub struct ShellAssets {
    pub bundle_path: String,
    pub stylesheet_path: String,
}

#[derive(Template)]
#[template(path = "profile_shell.html")]
struct ProfileShellTemplate<'a> {
    title: String,
    description: String,
    canonical_url: String,
    image: Option<&'a str>,
    twitter_card: &'static str,
    stylesheet_path: &'a str,
    bundle_path: &'a str,
    profile_json: String,
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate {
    main_site_url: String,
}

pub fn render_profile_page(
    profile: &ProfileRow,
    host: &str,
    assets: &ShellAssets,
) -> Result<String, askama::Error> {
    let image = profile.avatar_url.as_deref().filter(|u| !u.is_empty());
    ProfileShellTemplate {
        title: page_title(profile),
        description: page_description(profile),
        canonical_url: format!("https://{host}/"),
        image,
        twitter_card: if image.is_some() {
            "summary_large_image"
        } else {
            "summary"
        },
        stylesheet_path: &assets.stylesheet_path,
        bundle_path: &assets.bundle_path,
        profile_json: inline_json(profile)?,
    }
    .render()
}

pub fn render_not_found(main_domain: &str) -> Result<String, askama::Error> {
    NotFoundTemplate {
        main_site_url: format!("https://{main_domain}"),
    }
    .render()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn page_title(profile: &ProfileRow) -> String {
    if let Some(title) = non_empty(profile.seo_title.as_deref()) {
        return title.to_string();
    }
    match non_empty(profile.headline.as_deref()) {
        Some(headline) => format!("{} - {}", profile.display_name, headline),
        None => format!("{} | Folio", profile.display_name),
    }
}

pub fn page_description(profile: &ProfileRow) -> String {
    if let Some(description) = non_empty(profile.seo_description.as_deref()) {
        return description.to_string();
    }
    match non_empty(profile.bio.as_deref()) {
        Some(bio) => truncate_chars(bio, DESCRIPTION_MAX_CHARS),
        None => format!("View {}'s professional profile", profile.display_name),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max - 1).collect();
    format!("{}\u{2026}", cut.trim_end())
}

/// JSON safe to place inside a `<script>` element.
fn inline_json(profile: &ProfileRow) -> Result<String, askama::Error> {
    let json = serde_json::to_string(&PublicProfile::from(profile))
        .map_err(|e| askama::Error::Custom(Box::new(e)))?;
    Ok(json
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant::store::tests::sample_profile;

    fn assets() -> ShellAssets {
        ShellAssets {
            bundle_path: "/assets/index.js".to_string(),
            stylesheet_path: "/assets/index.css".to_string(),
        }
    }

    #[test]
    fn test_shell_embeds_profile_data() {
        let profile = sample_profile("alice");
        let html = render_profile_page(&profile, "alice.example.com", &assets()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("window.__PROFILE_DATA__ = {"));
        assert!(html.contains("\"slug\":\"alice\""));
        assert!(html.contains("og:title"));
        assert!(html.contains("twitter:card"));
        assert!(html.contains("summary_large_image"));
        assert!(html.contains("rel=\"canonical\""));
        assert!(html.contains("og:image"));
    }

    #[test]
    fn test_inline_data_omits_internal_fields() {
        let profile = sample_profile("alice");
        let html = render_profile_page(&profile, "alice.example.com", &assets()).unwrap();
        assert!(html.contains("\"displayName\":\"Alice Moreau\""));
        assert!(!html.contains("userId"));
        assert!(!html.contains(&profile.user_id.to_string()));
        assert!(!html.contains("isPublished"));
    }

    #[test]
    fn test_script_breakout_is_neutralized() {
        let mut profile = sample_profile("mallory");
        profile.bio = Some("</script><script>alert(1)</script>".to_string());
        let html = render_profile_page(&profile, "mallory.example.com", &assets()).unwrap();
        assert!(!html.contains("</script><script>alert(1)"));
        assert!(html.contains("\\u003c/script\\u003e"));
    }

    #[test]
    fn test_default_title_and_description() {
        let mut profile = sample_profile("alice");
        assert_eq!(page_title(&profile), "Alice Moreau - Staff Engineer");
        assert_eq!(
            page_description(&profile),
            "I build reliable distributed systems and mentor teams."
        );

        profile.headline = None;
        profile.bio = Some("   ".to_string());
        assert_eq!(page_title(&profile), "Alice Moreau | Folio");
        assert_eq!(
            page_description(&profile),
            "View Alice Moreau's professional profile"
        );
    }

    #[test]
    fn test_explicit_seo_fields_win() {
        let mut profile = sample_profile("alice");
        profile.seo_title = Some("Alice, Staff Engineer in Lyon".to_string());
        profile.seo_description = Some("Distributed systems, mentoring".to_string());
        assert_eq!(page_title(&profile), "Alice, Staff Engineer in Lyon");
        assert_eq!(page_description(&profile), "Distributed systems, mentoring");
    }

    #[test]
    fn test_long_bio_is_truncated() {
        let mut profile = sample_profile("alice");
        profile.bio = Some("a".repeat(400));
        let description = page_description(&profile);
        assert_eq!(description.chars().count(), DESCRIPTION_MAX_CHARS);
        assert!(description.ends_with('\u{2026}'));
    }

    #[test]
    fn test_summary_card_without_avatar() {
        let mut profile = sample_profile("alice");
        profile.avatar_url = None;
        let html = render_profile_page(&profile, "alice.example.com", &assets()).unwrap();
        assert!(!html.contains("og:image"));
        assert!(!html.contains("summary_large_image"));
    }

    #[test]
    fn test_not_found_page_links_main_site() {
        let html = render_not_found("example.com").unwrap();
        assert!(html.contains("Profile not found"));
        assert!(html.contains("example.com"));
    }
}
