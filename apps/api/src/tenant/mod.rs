//! Subdomain / custom-domain routing.
//!
//! Requests for `{slug}.{main_domain}` or for a host a user has attached to
//! their profile are answered here with the server-rendered profile shell.
//! Everything else (API, assets, the main site, local and preview hosts)
//! passes through to the regular router untouched.

pub mod handlers;
pub mod render;
pub mod store;
pub mod views;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use tracing::{debug, error, info, warn};

use crate::config::DomainSettings;
use crate::models::profile::ProfileRow;
use crate::state::AppState;
use crate::tenant::render::{render_not_found, render_profile_page};
use crate::tenant::store::ProfileStore;
use crate::tenant::views::{spawn_view_recording, view_meta};

const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1", "::1", "0.0.0.0"];
const PLATFORM_PATH_PREFIXES: &[&str] = &["/api", "/assets", "/static", "/health"];
const ASSET_EXTENSIONS: &[&str] = &[
    "js", "mjs", "css", "map", "ico", "png", "jpg", "jpeg", "gif", "svg", "webp", "woff", "woff2",
    "ttf", "txt", "xml", "json", "webmanifest", "pdf",
];

/// First pass over a request, before any profile lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostClass {
    Platform,
    /// `label` is the leftmost label of `host` when the host sits under the
    /// main domain: the candidate profile slug. Other hosts are only
    /// candidates for a custom-domain match.
    Tenant { host: String, label: Option<String> },
}

/// Outcome of routing one request.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteDecision {
    PlatformRoute,
    TenantSubdomain(ProfileRow),
    CustomDomain(ProfileRow),
    Unresolved,
}

/// Lower-cased host without port. Handles bracketed IPv6 literals.
pub fn normalize_host(raw: &str) -> String {
    let raw = raw.trim().to_ascii_lowercase();
    if let Some(rest) = raw.strip_prefix('[') {
        return rest.split(']').next().unwrap_or("").to_string();
    }
    // a bare IPv6 literal has more than one colon and no port
    if raw.matches(':').count() > 1 {
        return raw;
    }
    raw.split(':').next().unwrap_or("").trim_end_matches('.').to_string()
}

fn is_platform_path(path: &str) -> bool {
    let prefixed = PLATFORM_PATH_PREFIXES
        .iter()
        .any(|p| path == *p || path.starts_with(&format!("{p}/")));
    if prefixed {
        return true;
    }
    let last = path.rsplit('/').next().unwrap_or("");
    last.rsplit_once('.')
        .is_some_and(|(_, ext)| ASSET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

pub fn classify(raw_host: &str, path: &str, domains: &DomainSettings) -> HostClass {
    let host = normalize_host(raw_host);

    let is_platform_host = host.is_empty()
        || LOOPBACK_HOSTS.contains(&host.as_str())
        || domains
            .preview_host_suffixes
            .iter()
            .any(|suffix| host.ends_with(suffix.as_str()))
        || host == domains.main_domain
        || host == format!("www.{}", domains.main_domain);

    if is_platform_host || is_platform_path(path) {
        return HostClass::Platform;
    }

    let label = host
        .strip_suffix(domains.main_domain.as_str())
        .filter(|rest| rest.ends_with('.'))
        .and_then(|_| host.split('.').next())
        .map(str::to_string);
    HostClass::Tenant { host, label }
}

/// Looks up a published profile by slug (subdomains of the main domain
/// only), then by custom domain. Store errors are logged and count as no
/// match.
pub async fn resolve(store: &dyn ProfileStore, host: &str, label: Option<&str>) -> RouteDecision {
    if let Some(label) = label {
        match store.profile_by_slug(label).await {
            Ok(Some(profile)) => return RouteDecision::TenantSubdomain(profile),
            Ok(None) => {}
            Err(e) => error!("Profile lookup by slug '{label}' failed: {e}"),
        }
    }
    match store.profile_by_domain(host).await {
        Ok(Some(profile)) => return RouteDecision::CustomDomain(profile),
        Ok(None) => {}
        Err(e) => error!("Profile lookup by domain '{host}' failed: {e}"),
    }
    RouteDecision::Unresolved
}

pub async fn route(state: &AppState, host: &str, path: &str) -> RouteDecision {
    match classify(host, path, &state.config.domains) {
        HostClass::Platform => RouteDecision::PlatformRoute,
        HostClass::Tenant { host, label } => {
            resolve(state.profiles.as_ref(), &host, label.as_deref()).await
        }
    }
}

fn request_host(req: &Request) -> String {
    req.headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri().host().map(str::to_string))
        .unwrap_or_default()
}

/// Middleware wrapping the whole router.
pub async fn tenant_routing(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let host = request_host(&req);
    let path = req.uri().path().to_string();
    let decision = route(&state, &host, &path).await;

    let profile = match decision {
        RouteDecision::PlatformRoute => return next.run(req).await,
        RouteDecision::Unresolved => {
            info!("No published profile for host '{host}'");
            return not_found_page(&state.config.domains.main_domain);
        }
        RouteDecision::TenantSubdomain(profile) => {
            debug!("Serving profile '{}' for subdomain {host}", profile.slug);
            profile
        }
        RouteDecision::CustomDomain(profile) => {
            debug!("Serving profile '{}' for custom domain {host}", profile.slug);
            profile
        }
    };

    spawn_view_recording(state.profiles.clone(), profile.id, view_meta(&req));

    let canonical_host = normalize_host(&host);
    match render_profile_page(&profile, &canonical_host, &state.shell_assets) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render profile '{}': {e}", profile.slug);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

fn not_found_page(main_domain: &str) -> Response {
    match render_not_found(main_domain) {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            warn!("Failed to render 404 page: {e}");
            (StatusCode::NOT_FOUND, "Profile not found").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant::store::tests::sample_profile;
    use crate::tenant::store::MemoryProfileStore;

    fn domains() -> DomainSettings {
        DomainSettings {
            main_domain: "example.com".to_string(),
            preview_host_suffixes: vec![".preview.example.net".to_string()],
        }
    }

    fn tenant(host: &str, label: Option<&str>) -> HostClass {
        HostClass::Tenant {
            host: host.to_string(),
            label: label.map(str::to_string),
        }
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("Alice.Example.com:443"), "alice.example.com");
        assert_eq!(normalize_host("[::1]:8080"), "::1");
        assert_eq!(normalize_host("::1"), "::1");
        assert_eq!(normalize_host("example.com."), "example.com");
    }

    #[test]
    fn test_platform_hosts() {
        let d = domains();
        assert_eq!(classify("localhost:5173", "/", &d), HostClass::Platform);
        assert_eq!(classify("127.0.0.1", "/", &d), HostClass::Platform);
        assert_eq!(classify("[::1]:3000", "/", &d), HostClass::Platform);
        assert_eq!(classify("example.com", "/", &d), HostClass::Platform);
        assert_eq!(classify("www.example.com", "/pricing", &d), HostClass::Platform);
        assert_eq!(classify("pr-12.preview.example.net", "/", &d), HostClass::Platform);
        assert_eq!(classify("", "/", &d), HostClass::Platform);
    }

    #[test]
    fn test_platform_paths_on_tenant_hosts() {
        let d = domains();
        assert_eq!(classify("alice.example.com", "/api/blog/posts", &d), HostClass::Platform);
        assert_eq!(classify("alice.example.com", "/api", &d), HostClass::Platform);
        assert_eq!(classify("alice.example.com", "/assets/index.js", &d), HostClass::Platform);
        assert_eq!(classify("alice.example.com", "/favicon.ico", &d), HostClass::Platform);
        assert_eq!(classify("cv.bob.dev", "/main.CSS", &d), HostClass::Platform);
    }

    #[test]
    fn test_tenant_candidates() {
        let d = domains();
        assert_eq!(
            classify("alice.example.com", "/", &d),
            tenant("alice.example.com", Some("alice"))
        );
        assert_eq!(
            classify("Alice.Example.com:443", "/projects", &d),
            tenant("alice.example.com", Some("alice"))
        );
        assert_eq!(classify("cv.bob.dev", "/", &d), tenant("cv.bob.dev", None));
        // suffix match must fall on a label boundary
        assert_eq!(
            classify("alice.notexample.com", "/", &d),
            tenant("alice.notexample.com", None)
        );
        // a dot in a page path is not an asset unless the extension is known
        assert_eq!(
            classify("alice.example.com", "/v1.2", &d),
            tenant("alice.example.com", Some("alice"))
        );
    }

    #[tokio::test]
    async fn test_resolve_subdomain_then_custom_domain() {
        let alice = sample_profile("alice");
        let mut bob = sample_profile("bob");
        bob.custom_domain = Some("cv.bob.dev".to_string());
        let store = MemoryProfileStore::new(vec![alice.clone(), bob.clone()]);

        assert_eq!(
            resolve(&store, "alice.example.com", Some("alice")).await,
            RouteDecision::TenantSubdomain(alice)
        );
        assert_eq!(
            resolve(&store, "cv.bob.dev", None).await,
            RouteDecision::CustomDomain(bob)
        );
        assert_eq!(
            resolve(&store, "unknown-xyz.example.com", Some("unknown-xyz")).await,
            RouteDecision::Unresolved
        );
    }

    #[tokio::test]
    async fn test_unpublished_profile_is_unresolved() {
        let mut draft = sample_profile("draft");
        draft.is_published = false;
        let store = MemoryProfileStore::new(vec![draft]);
        assert_eq!(
            resolve(&store, "draft.example.com", Some("draft")).await,
            RouteDecision::Unresolved
        );
    }

    #[tokio::test]
    async fn test_slug_cannot_claim_a_custom_domain() {
        let cv = sample_profile("cv");
        let mut bob = sample_profile("bob");
        bob.custom_domain = Some("cv.bob.dev".to_string());
        let store = MemoryProfileStore::new(vec![cv, bob.clone()]);

        let HostClass::Tenant { host, label } = classify("cv.bob.dev", "/", &domains()) else {
            panic!("custom domain classified as platform");
        };
        assert_eq!(
            resolve(&store, &host, label.as_deref()).await,
            RouteDecision::CustomDomain(bob)
        );
    }
}
