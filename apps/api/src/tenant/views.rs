//! Best-effort view analytics. Recording runs on its own task so a slow or
//! failing database never delays or fails the page render.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, Request};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::tenant::store::{ProfileStore, ViewMeta};

/// Every call records one view; repeat visits are not de-duplicated here.
pub fn spawn_view_recording(
    store: Arc<dyn ProfileStore>,
    profile_id: Uuid,
    meta: ViewMeta,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = store.record_profile_view(profile_id, &meta).await {
            warn!("Failed to record view for profile {profile_id}: {e}");
        }
        match store.increment_view_count(profile_id).await {
            Ok(()) => debug!("View counted for profile {profile_id}"),
            Err(e) => warn!("Failed to increment view count for profile {profile_id}: {e}"),
        }
    })
}

/// Visitor IP (first `X-Forwarded-For` hop, else the socket peer), user agent and referrer.
pub fn view_meta<B>(req: &Request<B>) -> ViewMeta {
    let headers = req.headers();
    let forwarded = header_str(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty());
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    ViewMeta {
        ip: forwarded.or(peer),
        user_agent: header_str(headers, header::USER_AGENT.as_str()).map(str::to_string),
        referrer: header_str(headers, header::REFERER.as_str()).map(str::to_string),
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
