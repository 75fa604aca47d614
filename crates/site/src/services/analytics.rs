//! Fire-and-forget analytics.
//!
//! Events are inserted into the `events` table on a spawned task. The request
//! that produced them never waits, and a failed insert is logged and dropped.
//!
//! Scroll depth is deduplicated server-side: one [`ScrollDepthTracker`] per
//! page-load id, held in a `moka` cache with idle expiry, so each threshold
//! is emitted at most once per page load however often the browser re-sends.

use std::net::IpAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use lummi_core::{EventName, NewEvent, ScrollDepthTracker, VisitorContext};
use lummi_supabase::SupabaseClient;
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};
use tokio::task::JoinHandle;

/// A page load that has not sampled for this long is forgotten.
const SCROLL_IDLE: Duration = Duration::from_secs(30 * 60);
const SCROLL_CAPACITY: u64 = 50_000;

type SharedTracker = Arc<Mutex<ScrollDepthTracker>>;

/// Analytics emitter shared by all handlers.
#[derive(Clone)]
pub struct Analytics {
    inner: Arc<AnalyticsInner>,
}

struct AnalyticsInner {
    supabase: Option<SupabaseClient>,
    ip_hash_salt: Option<SecretString>,
    scroll: Cache<String, SharedTracker>,
}

impl Analytics {
    #[must_use]
    pub fn new(supabase: Option<SupabaseClient>, ip_hash_salt: Option<SecretString>) -> Self {
        let scroll = Cache::builder()
            .max_capacity(SCROLL_CAPACITY)
            .time_to_idle(SCROLL_IDLE)
            .build();

        Self {
            inner: Arc::new(AnalyticsInner {
                supabase,
                ip_hash_salt,
                scroll,
            }),
        }
    }

    /// Emit an event without waiting for delivery.
    ///
    /// Returns the delivery task so tests can await it; handlers drop it.
    pub fn track(
        &self,
        visitor: &VisitorContext,
        name: EventName,
        source: Option<&str>,
        meta: Map<String, Value>,
    ) -> Option<JoinHandle<()>> {
        let event = visitor.event(name, source, meta);
        let Some(client) = self.inner.supabase.clone() else {
            tracing::debug!(event = %event.event_name, "Analytics skipped: backend not configured");
            return None;
        };

        Some(tokio::spawn(deliver(client, event)))
    }

    /// Record a scroll sample for a page load and emit `scroll_depth` for
    /// every threshold it newly crossed.
    ///
    /// Returns the thresholds that were emitted.
    pub async fn scroll_depth(&self, visitor: &VisitorContext, page_id: &str, percent: f64) -> Vec<u8> {
        let tracker = self
            .inner
            .scroll
            .get_with(page_id.to_owned(), async { SharedTracker::default() })
            .await;

        let reached = tracker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observe(percent);

        for threshold in &reached {
            let mut meta = Map::new();
            meta.insert("depth".to_owned(), json!(threshold));
            self.track(visitor, EventName::ScrollDepth, Some("scroll"), meta);
        }

        reached
    }

    /// `sha256(salt || ip)` as hex, when a salt is configured.
    #[must_use]
    pub fn ip_hash(&self, ip: Option<IpAddr>) -> Option<String> {
        let salt = self.inner.ip_hash_salt.as_ref()?;
        let ip = ip?;
        let mut hasher = Sha256::new();
        hasher.update(salt.expose_secret().as_bytes());
        hasher.update(ip.to_string().as_bytes());
        Some(format!("{:x}", hasher.finalize()))
    }
}

async fn deliver(client: SupabaseClient, event: NewEvent) {
    if let Err(e) = client.insert_event(&event).await {
        tracing::warn!(
            event = %event.event_name,
            error = %e,
            "Analytics event dropped"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scroll_thresholds_fire_once_per_page_load() {
        let analytics = Analytics::new(None, None);
        let visitor = VisitorContext::default();

        assert_eq!(analytics.scroll_depth(&visitor, "page-a", 30.0).await, vec![25]);
        assert_eq!(analytics.scroll_depth(&visitor, "page-a", 30.0).await, Vec::<u8>::new());
        assert_eq!(analytics.scroll_depth(&visitor, "page-a", 80.0).await, vec![50, 75]);
        assert_eq!(analytics.scroll_depth(&visitor, "page-a", 100.0).await, vec![100]);
        assert_eq!(analytics.scroll_depth(&visitor, "page-a", 100.0).await, Vec::<u8>::new());
    }

    #[tokio::test]
    async fn test_scroll_trackers_are_per_page_load() {
        let analytics = Analytics::new(None, None);
        let visitor = VisitorContext::default();

        assert_eq!(analytics.scroll_depth(&visitor, "page-a", 60.0).await, vec![25, 50]);
        assert_eq!(analytics.scroll_depth(&visitor, "page-b", 60.0).await, vec![25, 50]);
    }

    #[tokio::test]
    async fn test_scroll_below_first_threshold_fires_nothing() {
        let analytics = Analytics::new(None, None);
        let visitor = VisitorContext::default();
        assert!(analytics.scroll_depth(&visitor, "page-a", 24.9).await.is_empty());
    }

    #[tokio::test]
    async fn test_track_without_backend_is_a_no_op() {
        let analytics = Analytics::new(None, None);
        let handle = analytics.track(
            &VisitorContext::default(),
            EventName::PageView,
            None,
            Map::new(),
        );
        assert!(handle.is_none());
    }

    #[test]
    fn test_ip_hash_requires_salt() {
        let ip: IpAddr = "203.0.113.7".parse().unwrap();
        assert_eq!(Analytics::new(None, None).ip_hash(Some(ip)), None);

        let salted = Analytics::new(None, Some(SecretString::from("s4lt")));
        let hash = salted.ip_hash(Some(ip)).unwrap();
        assert_eq!(hash.len(), 64);
        assert_eq!(salted.ip_hash(Some(ip)).unwrap(), hash);
        assert_eq!(salted.ip_hash(None), None);
    }
}
