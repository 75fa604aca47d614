//! Analytics events and scroll-depth tracking.

use serde::Serialize;
use serde_json::{Map, Value};

use super::utm::Utm;

/// Scroll-depth thresholds, in percent of the document.
pub const SCROLL_THRESHOLDS: [u8; 4] = [25, 50, 75, 100];

const MAX_META_ENTRIES: usize = 8;
const MAX_META_STRING: usize = 200;

/// Named events written to the `events` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    PageView,
    ScrollDepth,
    CtaWhatsappClick,
    LeadSubmitted,
    LeadInsertFailed,
    PortfolioOpened,
    PackageSelected,
}

impl EventName {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PageView => "page_view",
            Self::ScrollDepth => "scroll_depth",
            Self::CtaWhatsappClick => "cta_whatsapp_click",
            Self::LeadSubmitted => "lead_submitted",
            Self::LeadInsertFailed => "lead_insert_failed",
            Self::PortfolioOpened => "portfolio_opened",
            Self::PackageSelected => "package_selected",
        }
    }

    /// Whether browsers may report this event through the public beacon.
    ///
    /// Page views and lead outcomes are only ever recorded by the server.
    #[must_use]
    pub const fn accepted_from_browser(self) -> bool {
        matches!(
            self,
            Self::ScrollDepth
                | Self::CtaWhatsappClick
                | Self::PortfolioOpened
                | Self::PackageSelected
        )
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "page_view" => Ok(Self::PageView),
            "scroll_depth" => Ok(Self::ScrollDepth),
            "cta_whatsapp_click" => Ok(Self::CtaWhatsappClick),
            "lead_submitted" => Ok(Self::LeadSubmitted),
            "lead_insert_failed" => Ok(Self::LeadInsertFailed),
            "portfolio_opened" => Ok(Self::PortfolioOpened),
            "package_selected" => Ok(Self::PackageSelected),
            _ => Err(format!("unknown event: {s}")),
        }
    }
}

/// Who an event is attributed to.
///
/// Built per request from the visitor's server-side session and passed
/// explicitly to every emitter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorContext {
    pub session_id: Option<String>,
    pub utm: Utm,
    pub ip_hash: Option<String>,
}

impl VisitorContext {
    /// Fresh random visitor identifier (`sess_` + 32 hex chars).
    #[must_use]
    pub fn generate_session_id() -> String {
        format!("sess_{}", uuid::Uuid::new_v4().simple())
    }

    /// Whether a stored value has the shape produced by
    /// [`Self::generate_session_id`].
    #[must_use]
    pub fn is_valid_session_id(value: &str) -> bool {
        value
            .strip_prefix("sess_")
            .is_some_and(|hex| hex.len() == 32 && hex.chars().all(|c| c.is_ascii_hexdigit()))
    }

    /// Build an event attributed to this visitor.
    #[must_use]
    pub fn event(&self, name: EventName, source: Option<&str>, meta: Map<String, Value>) -> NewEvent {
        NewEvent {
            event_name: name,
            session_id: self.session_id.clone(),
            source: source
                .filter(|s| !s.trim().is_empty())
                .unwrap_or("direct")
                .to_owned(),
            meta,
            utm: self.utm.clone(),
            ip_hash: self.ip_hash.clone(),
        }
    }
}

/// Insert payload for the `events` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEvent {
    pub event_name: EventName,
    pub session_id: Option<String>,
    pub source: String,
    pub meta: Map<String, Value>,
    #[serde(flatten)]
    pub utm: Utm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_hash: Option<String>,
}

/// Keep event metadata small: a handful of string, number or bool entries.
#[must_use]
pub fn sanitize_meta(raw: Map<String, Value>) -> Map<String, Value> {
    raw.into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(s) => Value::String(s.chars().take(MAX_META_STRING).collect()),
                Value::Number(_) | Value::Bool(_) => value,
                _ => return None,
            };
            Some((key.chars().take(64).collect::<String>(), value))
        })
        .take(MAX_META_ENTRIES)
        .collect()
}

/// Percentage of the document seen so far, clamped to `0..=100`.
///
/// A document with no height counts as fully seen.
#[must_use]
pub fn scroll_percent(scroll_top: f64, viewport_height: f64, document_height: f64) -> f64 {
    if !document_height.is_finite() || document_height <= 0.0 {
        return 100.0;
    }
    let seen = (scroll_top.max(0.0) + viewport_height.max(0.0)) / document_height * 100.0;
    if seen.is_finite() {
        seen.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Fires each threshold in [`SCROLL_THRESHOLDS`] at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrollDepthTracker {
    fired: [bool; SCROLL_THRESHOLDS.len()],
}

impl ScrollDepthTracker {
    /// Record a sample and return the thresholds it newly reached.
    pub fn observe(&mut self, percent: f64) -> Vec<u8> {
        let mut reached = Vec::new();
        for (threshold, fired) in SCROLL_THRESHOLDS.iter().zip(self.fired.iter_mut()) {
            if !*fired && percent >= f64::from(*threshold) {
                *fired = true;
                reached.push(*threshold);
            }
        }
        reached
    }

    /// Thresholds already fired, in ascending order.
    #[must_use]
    pub fn fired(&self) -> Vec<u8> {
        SCROLL_THRESHOLDS
            .iter()
            .zip(self.fired.iter())
            .filter_map(|(threshold, fired)| fired.then_some(*threshold))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_fire_once_each() {
        let mut tracker = ScrollDepthTracker::default();
        assert!(tracker.observe(10.0).is_empty());
        assert_eq!(tracker.observe(30.0), vec![25]);
        assert!(tracker.observe(30.0).is_empty());
        assert!(tracker.observe(20.0).is_empty());
        assert_eq!(tracker.observe(100.0), vec![50, 75, 100]);
        assert!(tracker.observe(100.0).is_empty());
        assert_eq!(tracker.fired(), vec![25, 50, 75, 100]);
    }

    #[test]
    fn test_threshold_fires_on_exact_value() {
        let mut tracker = ScrollDepthTracker::default();
        assert_eq!(tracker.observe(50.0), vec![25, 50]);
        assert_eq!(tracker.observe(74.9), Vec::<u8>::new());
        assert_eq!(tracker.observe(75.0), vec![75]);
    }

    #[test]
    fn test_any_sample_sequence_fires_at_most_once() {
        let samples = [0.0, 99.0, 12.5, 26.0, 80.0, 51.0, 100.0, 3.0, 100.0, 76.0];
        let mut tracker = ScrollDepthTracker::default();
        let mut seen = Vec::new();
        let mut max = 0.0_f64;
        for sample in samples {
            max = max.max(sample);
            for threshold in tracker.observe(sample) {
                assert!(f64::from(threshold) <= max);
                assert!(!seen.contains(&threshold));
                seen.push(threshold);
            }
        }
        assert_eq!(seen, vec![25, 50, 75, 100]);
    }

    #[test]
    fn test_scroll_percent() {
        assert!((scroll_percent(0.0, 800.0, 3200.0) - 25.0).abs() < f64::EPSILON);
        assert!((scroll_percent(2400.0, 800.0, 3200.0) - 100.0).abs() < f64::EPSILON);
        assert!((scroll_percent(9000.0, 800.0, 3200.0) - 100.0).abs() < f64::EPSILON);
        assert!((scroll_percent(0.0, 800.0, 0.0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_session_id_shape() {
        let id = VisitorContext::generate_session_id();
        assert!(VisitorContext::is_valid_session_id(&id));
        assert!(!VisitorContext::is_valid_session_id("sess_short"));
        assert!(!VisitorContext::is_valid_session_id("visitor"));
    }

    #[test]
    fn test_event_defaults_source_to_direct() {
        let ctx = VisitorContext::default();
        let event = ctx.event(EventName::PageView, None, Map::new());
        assert_eq!(event.source, "direct");
        let event = ctx.event(EventName::CtaWhatsappClick, Some("portfolio"), Map::new());
        assert_eq!(event.source, "portfolio");
    }

    #[test]
    fn test_sanitize_meta_drops_nested_values() {
        let mut raw = Map::new();
        raw.insert("id".to_owned(), Value::from("abc"));
        raw.insert("depth".to_owned(), Value::from(50));
        raw.insert("nested".to_owned(), serde_json::json!({ "a": 1 }));
        raw.insert("long".to_owned(), Value::from("x".repeat(1000)));
        let meta = sanitize_meta(raw);
        assert_eq!(meta.len(), 3);
        assert!(!meta.contains_key("nested"));
        assert_eq!(meta["long"].as_str().map(str::len), Some(MAX_META_STRING));
    }

    #[test]
    fn test_browser_event_allowlist() {
        assert!(EventName::ScrollDepth.accepted_from_browser());
        assert!(!EventName::LeadSubmitted.accepted_from_browser());
        assert!(!EventName::PageView.accepted_from_browser());
    }
}
