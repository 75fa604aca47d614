//! Analytics beacon endpoint.
//!
//! Browsers post small JSON bodies here with `navigator.sendBeacon`, which
//! sends `text/plain`, so the body is parsed by hand instead of through the
//! `Json` extractor. The answer is always `204`: a beacon has nobody to
//! report an error to.

use axum::{body::Bytes, extract::State, http::StatusCode};
use lummi_core::{EventName, VisitorContext, sanitize_meta, scroll_percent};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::middleware::Visitor;
use crate::state::AppState;

const MAX_PAGE_ID_LEN: usize = 64;

/// Beacon body.
#[derive(Debug, Deserialize)]
pub struct Beacon {
    pub event_name: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub meta: Map<String, Value>,
    /// Page-load id, required for `scroll_depth`.
    #[serde(default)]
    pub page_id: Option<String>,
    #[serde(default)]
    pub scroll_top: Option<f64>,
    #[serde(default)]
    pub viewport_height: Option<f64>,
    #[serde(default)]
    pub document_height: Option<f64>,
}

/// Record a browser-reported event.
pub async fn beacon(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
    body: Bytes,
) -> StatusCode {
    match serde_json::from_slice::<Beacon>(&body) {
        Ok(beacon) => record(&state, &visitor, beacon).await,
        Err(e) => tracing::debug!(error = %e, "Malformed beacon ignored"),
    }
    StatusCode::NO_CONTENT
}

async fn record(state: &AppState, visitor: &VisitorContext, beacon: Beacon) {
    let Ok(name) = beacon.event_name.parse::<EventName>() else {
        tracing::debug!(event = %beacon.event_name, "Unknown beacon event ignored");
        return;
    };
    if !name.accepted_from_browser() {
        tracing::debug!(event = %name, "Server-only event rejected from beacon");
        return;
    }

    if name == EventName::ScrollDepth {
        let (Some(page_id), Some(top), Some(viewport), Some(height)) = (
            beacon.page_id.as_deref(),
            beacon.scroll_top,
            beacon.viewport_height,
            beacon.document_height,
        ) else {
            return;
        };
        if page_id.is_empty() || page_id.len() > MAX_PAGE_ID_LEN {
            return;
        }
        state
            .analytics()
            .scroll_depth(visitor, page_id, scroll_percent(top, viewport, height))
            .await;
        return;
    }

    state.analytics().track(
        visitor,
        name,
        beacon.source.as_deref(),
        sanitize_meta(beacon.meta),
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_beacon_body_defaults() {
        let beacon: Beacon =
            serde_json::from_str(r#"{"event_name":"portfolio_opened","meta":{"id":"3"}}"#).unwrap();
        assert_eq!(beacon.event_name, "portfolio_opened");
        assert_eq!(beacon.source, None);
        assert_eq!(beacon.meta.get("id"), Some(&Value::String("3".to_string())));
        assert_eq!(beacon.page_id, None);
    }

    #[test]
    fn test_scroll_beacon_body() {
        let beacon: Beacon = serde_json::from_str(
            r#"{"event_name":"scroll_depth","page_id":"abc","scroll_top":500,"viewport_height":500,"document_height":2000}"#,
        )
        .unwrap();
        assert_eq!(beacon.page_id.as_deref(), Some("abc"));
        let percent = scroll_percent(
            beacon.scroll_top.unwrap(),
            beacon.viewport_height.unwrap(),
            beacon.document_height.unwrap(),
        );
        assert!((percent - 50.0).abs() < f64::EPSILON);
    }
}
