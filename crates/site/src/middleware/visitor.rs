//! Visitor context extractor.
//!
//! Builds the [`VisitorContext`] that every analytics event and lead is
//! attributed to. The anonymous id is created on first visit and kept in the
//! visitor's session; UTM parameters on the current URL replace any stored
//! earlier.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use lummi_core::{Utm, VisitorContext};
use tower_sessions::Session;

use crate::middleware::rate_limit::client_ip;
use crate::models::session_keys;
use crate::state::AppState;

/// Extractor yielding the current visitor's analytics context.
///
/// Never rejects: if the session store misbehaves the visitor is simply
/// anonymous for this request.
pub struct Visitor(pub VisitorContext);

impl FromRequestParts<AppState> for Visitor {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ip_hash = state
            .analytics()
            .ip_hash(client_ip(&parts.headers, &parts.extensions));

        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            return Ok(Self(VisitorContext {
                ip_hash,
                ..VisitorContext::default()
            }));
        };

        let session_id = visitor_id(&session).await;
        let utm = campaign(&session, parts.uri.query()).await;

        Ok(Self(VisitorContext {
            session_id,
            utm,
            ip_hash,
        }))
    }
}

/// Stored visitor id, or a new one persisted to the session.
async fn visitor_id(session: &Session) -> Option<String> {
    match session.get::<String>(session_keys::VISITOR_ID).await {
        Ok(Some(id)) if VisitorContext::is_valid_session_id(&id) => Some(id),
        Ok(_) => {
            let id = VisitorContext::generate_session_id();
            if let Err(e) = session.insert(session_keys::VISITOR_ID, &id).await {
                tracing::warn!(error = %e, "Failed to persist visitor id");
            }
            Some(id)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read visitor id");
            None
        }
    }
}

/// UTM set from the query string when present, else the stored one.
async fn campaign(session: &Session, query: Option<&str>) -> Utm {
    let fresh = query
        .map(|q| Utm::from_pairs(url::form_urlencoded::parse(q.as_bytes())))
        .unwrap_or_default();

    if !fresh.is_empty() {
        if let Err(e) = session.insert(session_keys::UTM, &fresh).await {
            tracing::warn!(error = %e, "Failed to persist UTM parameters");
        }
        return fresh;
    }

    session
        .get::<Utm>(session_keys::UTM)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_visitor_id_is_generated_once() {
        let session = session();
        let first = visitor_id(&session).await.unwrap();
        let second = visitor_id(&session).await.unwrap();
        assert!(VisitorContext::is_valid_session_id(&first));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_malformed_visitor_id_is_replaced() {
        let session = session();
        session
            .insert(session_keys::VISITOR_ID, "not-an-id")
            .await
            .unwrap();
        let id = visitor_id(&session).await.unwrap();
        assert!(VisitorContext::is_valid_session_id(&id));
    }

    #[tokio::test]
    async fn test_utm_overwrites_and_persists() {
        let session = session();

        let first = campaign(&session, Some("utm_source=instagram&utm_campaign=verao")).await;
        assert_eq!(first.utm_source.as_deref(), Some("instagram"));

        // No UTM on a later page: the stored set is reused
        let later = campaign(&session, Some("categoria=JDM")).await;
        assert_eq!(later, first);

        let replaced = campaign(&session, Some("utm_source=google")).await;
        assert_eq!(replaced.utm_source.as_deref(), Some("google"));
        assert_eq!(replaced.utm_campaign, None);
    }
}
