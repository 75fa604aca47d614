use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to Supabase.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// No backend URL/key was provided to this process.
    #[error("Supabase is not configured")]
    NotConfigured,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// PostgREST or GoTrue answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// A request URL could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl SupabaseError {
    /// HTTP status returned by the backend, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for an inline form error.
    ///
    /// Backend messages are passed through (GoTrue phrases them for end
    /// users); transport failures get a generic line.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotConfigured => "Supabase não configurado.".to_string(),
            Self::Api { message, .. } => message.clone(),
            Self::RateLimited(_) => {
                "Muitas tentativas. Aguarde um instante e tente novamente.".to_string()
            }
            Self::Http(_) | Self::Parse(_) | Self::InvalidRequest(_) => {
                "Não foi possível falar com o servidor agora.".to_string()
            }
        }
    }
}

/// Error body shapes returned by PostgREST and GoTrue.
///
/// PostgREST: `{ code, message, details, hint }`.
/// GoTrue: `{ error, error_description }` or `{ code, error_code, msg }`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Build an [`SupabaseError::Api`] from a status and raw body.
    pub(crate) fn into_error(status: u16, body: &str) -> SupabaseError {
        let parsed: Self = serde_json::from_str(body).unwrap_or_default();
        let code = parsed.error_code.clone().or_else(|| {
            parsed.code.as_ref().map(|c| match c {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
        });
        let message = parsed
            .message
            .or(parsed.error_description)
            .or(parsed.msg)
            .or(parsed.error)
            .unwrap_or_else(|| format!("HTTP {status}: {}", truncate(body, 200)));

        SupabaseError::Api {
            status,
            code,
            message,
        }
    }
}

pub(crate) fn truncate(body: &str, max: usize) -> String {
    body.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgrest_error_body() {
        let err = ErrorBody::into_error(
            400,
            r#"{"code":"22P02","message":"invalid input syntax for type uuid","details":null,"hint":null}"#,
        );
        match err {
            SupabaseError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(code.as_deref(), Some("22P02"));
                assert_eq!(message, "invalid input syntax for type uuid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_gotrue_error_body() {
        let err = ErrorBody::into_error(
            400,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(err.user_message(), "Invalid login credentials");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_unparseable_body_falls_back_to_status() {
        let err = ErrorBody::into_error(502, "<html>bad gateway</html>");
        assert!(err.to_string().contains("HTTP 502"));
    }
}
