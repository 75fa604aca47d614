//! Access decisions for the customer and admin areas.
//!
//! A gate goes from "unknown" to exactly one terminal decision. On the server
//! the unknown state never renders: extractors resolve the decision before a
//! handler runs.
//!
//! ```text
//! backend configured? ── no ──▶ Unconfigured
//!        │ yes
//! signed in? ──────────── no ──▶ RedirectToLogin
//!        │ yes
//! (admin only) is_admin() ─ false ─▶ Denied(NotAdmin)
//!        │                 error ─▶ Denied(CheckFailed)
//!        ▼ true
//!    Authorized
//! ```

/// Why an authenticated user was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// The privilege check answered `false`.
    NotAdmin,
    /// The privilege check itself failed. Not retried.
    CheckFailed,
}

impl DenialReason {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotAdmin => {
                "Seu usuário não tem permissão para acessar o painel administrativo."
            }
            Self::CheckFailed => "Falha ao validar permissões.",
        }
    }
}

/// Terminal outcome of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Authorized,
    RedirectToLogin,
    Denied(DenialReason),
    Unconfigured,
}

impl AccessDecision {
    /// Decision from configuration and session presence alone.
    ///
    /// This is the whole customer gate, and the first step of the admin gate.
    #[must_use]
    pub const fn for_session(backend_configured: bool, signed_in: bool) -> Self {
        if !backend_configured {
            Self::Unconfigured
        } else if !signed_in {
            Self::RedirectToLogin
        } else {
            Self::Authorized
        }
    }

    /// Decision from the admin privilege check.
    ///
    /// Errors become denials: a transient failure is indistinguishable from a
    /// genuine "no".
    #[must_use]
    pub const fn for_privilege_check<E>(result: &Result<bool, E>) -> Self {
        match result {
            Ok(true) => Self::Authorized,
            Ok(false) => Self::Denied(DenialReason::NotAdmin),
            Err(_) => Self::Denied(DenialReason::CheckFailed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_decisions() {
        assert_eq!(
            AccessDecision::for_session(false, true),
            AccessDecision::Unconfigured
        );
        assert_eq!(
            AccessDecision::for_session(true, false),
            AccessDecision::RedirectToLogin
        );
        assert_eq!(
            AccessDecision::for_session(true, true),
            AccessDecision::Authorized
        );
    }

    #[test]
    fn test_privilege_decisions() {
        assert_eq!(
            AccessDecision::for_privilege_check::<()>(&Ok(true)),
            AccessDecision::Authorized
        );
        assert_eq!(
            AccessDecision::for_privilege_check::<()>(&Ok(false)),
            AccessDecision::Denied(DenialReason::NotAdmin)
        );
        assert_eq!(
            AccessDecision::for_privilege_check(&Err("timeout")),
            AccessDecision::Denied(DenialReason::CheckFailed)
        );
    }
}
