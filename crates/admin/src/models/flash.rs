//! Toast messages carried across a post/redirect/get.
//!
//! Handlers redirect with `?toast=<code>` or `?error=<code>`. Only known
//! codes map to text, so the query string can never inject copy into the
//! page.

use serde::Deserialize;

/// Success toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashNotice {
    StatusUpdated,
    SettingsSaved,
    PortfolioCreated,
    PortfolioUpdated,
    TestimonialCreated,
    TestimonialUpdated,
}

impl FlashNotice {
    const ALL: [Self; 6] = [
        Self::StatusUpdated,
        Self::SettingsSaved,
        Self::PortfolioCreated,
        Self::PortfolioUpdated,
        Self::TestimonialCreated,
        Self::TestimonialUpdated,
    ];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::StatusUpdated => "status_updated",
            Self::SettingsSaved => "settings_saved",
            Self::PortfolioCreated => "portfolio_created",
            Self::PortfolioUpdated => "portfolio_updated",
            Self::TestimonialCreated => "testimonial_created",
            Self::TestimonialUpdated => "testimonial_updated",
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::StatusUpdated => "Status atualizado.",
            Self::SettingsSaved => "Configurações salvas com sucesso.",
            Self::PortfolioCreated => "Item criado.",
            Self::PortfolioUpdated => "Portfólio atualizado.",
            Self::TestimonialCreated => "Depoimento criado.",
            Self::TestimonialUpdated => "Depoimento atualizado.",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|notice| notice.code() == code)
    }
}

/// Error toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashError {
    SaveFailed,
    CreateFailed,
    InvalidStatus,
    InvalidOrder,
    NotFound,
}

impl FlashError {
    const ALL: [Self; 5] = [
        Self::SaveFailed,
        Self::CreateFailed,
        Self::InvalidStatus,
        Self::InvalidOrder,
        Self::NotFound,
    ];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::SaveFailed => "save_failed",
            Self::CreateFailed => "create_failed",
            Self::InvalidStatus => "invalid_status",
            Self::InvalidOrder => "invalid_order",
            Self::NotFound => "not_found",
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::SaveFailed => "Não foi possível salvar. Tente novamente.",
            Self::CreateFailed => "Não foi possível criar o item.",
            Self::InvalidStatus => "Status inválido.",
            Self::InvalidOrder => "Informe um número válido.",
            Self::NotFound => "Registro não encontrado.",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|error| error.code() == code)
    }
}

/// Query parameters read by every list screen.
#[derive(Debug, Default, Deserialize)]
pub struct FlashQuery {
    pub toast: Option<String>,
    pub error: Option<String>,
}

/// Resolved toast for the layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flash {
    pub notice: Option<&'static str>,
    pub error: Option<&'static str>,
}

impl Flash {
    /// Map query codes to messages; unknown codes are dropped.
    #[must_use]
    pub fn from_codes(toast: Option<&str>, error: Option<&str>) -> Self {
        Self {
            notice: toast
                .and_then(FlashNotice::from_code)
                .map(FlashNotice::message),
            error: error.and_then(FlashError::from_code).map(FlashError::message),
        }
    }

    #[must_use]
    pub fn from_query(query: &FlashQuery) -> Self {
        Self::from_codes(query.toast.as_deref(), query.error.as_deref())
    }
}

/// `path?toast=<code>`.
#[must_use]
pub fn with_notice(path: &str, notice: FlashNotice) -> String {
    format!("{path}{}toast={}", separator(path), notice.code())
}

/// `path?error=<code>`.
#[must_use]
pub fn with_error(path: &str, error: FlashError) -> String {
    format!("{path}{}error={}", separator(path), error.code())
}

fn separator(path: &str) -> char {
    if path.contains('?') { '&' } else { '?' }
}
