//! Diagnostic form: lead intake and `WhatsApp` handoff.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use lummi_core::{
    DIAGNOSTIC_SOURCE, EventName, LeadSubmission, NewLead, VisitorContext, whatsapp,
};
use lummi_supabase::SupabaseError;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::filters;
use crate::middleware::Visitor;
use crate::routes::home::load_settings;
use crate::state::AppState;

/// Header set by the page script when it wants only the step fragment.
pub const FRAGMENT_HEADER: &str = "x-fragment";

/// Delay before the page script opens the handoff link.
pub const HANDOFF_DELAY_MS: u32 = 1500;

pub const MISSING_FIELDS_MESSAGE: &str =
    "Preencha nome, WhatsApp, modelo do carro e cidade para continuar.";

pub const PERSISTENCE_WARNING: &str =
    "Não foi possível registrar seu pedido agora. Pode chamar no WhatsApp mesmo assim.";

/// Values echoed back into the form, plus an inline error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticForm {
    pub name: String,
    pub whatsapp: String,
    pub car_model: String,
    pub city: String,
    pub error: Option<&'static str>,
}

impl DiagnosticForm {
    fn with_error(submission: &LeadSubmission, error: &'static str) -> Self {
        Self {
            name: submission.name.clone(),
            whatsapp: submission.whatsapp.clone(),
            car_model: submission.car_model.clone(),
            city: submission.city.clone(),
            error: Some(error),
        }
    }
}

/// The "Solicitação Recebida!" step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessStep {
    pub handoff_url: String,
    pub resume_url: String,
    pub delay_ms: u32,
    pub warning: Option<&'static str>,
}

/// Just the diagnostic block, for the page script.
#[derive(Template, WebTemplate)]
#[template(path = "partials/diagnostic.html")]
pub struct DiagnosticFragment {
    pub form: DiagnosticForm,
    pub success: Option<SuccessStep>,
}

/// The diagnostic block on its own page, for plain form posts.
#[derive(Template, WebTemplate)]
#[template(path = "diagnostic.html")]
pub struct DiagnosticPage {
    pub form: DiagnosticForm,
    pub success: Option<SuccessStep>,
}

fn wants_fragment(headers: &HeaderMap) -> bool {
    headers
        .get(FRAGMENT_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "1")
}

fn render(fragment: bool, form: DiagnosticForm, success: Option<SuccessStep>) -> Response {
    if fragment {
        DiagnosticFragment { form, success }.into_response()
    } else {
        DiagnosticPage { form, success }.into_response()
    }
}

/// Handle a diagnostic submission.
///
/// The handoff link is produced whether or not the lead was stored.
#[instrument(skip(state, visitor, headers, submission))]
pub async fn submit(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
    headers: HeaderMap,
    Form(submission): Form<LeadSubmission>,
) -> Response {
    let fragment = wants_fragment(&headers);

    if submission.is_bot() {
        tracing::info!("Honeypot filled, submission ignored");
        return render(fragment, DiagnosticForm::default(), None);
    }

    let echo = submission.clone();
    let lead = match submission.into_new_lead(visitor.session_id.clone(), visitor.utm.clone()) {
        Ok(lead) => lead,
        Err(e) => {
            tracing::debug!(error = %e, "Diagnostic form incomplete");
            return render(
                fragment,
                DiagnosticForm::with_error(&echo, MISSING_FIELDS_MESSAGE),
                None,
            );
        }
    };

    let warning = persist(&state, &visitor, &lead).await;

    let settings = load_settings(&state).await;
    let handoff_url = whatsapp::link(
        &settings.whatsapp_number,
        &whatsapp::diagnostic_message(&lead.name, &lead.city, &lead.car_model),
    );
    state.analytics().track(
        &visitor,
        EventName::CtaWhatsappClick,
        Some(DIAGNOSTIC_SOURCE),
        Map::new(),
    );

    let step = SuccessStep {
        handoff_url,
        resume_url: whatsapp::link(&settings.whatsapp_number, whatsapp::RESUME_MESSAGE),
        delay_ms: HANDOFF_DELAY_MS,
        warning,
    };
    render(fragment, DiagnosticForm::default(), Some(step))
}

/// Store the lead. Returns the warning to show when that failed.
async fn persist(
    state: &AppState,
    visitor: &VisitorContext,
    lead: &NewLead,
) -> Option<&'static str> {
    let result = match state.supabase() {
        Some(client) => client.insert_lead(lead).await,
        None => Err(SupabaseError::NotConfigured),
    };

    match result {
        Ok(()) => {
            tracing::info!(source = %lead.source, "Lead recorded");
            state.analytics().track(
                visitor,
                EventName::LeadSubmitted,
                Some(DIAGNOSTIC_SOURCE),
                Map::new(),
            );
            None
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to record lead");
            let mut meta = Map::new();
            meta.insert("msg".to_owned(), Value::String(e.to_string()));
            state.analytics().track(
                visitor,
                EventName::LeadInsertFailed,
                Some(DIAGNOSTIC_SOURCE),
                lummi_core::sanitize_meta(meta),
            );
            Some(PERSISTENCE_WARNING)
        }
    }
}
