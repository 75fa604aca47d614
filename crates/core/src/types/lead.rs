//! Leads captured by the diagnostic form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::LeadId;
use super::serde_ext::{lenient_parse, null_as_default};
use super::utm::Utm;

/// `source` tag written for leads created by the diagnostic form.
pub const DIAGNOSTIC_SOURCE: &str = "diagnostico";

/// Lead lifecycle status.
///
/// Transitions are unconstrained: any status may be set from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Won,
    Lost,
}

impl LeadStatus {
    pub const ALL: [Self; 4] = [Self::New, Self::Contacted, Self::Won, Self::Lost];

    /// Column value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }

    /// Label shown in the admin panel.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "Novo",
            Self::Contacted => "Contactado",
            Self::Won => "Fechado",
            Self::Lost => "Perdido",
        }
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "contacted" => Ok(Self::Contacted),
            "won" => Ok(Self::Won),
            "lost" => Ok(Self::Lost),
            _ => Err(format!("invalid lead status: {s}")),
        }
    }
}

/// Package a lead is interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageTier {
    Starter,
    Pro,
    Legend,
}

impl PackageTier {
    pub const ALL: [Self; 3] = [Self::Starter, Self::Pro, Self::Legend];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starter => "STARTER",
            Self::Pro => "PRO",
            Self::Legend => "LEGEND",
        }
    }

    /// Commercial name used on the landing page and in chat messages.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Starter => "Starter",
            Self::Pro => "Pro Build",
            Self::Legend => "Legend",
        }
    }
}

impl std::str::FromStr for PackageTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STARTER" => Ok(Self::Starter),
            "PRO" => Ok(Self::Pro),
            "LEGEND" => Ok(Self::Legend),
            _ => Err(format!("invalid package tier: {s}")),
        }
    }
}

/// A row of the `leads` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub whatsapp: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub car_model: Option<String>,
    #[serde(default, deserialize_with = "lenient_parse")]
    pub package_interest: Option<PackageTier>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(flatten)]
    pub utm: Utm,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_parse")]
    pub status: Option<LeadStatus>,
    #[serde(default)]
    pub consent: Option<bool>,
}

impl Lead {
    /// Status with the backend default applied to `null`.
    #[must_use]
    pub fn current_status(&self) -> LeadStatus {
        self.status.unwrap_or_default()
    }
}

/// Insert payload for the `leads` table.
///
/// `id`, `created_at` and `status` are left to backend defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewLead {
    pub name: String,
    pub whatsapp: String,
    pub city: String,
    pub car_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_interest: Option<PackageTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub source: String,
    pub consent: bool,
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub honeypot: Option<String>,
    #[serde(flatten)]
    pub utm: Utm,
}

/// Errors raised while turning a submission into a [`NewLead`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LeadError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// Raw diagnostic form submission.
///
/// `website` is the honeypot: it is hidden from people and only bots fill it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub whatsapp: String,
    #[serde(default)]
    pub car_model: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub website: String,
}

impl LeadSubmission {
    /// True when the honeypot was filled in.
    #[must_use]
    pub fn is_bot(&self) -> bool {
        !self.website.trim().is_empty()
    }

    /// Validate the four required fields and build the insert payload.
    ///
    /// # Errors
    ///
    /// Returns [`LeadError::MissingFields`] naming every blank required field.
    pub fn into_new_lead(self, session_id: Option<String>, utm: Utm) -> Result<NewLead, LeadError> {
        let name = self.name.trim().to_owned();
        let whatsapp = self.whatsapp.trim().to_owned();
        let car_model = self.car_model.trim().to_owned();
        let city = self.city.trim().to_owned();

        let missing: Vec<&'static str> = [
            ("name", &name),
            ("whatsapp", &whatsapp),
            ("car_model", &car_model),
            ("city", &city),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(LeadError::MissingFields(missing));
        }

        Ok(NewLead {
            name,
            whatsapp,
            city,
            car_model,
            package_interest: None,
            message: None,
            source: DIAGNOSTIC_SOURCE.to_owned(),
            consent: true,
            session_id,
            honeypot: None,
            utm,
        })
    }
}

/// In-memory filter applied to the loaded page of leads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    pub search: String,
}

impl LeadFilter {
    #[must_use]
    pub fn matches(&self, lead: &Lead) -> bool {
        if let Some(status) = self.status
            && lead.current_status() != status
        {
            return false;
        }

        let query = self.search.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        lead.name.to_lowercase().contains(&query) || lead.whatsapp.contains(&query)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn submission() -> LeadSubmission {
        LeadSubmission {
            name: " João ".to_owned(),
            whatsapp: "11999998888".to_owned(),
            car_model: "Civic Si".to_owned(),
            city: "São Paulo".to_owned(),
            website: String::new(),
        }
    }

    fn lead(name: &str, whatsapp: &str, status: Option<LeadStatus>) -> Lead {
        serde_json::from_value(serde_json::json!({
            "id": "0f8fad5b-d9cb-469f-a165-70867728950e",
            "name": name,
            "whatsapp": whatsapp,
            "status": status,
        }))
        .unwrap()
    }

    #[test]
    fn test_submission_builds_diagnostic_lead() {
        let lead = submission()
            .into_new_lead(Some("sess_abc".to_owned()), Utm::default())
            .unwrap();
        assert_eq!(lead.name, "João");
        assert_eq!(lead.source, DIAGNOSTIC_SOURCE);
        assert!(lead.consent);
        assert_eq!(lead.session_id.as_deref(), Some("sess_abc"));
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let mut form = submission();
        form.city = "   ".to_owned();
        form.car_model = String::new();
        let err = form.into_new_lead(None, Utm::default()).unwrap_err();
        assert_eq!(err, LeadError::MissingFields(vec!["car_model", "city"]));
    }

    #[test]
    fn test_honeypot_detection_trims() {
        let mut form = submission();
        assert!(!form.is_bot());
        form.website = "  ".to_owned();
        assert!(!form.is_bot());
        form.website = "http://spam.example".to_owned();
        assert!(form.is_bot());
    }

    #[test]
    fn test_new_lead_payload_shape() {
        let utm = Utm::from_pairs([("utm_source", "ig")]);
        let lead = submission().into_new_lead(None, utm).unwrap();
        let json = serde_json::to_value(&lead).unwrap();
        assert_eq!(json["source"], "diagnostico");
        assert_eq!(json["consent"], true);
        assert_eq!(json["utm_source"], "ig");
        assert!(json.get("honeypot").is_none());
        assert!(json.get("status").is_none());
    }

    #[test]
    fn test_status_roundtrip_and_labels() {
        for status in LeadStatus::ALL {
            assert_eq!(status.as_str().parse::<LeadStatus>().unwrap(), status);
        }
        assert_eq!(LeadStatus::Won.label(), "Fechado");
        assert!("archived".parse::<LeadStatus>().is_err());
    }

    #[test]
    fn test_null_status_reads_as_new() {
        assert_eq!(lead("Ana", "1", None).current_status(), LeadStatus::New);
    }

    #[test]
    fn test_incomplete_rows_still_decode() {
        let leads: Vec<Lead> = serde_json::from_value(serde_json::json!([
            { "id": "0f8fad5b-d9cb-469f-a165-70867728950e", "name": "Ana", "whatsapp": "1",
              "status": "won", "utm_source": "instagram" },
            { "id": "1f8fad5b-d9cb-469f-a165-70867728950e", "name": null,
              "status": "archived", "package_interest": "MEGA" },
        ]))
        .unwrap();
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].current_status(), LeadStatus::Won);
        assert_eq!(leads[0].utm.utm_source.as_deref(), Some("instagram"));
        assert_eq!(leads[1].name, "");
        assert_eq!(leads[1].whatsapp, "");
        assert_eq!(leads[1].current_status(), LeadStatus::New);
        assert!(leads[1].package_interest.is_none());
    }

    #[test]
    fn test_filter_by_status_and_search() {
        let contacted = lead("Bruno Lima", "21988887777", Some(LeadStatus::Contacted));
        let filter = LeadFilter {
            status: Some(LeadStatus::Contacted),
            search: "bruno".to_owned(),
        };
        assert!(filter.matches(&contacted));

        let by_phone = LeadFilter {
            status: None,
            search: "8888".to_owned(),
        };
        assert!(by_phone.matches(&contacted));

        let wrong_status = LeadFilter {
            status: Some(LeadStatus::Lost),
            search: String::new(),
        };
        assert!(!wrong_status.matches(&contacted));
    }
}
