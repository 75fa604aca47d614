//! Prefilled WhatsApp deep links.
//!
//! Every conversion path on the site ends in a `wa.me` link carrying a
//! message that identifies where the visitor came from.

use crate::types::{Lead, PackageTier};

const BASE_URL: &str = "https://wa.me";

/// Strip everything but ASCII digits from a phone number.
#[must_use]
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// `https://wa.me/<digits>?text=<percent-encoded text>`.
#[must_use]
pub fn link(number: &str, text: &str) -> String {
    format!(
        "{BASE_URL}/{}?text={}",
        digits_only(number),
        urlencoding::encode(text)
    )
}

/// Link with no prefilled message.
#[must_use]
pub fn bare_link(number: &str) -> String {
    format!("{BASE_URL}/{}", digits_only(number))
}

/// Message sent after the diagnostic form.
#[must_use]
pub fn diagnostic_message(name: &str, city: &str, car_model: &str) -> String {
    format!(
        "Fala Team Lummi! Me chamo {name} de {city}. Tenho um {car_model} e acabei de \
         preencher a Rota de Estilo no site. Quero saber qual visual combina mais com meu projeto."
    )
}

/// Message used by the manual fallback link after the diagnostic.
pub const RESUME_MESSAGE: &str = "Retomando";

#[must_use]
pub fn portfolio_message(title: &str) -> String {
    format!("Vi o projeto {title} e quero algo parecido.")
}

#[must_use]
pub fn package_message(tier: PackageTier) -> String {
    format!("Tenho interesse no pacote {}", tier.display_name())
}

/// Follow-up sent from the admin leads screen.
#[must_use]
pub fn lead_followup_message(lead: &Lead) -> String {
    let car = lead
        .car_model
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or("carro");
    let package = lead
        .package_interest
        .map_or("Lummi", PackageTier::display_name);
    format!(
        "Olá {}! Sobre seu {car} no pacote {package} - podemos conversar?",
        lead.name
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("+55 (11) 99999-8888"), "5511999998888");
        assert_eq!(digits_only("abc"), "");
    }

    #[test]
    fn test_diagnostic_link_encodes_message() {
        let text = diagnostic_message("João", "São Paulo", "Civic Si");
        let url = link("55 11 99999-9999", &text);
        assert!(url.starts_with("https://wa.me/5511999999999?text="));
        assert!(url.contains("Civic%20Si"));
        assert!(url.contains("S%C3%A3o%20Paulo"));
        assert!(url.contains("Jo%C3%A3o"));
        assert!(!url.contains(' '));
    }

    #[test]
    fn test_package_and_portfolio_messages() {
        assert_eq!(
            package_message(PackageTier::Pro),
            "Tenho interesse no pacote Pro Build"
        );
        assert_eq!(
            portfolio_message("Underground Z"),
            "Vi o projeto Underground Z e quero algo parecido."
        );
        assert_eq!(bare_link("+55 11"), "https://wa.me/5511");
    }

    #[test]
    fn test_followup_defaults() {
        let lead: Lead = serde_json::from_value(serde_json::json!({
            "id": "0f8fad5b-d9cb-469f-a165-70867728950e",
            "name": "Ana",
            "whatsapp": "11988887777",
        }))
        .unwrap();
        assert_eq!(
            lead_followup_message(&lead),
            "Olá Ana! Sobre seu carro no pacote Lummi - podemos conversar?"
        );
    }
}
