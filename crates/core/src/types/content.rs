//! Portfolio items and testimonials.
//!
//! Rows come from `portfolio_items` and `testimonials`. The public site maps
//! them to cards through [`PortfolioCard::from_item`] and
//! [`TestimonialCard::from_row`], and falls back to a fixed placeholder set
//! when nothing usable comes back.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::id::{PortfolioItemId, TestimonialId};
use super::serde_ext::{lenient_parse, null_as_default};

/// Title shown when a row has none.
pub const DEFAULT_TITLE: &str = "Projeto Lummi";

/// Description shown in the detail overlay when a row has none.
pub const DEFAULT_DESCRIPTION: &str =
    "Projeto desenvolvido para destacar as modificações e a assinatura visual do cliente.";

/// Cover shown when a row has no image.
pub const DEFAULT_COVER_URL: &str =
    "https://images.unsplash.com/photo-1621213344654-e7c65691129b?q=80&w=800";

/// Style tag of a portfolio item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortfolioCategory {
    #[serde(rename = "STREET")]
    Street,
    #[serde(rename = "RAIN NIGHT")]
    RainNight,
    #[serde(rename = "TRACK DAY")]
    TrackDay,
    #[serde(rename = "DRIFT")]
    Drift,
    #[serde(rename = "STANCE")]
    Stance,
    #[serde(rename = "GARAGE")]
    Garage,
}

impl PortfolioCategory {
    pub const ALL: [Self; 6] = [
        Self::Street,
        Self::RainNight,
        Self::TrackDay,
        Self::Drift,
        Self::Stance,
        Self::Garage,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Street => "STREET",
            Self::RainNight => "RAIN NIGHT",
            Self::TrackDay => "TRACK DAY",
            Self::Drift => "DRIFT",
            Self::Stance => "STANCE",
            Self::Garage => "GARAGE",
        }
    }
}

impl std::fmt::Display for PortfolioCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PortfolioCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("invalid portfolio category: {s}"))
    }
}

/// A row of the `portfolio_items` table.
///
/// Also the upsert payload for admin saves, so every editable column is
/// serialized even when `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub id: PortfolioItemId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_parse")]
    pub category: Option<PortfolioCategory>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub order_index: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_published: bool,
    #[serde(default)]
    pub media_urls: Option<Value>,
}

impl PortfolioItem {
    /// Pretty-printed media JSON for editing, empty when unset.
    #[must_use]
    pub fn media_urls_text(&self) -> String {
        self.media_urls
            .as_ref()
            .and_then(|value| serde_json::to_string_pretty(value).ok())
            .unwrap_or_default()
    }
}

/// Insert payload for a fresh portfolio draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPortfolioItem {
    pub title: String,
    pub category: PortfolioCategory,
    pub order_index: i32,
    pub is_published: bool,
}

impl NewPortfolioItem {
    /// Unpublished draft placed after the current last item.
    #[must_use]
    pub fn draft(existing: &[PortfolioItem]) -> Self {
        Self {
            title: "Novo projeto".to_owned(),
            category: PortfolioCategory::Street,
            order_index: next_order_index(existing.iter().map(|item| item.order_index)),
            is_published: false,
        }
    }
}

/// Parse the free-form media URL field.
///
/// Blank input clears the column.
///
/// # Errors
///
/// Returns the JSON error when the text is not valid JSON; callers must not
/// save in that case.
pub fn parse_media_urls(raw: &str) -> Result<Option<Value>, serde_json::Error> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(raw).map(Some)
}

/// A row of the `testimonials` table; also the admin upsert payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: TestimonialId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub vehicle: Option<String>,
    #[serde(default)]
    pub quote: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub order_index: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_published: bool,
}

/// Insert payload for a fresh testimonial draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTestimonial {
    pub name: String,
    pub quote: String,
    pub order_index: i32,
    pub is_published: bool,
}

impl NewTestimonial {
    #[must_use]
    pub fn draft(existing: &[Testimonial]) -> Self {
        Self {
            name: "Novo cliente".to_owned(),
            quote: String::new(),
            order_index: next_order_index(existing.iter().map(|row| row.order_index)),
            is_published: false,
        }
    }
}

fn next_order_index(indexes: impl Iterator<Item = i32>) -> i32 {
    indexes.max().map_or(0, |max| max.saturating_add(1))
}

/// Portfolio entry as rendered on the landing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioCard {
    pub id: String,
    pub title: String,
    pub category: Option<PortfolioCategory>,
    pub cover_url: String,
    pub description: String,
    pub is_example: bool,
}

impl PortfolioCard {
    /// The single mapping from a stored row to a card.
    #[must_use]
    pub fn from_item(item: PortfolioItem) -> Self {
        Self {
            id: item.id.to_string(),
            title: non_blank(item.title).unwrap_or_else(|| DEFAULT_TITLE.to_owned()),
            category: item.category,
            cover_url: non_blank(item.cover_url).unwrap_or_else(|| DEFAULT_COVER_URL.to_owned()),
            description: non_blank(item.description)
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_owned()),
            is_example: false,
        }
    }

    /// Category tag used by the client-side filter.
    #[must_use]
    pub fn category_tag(&self) -> &'static str {
        self.category.map_or("", PortfolioCategory::as_str)
    }

    /// Fixed examples shown when the backend has nothing to offer.
    #[must_use]
    pub fn placeholders() -> Vec<Self> {
        const PLACEHOLDERS: [(&str, &str, PortfolioCategory, &str); 6] = [
            (
                "1",
                "Midnight Club Civic",
                PortfolioCategory::Street,
                "photo-1621213344654-e7c65691129b",
            ),
            (
                "2",
                "Purple Rain R34",
                PortfolioCategory::RainNight,
                "photo-1549480625-2e63c784777d",
            ),
            (
                "3",
                "Track Day Porsche",
                PortfolioCategory::TrackDay,
                "photo-1503376763036-066120622c74",
            ),
            (
                "4",
                "Bagged Golf",
                PortfolioCategory::Stance,
                "photo-1620023067645-0370f6998495",
            ),
            (
                "5",
                "Underground Z",
                PortfolioCategory::Drift,
                "photo-1606567595334-d39972c85dbe",
            ),
            (
                "6",
                "Garage Detail",
                PortfolioCategory::Garage,
                "photo-1605559424843-9e4c2287f38d",
            ),
        ];

        PLACEHOLDERS
            .into_iter()
            .map(|(id, title, category, photo)| Self {
                id: id.to_owned(),
                title: title.to_owned(),
                category: Some(category),
                cover_url: format!("https://images.unsplash.com/{photo}?q=80&w=800"),
                description: DEFAULT_DESCRIPTION.to_owned(),
                is_example: true,
            })
            .collect()
    }
}

/// Testimonial as rendered on the landing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestimonialCard {
    pub name: String,
    pub vehicle: String,
    pub quote: String,
    pub is_example: bool,
}

impl TestimonialCard {
    #[must_use]
    pub fn from_row(row: Testimonial) -> Self {
        Self {
            name: non_blank(row.name).unwrap_or_else(|| "Cliente Lummi".to_owned()),
            vehicle: non_blank(row.vehicle).unwrap_or_default(),
            quote: non_blank(row.quote).unwrap_or_default(),
            is_example: false,
        }
    }

    #[must_use]
    pub fn placeholders() -> Vec<Self> {
        [
            (
                "Cliente Verificado",
                "Lancer GT",
                "O nível de detalhe é absurdo. Meu engajamento no Reels triplicou depois que comecei a postar as edições da Lummi.",
            ),
            (
                "Cliente Verificado",
                "Golf GTI MK7",
                "Mandei fotos de celular e recebi cena de jogo. O carro nunca pareceu tão agressivo.",
            ),
            (
                "Cliente Verificado",
                "Silvia S15",
                "Entrega rápida e o color grading ficou com cara de projeto patrocinado.",
            ),
        ]
        .into_iter()
        .map(|(name, vehicle, quote)| Self {
            name: name.to_owned(),
            vehicle: vehicle.to_owned(),
            quote: quote.to_owned(),
            is_example: true,
        })
        .collect()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A public gallery after fallback resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gallery<T> {
    pub items: Vec<T>,
    /// Every entry is placeholder content and must be labeled as an example.
    pub is_example: bool,
}

impl<T> Gallery<T> {
    /// Use fetched rows, or the placeholders when the fetch failed or came
    /// back empty.
    pub fn resolve<E>(fetched: Result<Vec<T>, E>, placeholders: impl FnOnce() -> Vec<T>) -> Self {
        match fetched {
            Ok(items) if !items.is_empty() => Self {
                items,
                is_example: false,
            },
            _ => Self {
                items: placeholders(),
                is_example: true,
            },
        }
    }
}

/// Client-side category predicate over the loaded cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(PortfolioCategory),
}

impl CategoryFilter {
    /// Parse the `categoria` query value; anything unknown means all.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.parse().ok())
            .map_or(Self::All, Self::Only)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Only(category) => category.as_str(),
        }
    }

    #[must_use]
    pub fn matches(self, card: &PortfolioCard) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => card.category == Some(category),
        }
    }
}
