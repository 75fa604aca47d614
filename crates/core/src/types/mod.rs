//! Domain types for Lummi.
//!
//! Each backend table has exactly one serde mapping here. Column names are the
//! canonical schema; legacy shapes are rewritten by [`crate::migrate`] rather
//! than guessed at read time.

pub mod analytics;
pub mod content;
pub mod dashboard;
pub mod id;
pub mod lead;
pub mod profile;
mod serde_ext;
pub mod settings;
pub mod utm;

pub use analytics::{
    EventName, NewEvent, SCROLL_THRESHOLDS, ScrollDepthTracker, VisitorContext, sanitize_meta,
    scroll_percent,
};
pub use content::{
    CategoryFilter, Gallery, NewPortfolioItem, NewTestimonial, PortfolioCard, PortfolioCategory,
    PortfolioItem, Testimonial, TestimonialCard, parse_media_urls,
};
pub use dashboard::{BreakdownRow, DashboardReport, DashboardSummary, DashboardWindow};
pub use id::*;
pub use lead::{
    DIAGNOSTIC_SOURCE, Lead, LeadError, LeadFilter, LeadStatus, LeadSubmission, NewLead,
    PackageTier,
};
pub use profile::{Profile, ProfileUpdate};
pub use settings::{SettingKey, SettingRow, SettingsErrors, SettingsInput, SiteSettings};
pub use utm::Utm;
