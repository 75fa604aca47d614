//! Services used by route handlers.

pub mod analytics;

pub use analytics::Analytics;
