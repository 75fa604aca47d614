//! Lummi Core - Shared domain types.
//!
//! This crate provides the types and pure helpers used by every Lummi component:
//! - `site` - Public landing page, lead intake and customer account
//! - `admin` - Admin panel for leads, settings, portfolio and testimonials
//! - `cli` - Operator tooling and one-time data migrations
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no clocks except where a caller passes a timestamp in. Everything
//! remote lives in `lummi-supabase`.
//!
//! # Modules
//!
//! - [`types`] - Canonical row mappings for the backend tables
//! - [`access`] - Gate decisions for customer and admin areas
//! - [`whatsapp`] - Prefilled WhatsApp deep links
//! - [`migrate`] - Rewrites of legacy row shapes into the canonical schema

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod migrate;
pub mod types;
pub mod whatsapp;

pub use access::{AccessDecision, DenialReason};
pub use types::*;
