//! Petshop Core - shared domain types for the admin dashboard.
//!
//! This crate provides the types used across all petshop components:
//! - `admin` - Dashboard library (session, HTTP client, view models, maps)
//! - `cli` - Command-line front end for the dashboard
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, coordinates
//!   and the draft/existing record distinction
//! - [`models`] - Backend resources (products, categories, store, user profile)
//!   and their create/patch payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
