//! Petshop admin dashboard library.
//!
//! Everything the dashboard does short of drawing pixels: the persisted
//! session, the authenticated HTTP client, resource services, view models,
//! page controllers, routing, and the store location picker. A front end
//! (the `petshop` CLI, or a GUI) drives it through [`state::Dashboard`].
//!
//! # Layers
//!
//! - [`session`] - Token and user profile, mirrored into durable storage
//! - [`api`] - Envelope-aware HTTP client with single-flight token refresh
//! - [`services`] - Auth, product, category, and store endpoints
//! - [`view_models`] - Loading/error state and notifications per resource
//! - [`pages`] - Dialog state and submit handling per screen
//! - [`forms`] - Validation run before anything is sent
//! - [`routes`] - Paths, titles, and the sign-in guard
//! - [`maps`] - Geocoding-backed location picker for the store form

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod forms;
pub mod maps;
pub mod pages;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod view_models;

pub use state::Dashboard;
