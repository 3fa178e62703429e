//! Backend-facing services for the dashboard.
//!
//! # Services
//!
//! - `auth` - Email/password sign-in and session lifecycle
//! - `resources` - Product and category endpoints
//! - `store` - Store profile endpoints

pub mod auth;
pub mod resources;
pub mod store;

pub use auth::AuthService;
pub use resources::{Categories, CategoryApi, IdOf, ProductApi, Products, Resource, ResourceApi};
pub use store::StoreApi;
