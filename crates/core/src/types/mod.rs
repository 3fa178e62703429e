//! Core types for the petshop dashboard.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod geo;
pub mod id;
pub mod price;
pub mod record;

pub use email::{Email, EmailError};
pub use geo::{LatLng, LatLngError};
pub use id::*;
pub use price::{Price, PriceError};
pub use record::{Identified, Record};
