//! Backend resources managed from the dashboard.
//!
//! Field names follow the backend's camelCase JSON. Each resource has a
//! full representation (as returned by the API), a `New*` payload for
//! creation and a `*Patch` payload whose `None` fields are left untouched.

pub mod category;
pub mod product;
pub mod store;
pub mod user;

pub use category::{Category, CategoryPatch, NewCategory};
pub use product::{NewProduct, Product, ProductPatch};
pub use store::{Store, StoreField, StoreFieldError, StorePatch};
pub use user::UserProfile;
