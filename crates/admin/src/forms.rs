//! Client-side form validation.
//!
//! Catches what can be checked before a request is sent. Anything else is
//! left to the backend, whose field errors come back through the view
//! models in the same [`FieldErrors`] shape used here.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use petshop_core::{
    Category, CategoryId, CategoryPatch, Email, NewCategory, NewProduct, Price, Product,
    ProductPatch, Store, StoreField,
};

use crate::api::FieldErrors;

/// One or more fields failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summarize(.field_errors))]
pub struct FormError {
    pub field_errors: FieldErrors,
}

fn summarize(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Collects per-field messages; the first message for a field wins.
#[derive(Default)]
struct Checker {
    errors: FieldErrors,
}

impl Checker {
    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    fn required(&mut self, field: &str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.fail(field, message);
        }
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, FormError> {
        if self.errors.is_empty() {
            Ok(value())
        } else {
            Err(FormError {
                field_errors: self.errors,
            })
        }
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Sign-in form.
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns `FormError` for a malformed email or an empty password.
    pub fn validate(&self) -> Result<Email, FormError> {
        let mut check = Checker::default();
        let email = Email::parse(&self.email)
            .map_err(|e| check.fail("email", e.to_string()))
            .ok();
        check.required("password", self.password.expose_secret(), "Password is required");
        match email {
            Some(email) => check.finish(|| email),
            None => Err(FormError {
                field_errors: check.errors,
            }),
        }
    }
}

/// Account creation form.
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns `FormError` for a missing name, a malformed email, an empty
    /// password, or a confirmation that differs from the password.
    pub fn validate(&self) -> Result<Email, FormError> {
        let mut check = Checker::default();
        check.required("name", &self.name, "Name is required");
        let email = Email::parse(&self.email)
            .map_err(|e| check.fail("email", e.to_string()))
            .ok();
        check.required("password", self.password.expose_secret(), "Password is required");
        if self.password.expose_secret() != self.confirm_password.expose_secret() {
            check.fail("password_confirmation", "Passwords do not match");
        }
        match email {
            Some(email) => check.finish(|| email),
            None => Err(FormError {
                field_errors: check.errors,
            }),
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Product editor, holding raw input text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: String,
    pub category_id: Option<CategoryId>,
    pub stock: String,
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            image: product.image.clone(),
            category_id: Some(product.category_id),
            stock: product.stock.to_string(),
        }
    }
}

impl ProductForm {
    /// # Errors
    ///
    /// Returns `FormError` when the name is empty, price or stock is not a
    /// non-negative number, or no category is chosen.
    pub fn to_draft(&self) -> Result<NewProduct, FormError> {
        let mut check = Checker::default();
        check.required("name", &self.name, "Name is required");
        let price = self
            .price
            .trim()
            .parse::<Price>()
            .map_err(|e| check.fail("price", e.to_string()))
            .unwrap_or(Price::ZERO);
        let stock = if self.stock.trim().is_empty() {
            0
        } else {
            self.stock
                .trim()
                .parse::<u32>()
                .map_err(|_| check.fail("stock", "Stock must be a whole number of zero or more"))
                .unwrap_or(0)
        };
        if self.category_id.is_none() {
            check.fail("categoryId", "Please select a category");
        }

        check.finish(|| NewProduct {
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            price,
            image: self.image.clone(),
            category_id: self.category_id,
            stock,
        })
    }

    /// The same checks as [`to_draft`](Self::to_draft), as a full patch.
    ///
    /// # Errors
    ///
    /// See [`to_draft`](Self::to_draft).
    pub fn to_patch(&self) -> Result<ProductPatch, FormError> {
        let draft = self.to_draft()?;
        Ok(ProductPatch {
            name: Some(draft.name),
            description: Some(draft.description),
            price: Some(draft.price),
            image: Some(draft.image),
            category_id: draft.category_id,
            stock: Some(draft.stock),
        })
    }
}

/// Category editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryForm {
    pub name: String,
    pub description: String,
    pub image: String,
}

impl From<&Category> for CategoryForm {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
            image: category.image.clone().unwrap_or_default(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl CategoryForm {
    /// # Errors
    ///
    /// Returns `FormError` when the name is empty.
    pub fn to_draft(&self) -> Result<NewCategory, FormError> {
        let mut check = Checker::default();
        check.required("name", &self.name, "Name is required");
        check.finish(|| NewCategory {
            name: self.name.trim().to_string(),
            description: non_empty(&self.description),
            image: non_empty(&self.image),
        })
    }

    /// # Errors
    ///
    /// Returns `FormError` when the name is empty.
    pub fn to_patch(&self) -> Result<CategoryPatch, FormError> {
        let draft = self.to_draft()?;
        Ok(CategoryPatch {
            name: Some(draft.name),
            description: draft.description,
            image: draft.image,
        })
    }
}

/// A payload that can be checked before it is sent.
///
/// Page controllers run this on every submission, so a payload built by
/// hand gets the same checks as one built from a form.
pub trait Validate {
    /// # Errors
    ///
    /// Returns `FormError` listing every field that cannot be sent.
    fn validate(&self) -> Result<(), FormError>;
}

impl Validate for NewProduct {
    fn validate(&self) -> Result<(), FormError> {
        let mut check = Checker::default();
        check.required("name", &self.name, "Name is required");
        if self.category_id.is_none() {
            check.fail("categoryId", "Please select a category");
        }
        check.finish(|| ())
    }
}

impl Validate for ProductPatch {
    fn validate(&self) -> Result<(), FormError> {
        let mut check = Checker::default();
        if let Some(name) = &self.name {
            check.required("name", name, "Name is required");
        }
        check.finish(|| ())
    }
}

impl Validate for NewCategory {
    fn validate(&self) -> Result<(), FormError> {
        let mut check = Checker::default();
        check.required("name", &self.name, "Name is required");
        check.finish(|| ())
    }
}

impl Validate for CategoryPatch {
    fn validate(&self) -> Result<(), FormError> {
        let mut check = Checker::default();
        if let Some(name) = &self.name {
            check.required("name", name, "Name is required");
        }
        check.finish(|| ())
    }
}

// =============================================================================
// Store
// =============================================================================

/// Check the store fields the form marks as required.
///
/// # Errors
///
/// Returns `FormError` when the name, address, or maps URL is empty.
pub fn validate_store(store: &Store) -> Result<(), FormError> {
    let mut check = Checker::default();
    check.required(StoreField::Name.as_str(), &store.name, "Store name is required");
    check.required(StoreField::Address.as_str(), &store.address, "Address is required");
    check.required(StoreField::MapsUrl.as_str(), &store.maps_url, "Maps URL is required");
    check.finish(|| ())
}
