//! Catalog products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CategoryId, Identified, Price, ProductId};

/// A product as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    pub category_id: CategoryId,
    /// Joined from the category table; absent on some endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identified for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

/// Payload for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image: String,
    pub category_id: Option<CategoryId>,
    pub stock: u32,
}

impl Default for NewProduct {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            price: Price::ZERO,
            image: String::new(),
            category_id: None,
            stock: 0,
        }
    }
}

/// Partial product update. `None` fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

impl ProductPatch {
    /// Returns `true` when the patch would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.image.is_none()
            && self.category_id.is_none()
            && self.stock.is_none()
    }
}

/// Full-replacement patch built from an edited product.
impl From<Product> for ProductPatch {
    fn from(product: Product) -> Self {
        Self {
            name: Some(product.name),
            description: Some(product.description),
            price: Some(product.price),
            image: Some(product.image),
            category_id: Some(product.category_id),
            stock: Some(product.stock),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_reads_backend_shape() {
        let json = r#"{
            "id": 9,
            "name": "Kibble",
            "description": "Dry food",
            "price": 45000,
            "image": "https://cdn.example/kibble.png",
            "categoryId": 2,
            "categoryName": "Food",
            "stock": 12,
            "createdAt": "2025-01-02T03:04:05Z"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(9));
        assert_eq!(product.category_id, CategoryId::new(2));
        assert_eq!(product.category_name.as_deref(), Some("Food"));
        assert_eq!(product.price, Price::from_units(45_000));
        assert!(product.created_at.is_some());
        assert!(product.updated_at.is_none());
    }

    #[test]
    fn test_patch_only_sends_set_fields() {
        let patch = ProductPatch {
            stock: Some(0),
            ..ProductPatch::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "stock": 0 }));
        assert!(!patch.is_empty());
        assert!(ProductPatch::default().is_empty());
    }
}
