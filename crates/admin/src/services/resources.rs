//! Typed endpoints for the catalog resources.
//!
//! Products and categories share one shape (list, get, create, replace,
//! delete, search), so a single [`ResourceApi`] serves both; [`Resource`]
//! supplies the path and payload types. Nothing here catches errors.

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::instrument;

use petshop_core::{
    Category, CategoryId, CategoryPatch, Identified, NewCategory, NewProduct, Product, ProductId,
    ProductPatch,
};

use crate::api::{ApiClient, ApiError};
use crate::forms::Validate;

/// A backend collection with CRUD and search endpoints.
pub trait Resource: Send + Sync + 'static {
    /// Full representation returned by the backend.
    type Item: DeserializeOwned + Identified + Clone + Send + Sync + 'static;
    /// Creation payload.
    type Draft: Serialize + Validate + Clone + Default + Send + Sync + 'static;
    /// Partial update payload.
    type Patch: Serialize + Validate + Clone + Send + Sync + 'static;

    /// Collection path relative to the API base.
    const PATH: &'static str;
    /// Singular display name, e.g. in notifications.
    const NAME: &'static str;
    /// Lowercase plural, e.g. "Failed to load products".
    const PLURAL: &'static str;
}

/// `products`
#[derive(Debug, Clone, Copy)]
pub struct Products;

impl Resource for Products {
    type Item = Product;
    type Draft = NewProduct;
    type Patch = ProductPatch;

    const PATH: &'static str = "products";
    const NAME: &'static str = "Product";
    const PLURAL: &'static str = "products";
}

/// `product-categories`
#[derive(Debug, Clone, Copy)]
pub struct Categories;

impl Resource for Categories {
    type Item = Category;
    type Draft = NewCategory;
    type Patch = CategoryPatch;

    const PATH: &'static str = "product-categories";
    const NAME: &'static str = "Category";
    const PLURAL: &'static str = "categories";
}

/// Id type of a resource's items.
pub type IdOf<R> = <<R as Resource>::Item as Identified>::Id;

/// Client for one [`Resource`].
pub struct ResourceApi<R> {
    client: ApiClient,
    resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceApi<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            resource: PhantomData,
        }
    }
}

impl<R> std::fmt::Debug for ResourceApi<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceApi")
            .field("client", &self.client)
            .finish()
    }
}

/// Product endpoints.
pub type ProductApi = ResourceApi<Products>;

/// Category endpoints.
pub type CategoryApi = ResourceApi<Categories>;

impl<R: Resource> ResourceApi<R> {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self {
            client,
            resource: PhantomData,
        }
    }

    fn item_path(id: IdOf<R>) -> String {
        format!("{}/{id}", R::PATH)
    }

    /// List every item.
    ///
    /// # Errors
    ///
    /// Propagates the `ApiError` unchanged.
    #[instrument(skip(self), fields(resource = R::PATH))]
    pub async fn get_all(&self) -> Result<Vec<R::Item>, ApiError> {
        Ok(self.client.get(R::PATH).await?.into_data())
    }

    /// Fetch one item.
    ///
    /// # Errors
    ///
    /// Propagates the `ApiError` unchanged.
    #[instrument(skip(self), fields(resource = R::PATH))]
    pub async fn get_by_id(&self, id: IdOf<R>) -> Result<R::Item, ApiError> {
        Ok(self.client.get(&Self::item_path(id)).await?.into_data())
    }

    /// Create an item; the backend assigns its id.
    ///
    /// # Errors
    ///
    /// Propagates the `ApiError` unchanged.
    #[instrument(skip(self, draft), fields(resource = R::PATH))]
    pub async fn create(&self, draft: &R::Draft) -> Result<R::Item, ApiError> {
        Ok(self.client.post(R::PATH, draft).await?.into_data())
    }

    /// Update an item with `PUT`. Only the fields present in `patch` are sent.
    ///
    /// # Errors
    ///
    /// Propagates the `ApiError` unchanged.
    #[instrument(skip(self, patch), fields(resource = R::PATH))]
    pub async fn update(&self, id: IdOf<R>, patch: &R::Patch) -> Result<R::Item, ApiError> {
        Ok(self.client.put(&Self::item_path(id), patch).await?.into_data())
    }

    /// Delete an item. Whatever the backend returns as `data` is ignored.
    ///
    /// # Errors
    ///
    /// Propagates the `ApiError` unchanged.
    #[instrument(skip(self), fields(resource = R::PATH))]
    pub async fn delete(&self, id: IdOf<R>) -> Result<(), ApiError> {
        self.client
            .delete::<IgnoredAny>(&Self::item_path(id))
            .await
            .map(drop)
    }

    /// Search by free text (`{path}/search?query=...`).
    ///
    /// # Errors
    ///
    /// Propagates the `ApiError` unchanged.
    #[instrument(skip(self), fields(resource = R::PATH))]
    pub async fn search(&self, query: &str) -> Result<Vec<R::Item>, ApiError> {
        let path = format!("{}/search", R::PATH);
        Ok(self
            .client
            .get_with_query(&path, &[("query", query)])
            .await?
            .into_data())
    }
}

impl ResourceApi<Products> {
    /// Products in one category.
    ///
    /// # Errors
    ///
    /// Propagates the `ApiError` unchanged.
    #[instrument(skip(self))]
    pub async fn by_category(&self, category_id: CategoryId) -> Result<Vec<Product>, ApiError> {
        let path = format!("{}/category/{category_id}", Products::PATH);
        Ok(self.client.get(&path).await?.into_data())
    }

    /// Products flagged as featured.
    ///
    /// # Errors
    ///
    /// Propagates the `ApiError` unchanged.
    #[instrument(skip(self))]
    pub async fn featured(&self) -> Result<Vec<Product>, ApiError> {
        let path = format!("{}/featured", Products::PATH);
        Ok(self.client.get(&path).await?.into_data())
    }

    /// Products related to `product_id`.
    ///
    /// # Errors
    ///
    /// Propagates the `ApiError` unchanged.
    #[instrument(skip(self))]
    pub async fn related(&self, product_id: ProductId) -> Result<Vec<Product>, ApiError> {
        let path = format!("{}/{product_id}/related", Products::PATH);
        Ok(self.client.get(&path).await?.into_data())
    }
}
