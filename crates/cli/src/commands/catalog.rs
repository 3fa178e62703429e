//! Product and category commands.
//!
//! Edits go through the same page controllers and form validation as the
//! dashboard screens.

use serde::Serialize;

use petshop_admin::Dashboard;
use petshop_admin::forms::{CategoryForm, ProductForm};
use petshop_admin::pages::{CrudPage, Submission};
use petshop_admin::routes::Route;
use petshop_admin::services::{IdOf, Products, Resource, ResourceApi};
use petshop_core::{CategoryId, ProductId};

use super::{CliError, emit, require_sign_in};
use crate::{CategoryFields, ProductFields};

fn route_for<R: Resource>() -> Route {
    if R::PATH == Products::PATH {
        Route::Product
    } else {
        Route::Category
    }
}

/// # Errors
///
/// Returns `CliError` if not signed in or the request fails.
pub async fn list_products(
    dashboard: &Dashboard,
    category: Option<CategoryId>,
    featured: bool,
) -> Result<(), CliError> {
    require_sign_in(dashboard, Route::Product).await?;
    let products = match (category, featured) {
        (Some(id), _) => dashboard.products().by_category(id).await?,
        (None, true) => dashboard.products().featured().await?,
        (None, false) => {
            let page = dashboard.product_page();
            page.mount().await?;
            page.list().items()
        }
    };
    emit(&format!("{} products", products.len()), &products)
}

/// # Errors
///
/// Returns `CliError` if not signed in or the request fails.
pub async fn get_product(dashboard: &Dashboard, id: ProductId, related: bool) -> Result<(), CliError> {
    require_sign_in(dashboard, Route::Product).await?;
    let api = dashboard.products();
    let product = api.get_by_id(id).await?;
    emit(&format!("Product {id}"), &product)?;
    if related {
        let related = api.related(id).await?;
        emit(&format!("{} related products", related.len()), &related)?;
    }
    Ok(())
}

/// # Errors
///
/// Returns `CliError` if not signed in or the request fails.
pub async fn list_categories(dashboard: &Dashboard) -> Result<(), CliError> {
    require_sign_in(dashboard, Route::Category).await?;
    let page = dashboard.category_page();
    page.mount().await?;
    let categories = page.list().items();
    emit(&format!("{} categories", categories.len()), &categories)
}

/// # Errors
///
/// Returns `CliError` if not signed in or the request fails.
pub async fn get_category(dashboard: &Dashboard, id: CategoryId) -> Result<(), CliError> {
    require_sign_in(dashboard, Route::Category).await?;
    let category = dashboard.categories().get_by_id(id).await?;
    emit(&format!("Category {id}"), &category)
}

/// Search through the page's list view model.
///
/// # Errors
///
/// Returns `CliError` if not signed in or the search fails.
pub async fn search<R: Resource>(page: &CrudPage<R>, dashboard: &Dashboard, query: &str) -> Result<(), CliError>
where
    R::Item: Serialize,
{
    require_sign_in(dashboard, route_for::<R>()).await?;
    page.list().search(query).await?;
    let items = page.list().items();
    emit(&format!("{} {} matching {query:?}", items.len(), R::PLURAL), &items)
}

/// # Errors
///
/// Returns `CliError::Form` for invalid fields, or the backend failure.
pub async fn create_product(dashboard: &Dashboard, fields: &ProductFields) -> Result<(), CliError> {
    require_sign_in(dashboard, Route::Product).await?;
    let draft = apply_product_fields(ProductForm::default(), fields).to_draft()?;
    let mut page = dashboard.product_page();
    page.open_create();
    page.submit(Submission::Create(draft)).await?;
    report_last("Created", &page)
}

/// # Errors
///
/// Returns `CliError::Form` for invalid fields, or the backend failure.
pub async fn update_product(dashboard: &Dashboard, id: ProductId, fields: &ProductFields) -> Result<(), CliError> {
    require_sign_in(dashboard, Route::Product).await?;
    let current = dashboard.products().get_by_id(id).await?;
    let patch = apply_product_fields(ProductForm::from(&current), fields).to_patch()?;
    let mut page = dashboard.product_page();
    page.open_edit(current);
    page.submit(Submission::Update(patch)).await?;
    tracing::info!("Updated product {id}");
    Ok(())
}

/// # Errors
///
/// Returns `CliError::Form` for invalid fields, or the backend failure.
pub async fn create_category(dashboard: &Dashboard, fields: &CategoryFields) -> Result<(), CliError> {
    require_sign_in(dashboard, Route::Category).await?;
    let draft = apply_category_fields(CategoryForm::default(), fields).to_draft()?;
    let mut page = dashboard.category_page();
    page.open_create();
    page.submit(Submission::Create(draft)).await?;
    report_last("Created", &page)
}

/// # Errors
///
/// Returns `CliError::Form` for invalid fields, or the backend failure.
pub async fn update_category(dashboard: &Dashboard, id: CategoryId, fields: &CategoryFields) -> Result<(), CliError> {
    require_sign_in(dashboard, Route::Category).await?;
    let current = dashboard.categories().get_by_id(id).await?;
    let patch = apply_category_fields(CategoryForm::from(&current), fields).to_patch()?;
    let mut page = dashboard.category_page();
    page.open_edit(current);
    page.submit(Submission::Update(patch)).await?;
    tracing::info!("Updated category {id}");
    Ok(())
}

/// Confirm and delete one record.
///
/// # Errors
///
/// Returns `CliError` if the record cannot be fetched or deleted.
pub async fn delete<R: Resource>(page: &mut CrudPage<R>, dashboard: &Dashboard, id: IdOf<R>) -> Result<(), CliError> {
    require_sign_in(dashboard, route_for::<R>()).await?;
    let item = ResourceApi::<R>::new(dashboard.client().clone())
        .get_by_id(id)
        .await?;
    page.open_delete(item);
    page.submit(Submission::Delete).await?;
    tracing::info!("Deleted {} {id}", R::NAME.to_lowercase());
    Ok(())
}

/// Log the record a successful submit left in the page's list.
fn report_last<R: Resource>(verb: &str, page: &CrudPage<R>) -> Result<(), CliError>
where
    R::Item: Serialize,
{
    match page.list().items().last() {
        Some(item) => emit(&format!("{verb} {}", R::NAME.to_lowercase()), item),
        None => Ok(()),
    }
}

fn apply_product_fields(mut form: ProductForm, fields: &ProductFields) -> ProductForm {
    if let Some(name) = &fields.name {
        form.name.clone_from(name);
    }
    if let Some(description) = &fields.description {
        form.description.clone_from(description);
    }
    if let Some(price) = &fields.price {
        form.price.clone_from(price);
    }
    if let Some(image) = &fields.image {
        form.image.clone_from(image);
    }
    if fields.category.is_some() {
        form.category_id = fields.category;
    }
    if let Some(stock) = &fields.stock {
        form.stock.clone_from(stock);
    }
    form
}

fn apply_category_fields(mut form: CategoryForm, fields: &CategoryFields) -> CategoryForm {
    if let Some(name) = &fields.name {
        form.name.clone_from(name);
    }
    if let Some(description) = &fields.description {
        form.description.clone_from(description);
    }
    if let Some(image) = &fields.image {
        form.image.clone_from(image);
    }
    form
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use petshop_admin::services::Categories;

    use super::*;

    #[test]
    fn test_routes_per_resource() {
        assert_eq!(route_for::<Products>(), Route::Product);
        assert_eq!(route_for::<Categories>(), Route::Category);
    }

    #[test]
    fn test_update_keeps_omitted_fields() {
        let form = ProductForm {
            name: "Kibble".to_string(),
            price: "10".to_string(),
            category_id: Some(CategoryId::new(1)),
            stock: "4".to_string(),
            ..ProductForm::default()
        };
        let fields = ProductFields {
            name: None,
            description: None,
            price: Some("12.5".to_string()),
            image: None,
            category: None,
            stock: None,
        };
        let form = apply_product_fields(form, &fields);
        assert_eq!(form.name, "Kibble");
        assert_eq!(form.price, "12.5");
        assert_eq!(form.category_id, Some(CategoryId::new(1)));
    }
}
