//! Product and category pages against the fake backend.

#![allow(clippy::unwrap_used)]

use httpmock::prelude::*;
use serde_json::json;

use petshop_admin::forms::{CategoryForm, ProductForm};
use petshop_admin::pages::{ModalMode, PageError, Submission};
use petshop_admin::view_models::{LoadStatus, NotificationLevel};
use petshop_core::{CategoryId, NewCategory, ProductId};
use petshop_integration_tests::TestBackend;

fn seed_products(backend: &TestBackend) {
    backend.server.mock(|when, then| {
        when.method(GET).path(TestBackend::api_path("products"));
        then.status(200).json_body(json!({"data": [
            {"id": 1, "name": "Kibble", "price": 12.5, "categoryId": 1, "stock": 3},
            {"id": 2, "name": "Chew toy", "price": 4, "categoryId": 2, "stock": 10},
            {"id": 3, "name": "Leash", "price": 7.25, "categoryId": 2, "stock": 0}
        ]}));
    });
}

#[tokio::test]
async fn test_create_appends_and_delete_removes_one() {
    let backend = TestBackend::start();
    seed_products(&backend);
    let create = backend.server.mock(|when, then| {
        when.method(POST)
            .path(TestBackend::api_path("products"))
            .json_body_includes(r#"{"name": "Cat tree", "categoryId": 2}"#);
        then.status(201).json_body(json!({"data": {
            "id": 4, "name": "Cat tree", "price": 55, "categoryId": 2, "stock": 1
        }}));
    });
    let delete = backend.server.mock(|when, then| {
        when.method(DELETE).path(TestBackend::api_path("products/2"));
        then.status(200).json_body(json!({"status": "success", "data": null}));
    });

    let dashboard = backend.dashboard();
    let mut page = dashboard.product_page();
    page.mount().await.unwrap();
    assert_eq!(page.list().items().len(), 3);

    let form = ProductForm {
        name: "Cat tree".to_string(),
        price: "55".to_string(),
        category_id: Some(CategoryId::new(2)),
        stock: "1".to_string(),
        ..ProductForm::default()
    };
    page.open_create();
    page.submit(Submission::Create(form.to_draft().unwrap()))
        .await
        .unwrap();
    create.assert();
    assert!(!page.modal().is_open());

    let ids: Vec<ProductId> = page.list().items().iter().map(|p| p.id).collect();
    assert_eq!(ids, [1, 2, 3, 4].map(ProductId::new));

    let chew_toy = page.list().items()[1].clone();
    page.open_delete(chew_toy);
    page.submit(Submission::Delete).await.unwrap();
    delete.assert();

    let ids: Vec<ProductId> = page.list().items().iter().map(|p| p.id).collect();
    assert_eq!(ids, [1, 3, 4].map(ProductId::new));
    assert_eq!(
        backend.notifier.messages(NotificationLevel::Success),
        vec![
            "Product created successfully".to_string(),
            "Product deleted successfully".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_rejected_category_keeps_dialog_open() {
    let backend = TestBackend::start();
    backend.server.mock(|when, then| {
        when.method(GET).path(TestBackend::api_path("product-categories"));
        then.status(200)
            .json_body(json!({"data": [{"id": 1, "name": "Food"}]}));
    });
    backend.server.mock(|when, then| {
        when.method(PUT).path(TestBackend::api_path("product-categories/1"));
        then.status(422).json_body(json!({
            "status": "error",
            "message": "Validation failed",
            "errors": [{"field": "name", "message": "Name has already been taken"}]
        }));
    });

    let dashboard = backend.dashboard();
    let mut page = dashboard.category_page();
    page.mount().await.unwrap();

    let food = page.list().items()[0].clone();
    let mut form = CategoryForm::from(&food);
    form.name = "Toys".to_string();
    page.open_edit(food);

    let err = page
        .submit(Submission::Update(form.to_patch().unwrap()))
        .await
        .unwrap_err();

    assert!(matches!(err, PageError::Operation(_)));
    assert_eq!(page.modal().mode(), Some(ModalMode::Edit));
    assert_eq!(
        page.modal().field_errors().unwrap()["name"],
        "Name has already been taken"
    );
    assert!(page.retained_input().is_some());
    assert_eq!(page.list().items()[0].name, "Food");
    assert_eq!(page.list().status(), LoadStatus::Error("Validation failed".to_string()));
    assert_eq!(
        backend.notifier.messages(NotificationLevel::Error),
        vec!["Validation failed".to_string()]
    );
}

#[tokio::test]
async fn test_empty_category_name_never_reaches_backend() {
    let backend = TestBackend::start();
    let create = backend.server.mock(|when, then| {
        when.method(POST).path(TestBackend::api_path("product-categories"));
        then.status(201)
            .json_body(json!({"data": {"id": 9, "name": "   "}}));
    });

    let mut page = backend.dashboard().category_page();
    page.open_create();
    let draft = NewCategory {
        name: "   ".to_string(),
        ..NewCategory::default()
    };
    let err = page
        .submit(Submission::Create(draft))
        .await
        .unwrap_err();

    match err {
        PageError::Form(invalid) => {
            assert_eq!(invalid.field_errors["name"], "Name is required");
        }
        other => panic!("expected a form error, got {other:?}"),
    }
    assert_eq!(page.modal().mode(), Some(ModalMode::Create));
    assert_eq!(
        page.modal().field_errors().unwrap()["name"],
        "Name is required"
    );
    assert!(page.retained_input().is_some());
    assert_eq!(create.calls(), 0);
    assert!(backend.notifier.all().is_empty());
}

#[tokio::test]
async fn test_search_replaces_list() {
    let backend = TestBackend::start();
    seed_products(&backend);
    let search = backend.server.mock(|when, then| {
        when.method(GET)
            .path(TestBackend::api_path("products/search"))
            .query_param("query", "chew toy");
        then.status(200).json_body(json!({"data": [
            {"id": 2, "name": "Chew toy", "price": 4, "categoryId": 2, "stock": 10}
        ]}));
    });

    let page = backend.dashboard().product_page();
    page.mount().await.unwrap();
    page.list().search("chew toy").await.unwrap();

    search.assert();
    assert_eq!(page.list().items().len(), 1);
    assert_eq!(page.list().items()[0].name, "Chew toy");
}
