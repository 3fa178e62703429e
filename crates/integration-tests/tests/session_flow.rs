//! Sign-in, reload, and sign-out against the fake backend.

#![allow(clippy::unwrap_used)]

use httpmock::prelude::*;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use petshop_admin::routes::Route;
use petshop_admin::session::{KeyValueStorage, keys};
use petshop_admin::view_models::NotificationLevel;
use petshop_integration_tests::{TestBackend, user_json};

#[tokio::test]
async fn test_login_persists_session() {
    let backend = TestBackend::start();
    let login = backend.server.mock(|when, then| {
        when.method(POST)
            .path(TestBackend::api_path("auth/login"))
            .json_body(json!({"email": "ayu@petshop.id", "password": "secret"}));
        then.status(200)
            .json_body(json!({"status": "success", "data": {"token": "T1", "user": user_json()}}));
    });

    let dashboard = backend.dashboard();
    assert_eq!(dashboard.navigate("/product").await, Some(Route::Auth));

    let user = dashboard
        .auth_view_model()
        .login("ayu@petshop.id", &SecretString::from("secret"))
        .await
        .unwrap();
    login.assert();

    assert_eq!(user.name, "Ayu");
    assert_eq!(backend.stored_token().as_deref(), Some("T1"));
    assert_eq!(backend.stored_user().unwrap()["email"], "ayu@petshop.id");
    assert_eq!(dashboard.navigate("/product").await, Some(Route::Product));
}

#[tokio::test]
async fn test_reload_restores_session_without_network() {
    let backend = TestBackend::start();
    backend.server.mock(|when, then| {
        when.method(POST).path(TestBackend::api_path("auth/login"));
        then.status(200)
            .json_body(json!({"data": {"token": "T1", "user": user_json()}}));
    });
    let me = backend.server.mock(|when, then| {
        when.method(GET).path(TestBackend::api_path("auth/me"));
        then.status(200).json_body(json!({"data": {"user": user_json()}}));
    });

    backend
        .dashboard()
        .auth_view_model()
        .login("ayu@petshop.id", &SecretString::from("secret"))
        .await
        .unwrap();

    let reloaded = backend.dashboard();
    let vm = reloaded.auth_view_model();
    let user = vm.init().await.unwrap();
    assert_eq!(user.email, "ayu@petshop.id");
    assert_eq!(user.role.as_deref(), Some("owner"));
    assert_eq!(
        reloaded.session().token().await.unwrap().expose_secret(),
        "T1"
    );
    assert_eq!(me.calls(), 0);
}

#[tokio::test]
async fn test_malformed_stored_user_signs_out_on_reload() {
    let backend = TestBackend::start();
    backend.storage.set(keys::AUTH_TOKEN, "T1").unwrap();
    backend.storage.set(keys::USER, "{not json").unwrap();

    let dashboard = backend.dashboard();
    assert!(!dashboard.auth().is_authenticated().await);
    assert_eq!(backend.stored_token(), None);
    assert_eq!(backend.stored_user(), None);
}

#[tokio::test]
async fn test_failed_login_clears_session_and_notifies() {
    let backend = TestBackend::start();
    backend.server.mock(|when, then| {
        when.method(POST).path(TestBackend::api_path("auth/login"));
        then.status(401)
            .json_body(json!({"status": "error", "message": "Invalid credentials"}));
    });

    let dashboard = backend.dashboard();
    let failure = dashboard
        .auth_view_model()
        .login("ayu@petshop.id", &SecretString::from("wrong"))
        .await
        .unwrap_err();

    assert_eq!(failure.message, "Invalid credentials");
    assert_eq!(backend.stored_token(), None);
    assert_eq!(
        backend.notifier.messages(NotificationLevel::Error),
        vec!["Invalid credentials".to_string()]
    );
}

#[tokio::test]
async fn test_logout_clears_even_when_backend_fails() {
    let backend = TestBackend::start();
    backend.server.mock(|when, then| {
        when.method(POST).path(TestBackend::api_path("auth/login"));
        then.status(200)
            .json_body(json!({"data": {"token": "T1", "user": user_json()}}));
    });
    let logout = backend.server.mock(|when, then| {
        when.method(POST)
            .path(TestBackend::api_path("auth/logout"))
            .header("Authorization", "Bearer T1");
        then.status(500);
    });

    let dashboard = backend.dashboard();
    let vm = dashboard.auth_view_model();
    vm.login("ayu@petshop.id", &SecretString::from("secret"))
        .await
        .unwrap();
    vm.logout().await;

    logout.assert();
    assert!(vm.user().is_none());
    assert_eq!(backend.stored_token(), None);
    assert_eq!(backend.stored_user(), None);
}

#[tokio::test]
async fn test_forced_profile_refresh_updates_cache() {
    let backend = TestBackend::start();
    backend.server.mock(|when, then| {
        when.method(POST).path(TestBackend::api_path("auth/login"));
        then.status(200)
            .json_body(json!({"data": {"token": "T1", "user": user_json()}}));
    });
    backend.server.mock(|when, then| {
        when.method(GET)
            .path(TestBackend::api_path("auth/me"))
            .header("Authorization", "Bearer T1");
        then.status(200).json_body(json!({
            "data": {"id": 1, "name": "Ayu Lestari", "email": "ayu@petshop.id"}
        }));
    });

    let dashboard = backend.dashboard();
    dashboard
        .auth()
        .login("ayu@petshop.id", &SecretString::from("secret"))
        .await
        .unwrap();
    assert!(dashboard.auth().ensure_authenticated().await);

    assert_eq!(backend.stored_user().unwrap()["name"], "Ayu Lestari");
}
