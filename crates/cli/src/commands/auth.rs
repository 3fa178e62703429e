//! Session commands.
//!
//! # Usage
//!
//! ```bash
//! petshop login -e owner@petshop.id -p secret
//! petshop whoami --refresh
//! petshop logout
//! ```

use secrecy::SecretString;

use petshop_admin::Dashboard;
use petshop_admin::forms::{LoginForm, RegisterForm};

use super::{CliError, emit};

/// Sign in with email and password.
///
/// # Errors
///
/// Returns `CliError::Form` for invalid input or `CliError::Operation`
/// when the backend rejects the credentials.
pub async fn login(dashboard: &Dashboard, email: &str, password: String) -> Result<(), CliError> {
    let form = LoginForm {
        email: email.to_owned(),
        password: SecretString::from(password),
    };
    let email = form.validate()?;

    let vm = dashboard.auth_view_model();
    let user = vm.login(email.as_str(), &form.password).await?;
    tracing::info!("Signed in as {} <{}>", user.name, user.email);
    Ok(())
}

/// Create an account; the new session is kept.
///
/// # Errors
///
/// Returns `CliError::Form` for invalid input or `CliError::Operation`
/// when the backend refuses the registration.
pub async fn register(
    dashboard: &Dashboard,
    name: &str,
    email: &str,
    password: String,
    confirm: String,
) -> Result<(), CliError> {
    let form = RegisterForm {
        name: name.to_owned(),
        email: email.to_owned(),
        password: SecretString::from(password),
        confirm_password: SecretString::from(confirm),
    };
    let email = form.validate()?;

    let vm = dashboard.auth_view_model();
    let user = vm
        .register(form.name.trim(), email.as_str(), &form.password)
        .await?;
    tracing::info!("Registered and signed in as {} <{}>", user.name, user.email);
    Ok(())
}

/// Sign out. Always succeeds locally.
pub async fn logout(dashboard: &Dashboard) {
    dashboard.auth_view_model().logout().await;
    tracing::info!("Signed out");
}

/// Show the signed-in profile.
///
/// # Errors
///
/// Returns `CliError::NotSignedIn` when there is no session, or when a
/// forced refresh is rejected.
pub async fn whoami(dashboard: &Dashboard, refresh: bool) -> Result<(), CliError> {
    let user = if refresh {
        dashboard.auth().current_user(true).await
    } else {
        dashboard.auth_view_model().init().await
    };
    let user = user.ok_or(CliError::NotSignedIn)?;
    emit("Signed in as", &user)
}
