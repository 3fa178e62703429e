//! Subcommand implementations.

pub mod auth;
pub mod catalog;
pub mod store;

use serde::Serialize;
use thiserror::Error;

use petshop_admin::Dashboard;
use petshop_admin::api::ApiError;
use petshop_admin::forms::FormError;
use petshop_admin::maps::MapsError;
use petshop_admin::pages::PageError;
use petshop_admin::routes::Route;
use petshop_admin::view_models::OperationFailure;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Not signed in, or the session was rejected.
    #[error("Not signed in; run `petshop login` first")]
    NotSignedIn,

    /// The backend has no store profile.
    #[error("No store profile exists yet")]
    NoStore,

    /// A `--set` argument is not `FIELD=VALUE`.
    #[error("Invalid assignment {0:?}, expected FIELD=VALUE")]
    Assignment(String),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Operation(#[from] OperationFailure),

    #[error(transparent)]
    Page(#[from] PageError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Maps(#[from] MapsError),

    #[error("Failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

/// Fail early when the route guard would send the user to sign in.
async fn require_sign_in(dashboard: &Dashboard, route: Route) -> Result<(), CliError> {
    match dashboard.navigate(route.path()).await {
        Some(Route::Auth) => Err(CliError::NotSignedIn),
        _ => Ok(()),
    }
}

/// Log a record as pretty JSON under `label`.
fn emit<T: Serialize + ?Sized>(label: &str, value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)?;
    tracing::info!("{label}\n{json}");
    Ok(())
}
