//! Store profile commands.
//!
//! # Usage
//!
//! ```bash
//! petshop store show
//! petshop store update --set name="Pawsome" --set isOpen=true
//! petshop store locate --lat -6.2088 --lng 106.8456
//! ```
//!
//! # Environment Variables
//!
//! - `GOOGLE_MAPS_API_KEY` - Required by `locate`

use std::sync::Arc;

use petshop_admin::Dashboard;
use petshop_admin::maps::{Geocoder, MapEvent, MapSession};
use petshop_admin::pages::StoreSettingsPage;
use petshop_admin::routes::Route;
use petshop_core::{LatLng, StoreField};

use super::{CliError, emit, require_sign_in};

async fn loaded_page(dashboard: &Dashboard) -> Result<StoreSettingsPage, CliError> {
    require_sign_in(dashboard, Route::Store).await?;
    let page = dashboard.store_page();
    page.load().await?.ok_or(CliError::NoStore)?;
    Ok(page)
}

/// # Errors
///
/// Returns `CliError` if not signed in, the store cannot be loaded, or
/// none exists.
pub async fn show(dashboard: &Dashboard) -> Result<(), CliError> {
    let page = loaded_page(dashboard).await?;
    let store = page.form().snapshot().ok_or(CliError::NoStore)?;
    emit("Store", &store)
}

/// Split `FIELD=VALUE`.
fn parse_assignment(raw: &str) -> Result<(StoreField, &str), CliError> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| CliError::Assignment(raw.to_owned()))?;
    let field = field
        .trim()
        .parse::<StoreField>()
        .map_err(|_| CliError::Assignment(raw.to_owned()))?;
    Ok((field, value))
}

/// Apply `FIELD=VALUE` assignments and save the changed fields.
///
/// # Errors
///
/// Returns `CliError::Assignment` for a malformed argument, or the
/// validation/backend failure from saving.
pub async fn update(dashboard: &Dashboard, assignments: &[String]) -> Result<(), CliError> {
    let parsed = assignments
        .iter()
        .map(|raw| parse_assignment(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let page = loaded_page(dashboard).await?;
    for (field, value) in parsed {
        page.set_field(field, value)?;
    }
    let store = page.save().await?;
    emit("Store", &store)
}

/// Drop the map marker at `lat`,`lng`, let the picker fill in the maps URL
/// and address, then save.
///
/// # Errors
///
/// Returns `CliError::Maps` when maps are not configured, or the
/// validation/backend failure from saving.
pub async fn locate(dashboard: &Dashboard, lat: f64, lng: f64) -> Result<(), CliError> {
    let page = loaded_page(dashboard).await?;
    let maps = dashboard.maps().load().await?;
    let store = page.form().snapshot().ok_or(CliError::NoStore)?;

    let geocoder: Arc<dyn Geocoder> = Arc::new(maps.clone());
    let session = MapSession::attach(
        geocoder,
        maps.api_key().clone(),
        &store.maps_url,
        &store.address,
        page.form().change_handler(),
    );
    session.send(MapEvent::Click(LatLng::new(lat, lng)))?;
    session.finish().await;

    let store = page.save().await?;
    emit("Store", &store)
}
