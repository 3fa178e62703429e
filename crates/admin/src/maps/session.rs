//! One mounted map: its marker and the task handling its events.

use std::sync::{Arc, Mutex};

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use petshop_core::{LatLng, StoreField};

use super::{Geocoder, MapsError, PLACE_ZOOM, Place, embed_url, initial_position, position_from_url};
use crate::pages::FieldChangeHandler;
use crate::view_models::lock;

/// Input from the map widget.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The marker was dropped at a new position.
    MarkerDragEnd(LatLng),
    /// The map was clicked.
    Click(LatLng),
    /// The search box resolved to these places, best first.
    PlacesChanged(Vec<Place>),
    /// Free-text search typed into the search box.
    Search(String),
}

/// What the map currently shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
    pub marker: Option<LatLng>,
}

/// A map attached to the store form.
///
/// Dropping the session (or calling [`release`](Self::release)) stops event
/// handling and removes the marker. Attach a new session whenever the store
/// record behind the form changes.
pub struct MapSession {
    events: Option<mpsc::UnboundedSender<MapEvent>>,
    view: Arc<Mutex<MapView>>,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for MapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSession")
            .field("view", &self.view())
            .field("attached", &self.task.is_some())
            .finish()
    }
}

impl MapSession {
    /// Open a map for a store whose form currently holds `maps_url` and
    /// `address`.
    ///
    /// A marker is placed when `maps_url` carries a position. If it does
    /// and `address` is empty, the position is geocoded straight away and
    /// the result written through `on_change`.
    ///
    /// Must be called within a Tokio runtime.
    #[must_use]
    pub fn attach(
        geocoder: Arc<dyn Geocoder>,
        api_key: SecretString,
        maps_url: &str,
        address: &str,
        on_change: FieldChangeHandler,
    ) -> Self {
        let (center, zoom) = initial_position(maps_url);
        let marker = position_from_url(maps_url);
        let view = Arc::new(Mutex::new(MapView { center, zoom, marker }));

        let initial_lookup = marker.filter(|_| address.trim().is_empty());
        let (tx, rx) = mpsc::unbounded_channel();
        let listener = Listener {
            geocoder,
            api_key,
            view: Arc::clone(&view),
            on_change,
        };
        let task = tokio::spawn(listener.run(initial_lookup, rx));

        Self {
            events: Some(tx),
            view,
            task: Some(task),
        }
    }

    #[must_use]
    pub fn view(&self) -> MapView {
        *lock(&self.view)
    }

    /// Queue an event from the map widget.
    ///
    /// # Errors
    ///
    /// Returns `MapsError::Detached` once the session is no longer running.
    pub fn send(&self, event: MapEvent) -> Result<(), MapsError> {
        self.events
            .as_ref()
            .ok_or(MapsError::Detached)?
            .send(event)
            .map_err(|_| MapsError::Detached)
    }

    /// Stop handling events immediately, dropping anything queued.
    pub fn release(mut self) {
        self.detach();
    }

    /// Stop accepting events and wait for the queued ones to be handled.
    pub async fn finish(mut self) {
        self.events = None;
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!(error = %e, "Map event task ended abnormally");
        }
        lock(&self.view).marker = None;
    }

    fn detach(&mut self) {
        self.events = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
        lock(&self.view).marker = None;
    }
}

impl Drop for MapSession {
    fn drop(&mut self) {
        self.detach();
    }
}

/// State owned by the event task.
struct Listener {
    geocoder: Arc<dyn Geocoder>,
    api_key: SecretString,
    view: Arc<Mutex<MapView>>,
    on_change: FieldChangeHandler,
}

impl Listener {
    async fn run(self, initial_lookup: Option<LatLng>, mut events: mpsc::UnboundedReceiver<MapEvent>) {
        if let Some(position) = initial_lookup {
            self.locate(position).await;
        }
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        debug!("Map session closed");
    }

    async fn handle(&self, event: MapEvent) {
        match event {
            MapEvent::MarkerDragEnd(position) => {
                if lock(&self.view).marker.is_none() {
                    debug!("Drag without a marker ignored");
                    return;
                }
                lock(&self.view).marker = Some(position);
                self.locate(position).await;
            }
            MapEvent::Click(position) => {
                lock(&self.view).marker = Some(position);
                self.locate(position).await;
            }
            MapEvent::PlacesChanged(places) => self.select_place(places),
            MapEvent::Search(query) => match self.geocoder.search_places(&query).await {
                Ok(places) => self.select_place(places),
                Err(e) => warn!(query, error = %e, "Place search failed"),
            },
        }
    }

    /// Move to the best place. Places without a location are skipped over
    /// entirely, as the widget would.
    fn select_place(&self, places: Vec<Place>) {
        let Some(place) = places.into_iter().next() else {
            return;
        };
        let Some(position) = place.location else {
            debug!(name = %place.name, "Selected place has no location");
            return;
        };
        {
            let mut view = lock(&self.view);
            view.center = position;
            view.zoom = PLACE_ZOOM;
            view.marker = Some(position);
        }
        self.update_location_fields(position, place.formatted_address.unwrap_or_default());
    }

    /// Geocode `position` and write it to the form. Nothing is written
    /// when no address is found.
    async fn locate(&self, position: LatLng) {
        match self.geocoder.reverse_geocode(position).await {
            Ok(Some(address)) => self.update_location_fields(position, address),
            Ok(None) => debug!(%position, "No address at position"),
            Err(e) => warn!(%position, error = %e, "Reverse geocoding failed"),
        }
    }

    fn update_location_fields(&self, position: LatLng, address: String) {
        (self.on_change)(
            StoreField::MapsUrl,
            embed_url(self.api_key.expose_secret(), position),
        );
        (self.on_change)(StoreField::Address, address);
    }
}
