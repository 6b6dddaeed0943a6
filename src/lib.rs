#[macro_use]
extern crate tracing;

use std::cell::Cell;
use std::rc::Rc;

mod types;
pub use types::*;
mod error;
pub use error::{Error, Result};
pub mod config;
pub mod headless;
pub mod map;
pub mod places;
pub mod util;

use config::DEFAULT_PADDING;
use map::{CameraControl, InfoWindowAdapter, MapHost, Notifier};

/// Message shown whenever an info window is tapped.
pub const INFO_WINDOW_CLICKED: &str = "Info window clicked!";

/// Info window contents showing only the marker title.
#[derive(Debug, Default, Clone, Copy)]
pub struct TitleInfoWindow;

impl InfoWindowAdapter for TitleInfoWindow {
    fn info_contents(&self, marker: &Marker) -> Option<InfoView> {
        Some(InfoView { name: marker.title.clone().unwrap_or_default() })
    }
}

/// `PlacementController` puts one marker per location on a map and, once the map has
/// finished loading, moves the camera so every marker is in view with a fixed padding.
///
/// A controller serves exactly one map. Its state moves `NotReady -> ReadyPlacing` when
/// markers are placed and `ReadyPlacing -> ReadyFitted` when the camera has been fit;
/// nothing leaves `ReadyFitted`.
pub struct PlacementController {
    locations: Vec<Location>,
    padding: u32,
    notifier: Rc<dyn Notifier>,
    state: Rc<Cell<PlacementState>>,
}

impl PlacementController {
    /// Controller over the built-in table of Australian cities.
    pub fn new(notifier: Rc<dyn Notifier>) -> PlacementController {
        PlacementController::with_locations(places::PLACES.to_vec(), DEFAULT_PADDING, notifier)
    }

    pub fn with_locations(locations: Vec<Location>,
                          padding: u32,
                          notifier: Rc<dyn Notifier>)
                          -> PlacementController {
        PlacementController {
            locations,
            padding,
            notifier,
            state: Rc::new(Cell::new(PlacementState::NotReady)),
        }
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations[..]
    }

    pub fn padding(&self) -> u32 {
        self.padding
    }

    pub fn state(&self) -> PlacementState {
        self.state.get()
    }

    /// Entry point for a host whose map may be missing. A missing map is not an error:
    /// nothing is placed and the controller stays `NotReady`.
    pub fn attach(&self, map: Option<&mut dyn MapHost>) -> Result<()> {
        match map {
            Some(map) => self.on_map_ready(map),
            None => {
                warn!("no map available, skipping marker placement");
                Ok(())
            }
        }
    }

    /// Place markers, install the info-window renderer and click listener, then register
    /// the camera fit to run once the map reports it has loaded.
    pub fn on_map_ready(&self, map: &mut dyn MapHost) -> Result<()> {
        if self.state.get() != PlacementState::NotReady {
            return Err(Error::AlreadyPlaced);
        }
        if self.locations.is_empty() {
            return Err(Error::EmptyBounds);
        }
        info!(count = self.locations.len(), "placing markers");

        let mut builder = BoundsBuilder::new();
        for location in &self.locations {
            let options = MarkerOptions::new(location.position)
                .title(format!("Marker in {}", location.name));
            builder.include(location.position);
            match map.add_marker(options) {
                Some(id) => {
                    map.set_marker_tag(id, location.position)?;
                    debug!(%id, name = %location.name, position = %location.position, "marker added");
                }
                None => warn!(name = %location.name, "map declined marker"),
            }
        }
        let bounds = builder.build()?;
        // Only a complete placement leaves NotReady, so a failed pass can be retried.
        self.state.set(PlacementState::ReadyPlacing);

        map.set_info_window_adapter(Box::new(TitleInfoWindow));
        let notifier = self.notifier.clone();
        map.set_on_info_window_click_listener(Box::new(move |_marker: &Marker| {
            notifier.show(INFO_WINDOW_CLICKED)
        }));

        let state = self.state.clone();
        let padding = self.padding;
        map.set_on_map_loaded_callback(Box::new(move |camera: &mut dyn CameraControl| {
            if state.get() != PlacementState::ReadyPlacing {
                return Ok(());
            }
            camera.move_camera(CameraUpdate::NewLatLngBounds { bounds, padding })?;
            state.set(PlacementState::ReadyFitted);
            info!(?bounds, padding, "camera fit to markers");
            Ok(())
        }));
        Ok(())
    }
}
