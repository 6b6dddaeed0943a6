//! Seams between the placement logic and whatever draws the map.

use crate::error::Result;
use crate::types::{CameraUpdate, InfoView, LatLng, Marker, MarkerId, MarkerOptions};

/// Invoked once when a map has finished loading, with access to its camera.
pub type MapLoadedCallback = Box<dyn FnOnce(&mut dyn CameraControl) -> Result<()>>;

/// Invoked whenever the user taps a marker's info window.
pub type InfoWindowClickListener = Box<dyn FnMut(&Marker)>;

/// Moves the map viewport.
pub trait CameraControl {
    fn move_camera(&mut self, update: CameraUpdate) -> Result<()>;
}

/// Renders the info window shown above a tapped marker.
pub trait InfoWindowAdapter {
    /// A complete replacement window, frame included. `None` keeps the default frame.
    fn info_window(&self, _marker: &Marker) -> Option<InfoView> {
        None
    }

    /// Contents placed inside the default frame.
    fn info_contents(&self, marker: &Marker) -> Option<InfoView>;
}

/// A map that has finished initializing and accepts markers and callbacks.
pub trait MapHost: CameraControl {
    /// Add a marker; `None` if the host declined it.
    fn add_marker(&mut self, options: MarkerOptions) -> Option<MarkerId>;

    fn set_marker_tag(&mut self, id: MarkerId, tag: LatLng) -> Result<()>;

    fn set_info_window_adapter(&mut self, adapter: Box<dyn InfoWindowAdapter>);

    fn set_on_info_window_click_listener(&mut self, listener: InfoWindowClickListener);

    /// Register a callback fired once, after the map has laid itself out.
    fn set_on_map_loaded_callback(&mut self, callback: MapLoadedCallback);
}

/// Short-lived user-visible messages.
pub trait Notifier {
    fn show(&self, message: &str);
}

/// Sends toasts to the log instead of a screen.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, message: &str) {
        info!(toast = true, "{}", message);
    }
}
