use std::path::Path;

use crate::config::MapConfig;
use crate::error::{Error, Result};
use crate::map::{CameraControl, InfoWindowAdapter, InfoWindowClickListener, MapHost,
                 MapLoadedCallback};
use crate::types::{Bounds, CameraPosition, CameraUpdate, InfoView, LatLng, Marker, MarkerId,
                   MarkerOptions};
use crate::util;

/// Side length in pixels of the square drawn for each marker in a snapshot.
const MARKER_PX: usize = 5;

/// An in-process map without a screen. It keeps markers and callbacks the way a real
/// map would, computes camera fits itself, and can rasterize marker positions.
pub struct HeadlessMap {
    config: MapConfig,
    markers: Vec<Marker>,
    adapter: Option<Box<dyn InfoWindowAdapter>>,
    click_listener: Option<InfoWindowClickListener>,
    loaded_callback: Option<MapLoadedCallback>,
    camera: Option<CameraPosition>,
    camera_moves: usize,
}

impl HeadlessMap {
    /// Fails if the config does not pass `MapConfig::validate`.
    pub fn new(config: MapConfig) -> Result<HeadlessMap> {
        config.validate()?;
        Ok(HeadlessMap {
            config,
            markers: Vec::new(),
            adapter: None,
            click_listener: None,
            loaded_callback: None,
            camera: None,
            camera_moves: 0,
        })
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers[..]
    }

    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.get(id.0)
    }

    /// Current camera, `None` until something moved it.
    pub fn camera(&self) -> Option<CameraPosition> {
        self.camera
    }

    /// How many camera updates were applied.
    pub fn camera_moves(&self) -> usize {
        self.camera_moves
    }

    /// Lat/lon rectangle currently on screen.
    pub fn visible_region(&self) -> Option<Bounds> {
        self.camera.map(|c| util::visible_bounds(&c, self.config.viewport(), self.config.tile_size))
    }

    /// Signal that layout finished. Runs the pending load callback, if any, and reports
    /// whether one ran. The callback is consumed, so later calls return `false`.
    pub fn fire_map_loaded(&mut self) -> Result<bool> {
        match self.loaded_callback.take() {
            Some(callback) => {
                debug!("map loaded, running callback");
                callback(self)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Render the info window for a marker: a custom window first, then contents.
    pub fn info_window_for(&self, id: MarkerId) -> Result<Option<InfoView>> {
        let marker = self.marker(id).ok_or(Error::UnknownMarker(id))?;
        Ok(self.adapter
            .as_ref()
            .and_then(|a| a.info_window(marker).or_else(|| a.info_contents(marker))))
    }

    /// Simulate a tap on a marker's info window.
    pub fn click_info_window(&mut self, id: MarkerId) -> Result<()> {
        let marker = self.markers.get(id.0).ok_or(Error::UnknownMarker(id))?;
        if let Some(ref mut listener) = self.click_listener {
            listener(marker);
        }
        Ok(())
    }

    /// Write a grayscale image of the viewport with a square at every visible marker.
    pub fn snapshot<P: AsRef<Path>>(&self, p: P) -> Result<()> {
        let camera = self.camera.ok_or(Error::MapNotLoaded)?;
        let viewport = self.config.viewport();
        let (height, width) = (viewport.1 as usize, viewport.0 as usize);
        let mut grid = vec![0u8; height * width];
        let half = (MARKER_PX / 2) as i64;
        // Pin far-off markers just outside the grid so the square arithmetic stays small.
        let near = |v: f64, len: usize| {
            v.round().max(-(half as f64) - 1.0).min((len as i64 + half + 1) as f64) as i64
        };
        for m in &self.markers {
            let (row, col) = util::to_pixel(&camera, viewport, self.config.tile_size, m.position);
            let (row, col) = (near(row, height), near(col, width));
            for r in (row - half).max(0)..(row + half + 1).min(height as i64) {
                for c in (col - half).max(0)..(col + half + 1).min(width as i64) {
                    grid[r as usize * width + c as usize] = 1;
                }
            }
        }
        util::mat_to_img(&grid, (height, width), p, None)
    }
}

impl CameraControl for HeadlessMap {
    fn move_camera(&mut self, update: CameraUpdate) -> Result<()> {
        let position = match update {
            CameraUpdate::NewLatLngBounds { bounds, padding } => {
                util::fit_bounds(&bounds, self.config.viewport(), padding, &self.config)?
            }
            CameraUpdate::NewLatLngZoom { target, zoom } => {
                CameraPosition {
                    target,
                    zoom: zoom.max(self.config.min_zoom).min(self.config.max_zoom),
                }
            }
        };
        info!(target_lat = position.target.lat,
              target_lon = position.target.lon,
              zoom = position.zoom,
              "camera moved");
        self.camera = Some(position);
        self.camera_moves += 1;
        Ok(())
    }
}

impl MapHost for HeadlessMap {
    fn add_marker(&mut self, options: MarkerOptions) -> Option<MarkerId> {
        let id = MarkerId(self.markers.len());
        self.markers.push(Marker {
            id,
            position: options.position,
            title: options.title,
            tag: None,
        });
        Some(id)
    }

    fn set_marker_tag(&mut self, id: MarkerId, tag: LatLng) -> Result<()> {
        let marker = self.markers.get_mut(id.0).ok_or(Error::UnknownMarker(id))?;
        marker.tag = Some(tag);
        Ok(())
    }

    fn set_info_window_adapter(&mut self, adapter: Box<dyn InfoWindowAdapter>) {
        self.adapter = Some(adapter);
    }

    fn set_on_info_window_click_listener(&mut self, listener: InfoWindowClickListener) {
        self.click_listener = Some(listener);
    }

    fn set_on_map_loaded_callback(&mut self, callback: MapLoadedCallback) {
        self.loaded_callback = Some(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_get_sequential_ids() {
        let mut map = HeadlessMap::new(MapConfig::default()).unwrap();
        let a = map.add_marker(MarkerOptions::new(LatLng::new(1.0, 2.0)).title("a")).unwrap();
        let b = map.add_marker(MarkerOptions::new(LatLng::new(3.0, 4.0))).unwrap();
        assert_eq!((a, b), (MarkerId(0), MarkerId(1)));
        map.set_marker_tag(b, LatLng::new(3.0, 4.0)).unwrap();
        assert_eq!(map.marker(b).and_then(|m| m.tag), Some(LatLng::new(3.0, 4.0)));
        assert!(map.set_marker_tag(MarkerId(7), LatLng::new(0.0, 0.0)).is_err());
    }

    #[test]
    fn loaded_callback_is_one_shot() {
        let mut map = HeadlessMap::new(MapConfig::default()).unwrap();
        assert!(!map.fire_map_loaded().unwrap());
        map.set_on_map_loaded_callback(Box::new(|camera: &mut dyn CameraControl| {
            camera.move_camera(CameraUpdate::NewLatLngZoom {
                target: LatLng::new(0.0, 0.0),
                zoom: 3.0,
            })
        }));
        assert!(map.fire_map_loaded().unwrap());
        assert!(!map.fire_map_loaded().unwrap());
        assert_eq!(map.camera_moves(), 1);
        assert_eq!(map.camera().map(|c| c.zoom), Some(3.0));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut map = HeadlessMap::new(MapConfig::default()).unwrap();
        map.move_camera(CameraUpdate::NewLatLngZoom {
                target: LatLng::new(0.0, 0.0),
                zoom: 40.0,
            })
            .unwrap();
        assert_eq!(map.camera().map(|c| c.zoom), Some(21.0));
    }

    #[test]
    fn bounds_update_failure_leaves_camera() {
        let mut map = HeadlessMap::new(MapConfig::default()).unwrap();
        let bounds = Bounds {
            north: 1.0,
            south: 0.0,
            east: 1.0,
            west: 0.0,
        };
        let res = map.move_camera(CameraUpdate::NewLatLngBounds {
            bounds,
            padding: 10_000,
        });
        assert!(res.is_err());
        assert_eq!(map.camera(), None);
        assert_eq!(map.camera_moves(), 0);
    }

    #[test]
    fn clicks_on_unknown_marker_fail() {
        let mut map = HeadlessMap::new(MapConfig::default()).unwrap();
        match map.click_info_window(MarkerId(0)) {
            Err(Error::UnknownMarker(MarkerId(0))) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn snapshot_needs_camera() {
        let map = HeadlessMap::new(MapConfig::default()).unwrap();
        let p = std::env::temp_dir().join("mapmarkers_unloaded.png");
        match map.snapshot(&p) {
            Err(Error::MapNotLoaded) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = MapConfig {
            min_zoom: 80.0,
            max_zoom: 90.0,
            ..MapConfig::default()
        };
        match HeadlessMap::new(config) {
            Err(Error::InvalidConfig(_)) => (),
            Err(e) => panic!("unexpected {:?}", e),
            Ok(_) => panic!("accepted zoom beyond the limit"),
        }
    }

    #[test]
    fn snapshot_at_deepest_zoom_skips_far_markers() {
        let config = MapConfig {
            viewport_width: 64,
            viewport_height: 48,
            min_zoom: 30.0,
            max_zoom: 30.0,
            ..MapConfig::default()
        };
        let mut map = HeadlessMap::new(config).unwrap();
        map.add_marker(MarkerOptions::new(LatLng::new(0.0, 0.0))).unwrap();
        map.add_marker(MarkerOptions::new(LatLng::new(-37.81319, 144.96298))).unwrap();
        map.add_marker(MarkerOptions::new(LatLng::new(85.0, -180.0))).unwrap();
        map.move_camera(CameraUpdate::NewLatLngZoom {
                target: LatLng::new(0.0, 0.0),
                zoom: 30.0,
            })
            .unwrap();
        let p = std::env::temp_dir().join("mapmarkers_deep_zoom.png");
        map.snapshot(&p).unwrap();
        let _ = std::fs::remove_file(&p);
    }
}
