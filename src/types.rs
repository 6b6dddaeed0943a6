use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Represent some map coordinate, in degrees.
#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lon: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lon: f64) -> LatLng {
        LatLng { lat, lon }
    }

    /// Build a coordinate, rejecting latitude outside [-90, 90] or longitude outside
    /// [-180, 180].
    pub fn checked(lat: f64, lon: f64) -> Result<LatLng> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(Error::InvalidCoordinate { lat, lon });
        }
        Ok(LatLng { lat, lon })
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// Represent some map bounds, in degrees.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    pub fn range_lat(&self) -> f64 {
        self.north - self.south
    }
    pub fn range_lon(&self) -> f64 {
        self.east - self.west
    }

    pub fn south_west(&self) -> LatLng {
        LatLng::new(self.south, self.west)
    }

    pub fn north_east(&self) -> LatLng {
        LatLng::new(self.north, self.east)
    }

    /// Midpoint in degrees. Not the same as the visual center on a Mercator map.
    pub fn center(&self) -> LatLng {
        LatLng::new((self.north + self.south) / 2.0, (self.east + self.west) / 2.0)
    }

    pub fn contains(&self, p: LatLng) -> bool {
        self.south <= p.lat && p.lat <= self.north && self.west <= p.lon && p.lon <= self.east
    }

    /// True if `other` lies entirely inside these bounds.
    pub fn contains_bounds(&self, other: &Bounds) -> bool {
        self.contains(other.south_west()) && self.contains(other.north_east())
    }
}

/// Accumulates coordinates into the smallest enclosing `Bounds`. Longitude wraparound
/// is not handled: a set straddling the antimeridian gets the wide rectangle.
#[derive(Debug, Clone, Copy)]
pub struct BoundsBuilder {
    north: f64,
    south: f64,
    east: f64,
    west: f64,
    count: usize,
}

impl Default for BoundsBuilder {
    fn default() -> BoundsBuilder {
        BoundsBuilder {
            north: f64::MIN,
            south: f64::MAX,
            east: f64::MIN,
            west: f64::MAX,
            count: 0,
        }
    }
}

impl BoundsBuilder {
    pub fn new() -> BoundsBuilder {
        BoundsBuilder::default()
    }

    pub fn include(&mut self, p: LatLng) -> &mut BoundsBuilder {
        self.north = f64::max(self.north, p.lat);
        self.south = f64::min(self.south, p.lat);
        self.east = f64::max(self.east, p.lon);
        self.west = f64::min(self.west, p.lon);
        self.count += 1;
        self
    }

    /// Number of coordinates included so far.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Freeze the accumulated region. Fails if nothing was included.
    pub fn build(self) -> Result<Bounds> {
        if self.is_empty() {
            return Err(Error::EmptyBounds);
        }
        Ok(Bounds {
            north: self.north,
            south: self.south,
            east: self.east,
            west: self.west,
        })
    }
}

/// A named place to put a marker on.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub name: Cow<'static, str>,
    pub position: LatLng,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lon: f64) -> Location {
        Location {
            name: Cow::Borrowed(name),
            position: LatLng::new(lat, lon),
        }
    }

    pub fn owned(name: String, position: LatLng) -> Location {
        Location {
            name: Cow::Owned(name),
            position,
        }
    }
}

/// Handle to a marker owned by the map host.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct MarkerId(pub usize);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Description of a marker to add.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerOptions {
    pub position: LatLng,
    pub title: Option<String>,
}

impl MarkerOptions {
    pub fn new(position: LatLng) -> MarkerOptions {
        MarkerOptions {
            position,
            title: None,
        }
    }

    pub fn title<S: Into<String>>(mut self, title: S) -> MarkerOptions {
        self.title = Some(title.into());
        self
    }
}

/// A marker placed on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub position: LatLng,
    pub title: Option<String>,
    /// Arbitrary lookup data; the placement pass stores the source coordinate here.
    pub tag: Option<LatLng>,
}

/// What an info-window renderer hands back to the host for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoView {
    pub name: String,
}

/// Center and zoom of the map camera. Zoom follows the web map convention where the
/// world is `tile_size * 2^zoom` pixels wide.
#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub struct CameraPosition {
    pub target: LatLng,
    pub zoom: f64,
}

/// Instruction for the host to reposition the camera, applied without animation.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum CameraUpdate {
    /// Smallest view containing `bounds` with `padding` pixels on every side.
    NewLatLngBounds { bounds: Bounds, padding: u32 },
    NewLatLngZoom { target: LatLng, zoom: f64 },
}

/// Lifecycle of a placement pass on one map.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PlacementState {
    NotReady,
    ReadyPlacing,
    ReadyFitted,
}

impl Default for PlacementState {
    fn default() -> PlacementState {
        PlacementState::NotReady
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_tracks_extremes() {
        let mut b = BoundsBuilder::new();
        b.include(LatLng::new(0.0, 0.0)).include(LatLng::new(10.0, 10.0));
        assert_eq!(b.len(), 2);
        let bounds = b.build().unwrap();
        assert_eq!(bounds,
                   Bounds {
                       north: 10.0,
                       south: 0.0,
                       east: 10.0,
                       west: 0.0,
                   });
        assert_eq!(bounds.center(), LatLng::new(5.0, 5.0));
    }

    #[test]
    fn single_point_is_degenerate() {
        let mut b = BoundsBuilder::new();
        b.include(LatLng::new(-12.5, 130.8));
        let bounds = b.build().unwrap();
        assert_eq!(bounds.range_lat(), 0.0);
        assert_eq!(bounds.range_lon(), 0.0);
        assert!(bounds.contains(LatLng::new(-12.5, 130.8)));
    }

    #[test]
    fn empty_builder_fails() {
        match BoundsBuilder::new().build() {
            Err(Error::EmptyBounds) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn checked_rejects_out_of_range() {
        assert!(LatLng::checked(90.0, -180.0).is_ok());
        assert!(LatLng::checked(90.5, 0.0).is_err());
        assert!(LatLng::checked(0.0, 181.0).is_err());
    }

    #[test]
    fn contains_bounds_is_inclusive() {
        let outer = Bounds {
            north: 1.0,
            south: -1.0,
            east: 1.0,
            west: -1.0,
        };
        assert!(outer.contains_bounds(&outer));
        let inner = Bounds {
            north: 0.5,
            south: -0.5,
            east: 1.5,
            west: 0.0,
        };
        assert!(!outer.contains_bounds(&inner));
    }
}
