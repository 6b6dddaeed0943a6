use std::f64::consts::PI;
use std::io::{Read, Write};
use std::path::Path;

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, JsonValue, Value};
use imagefmt::{ColFmt, ColType};
use num::{Num, ToPrimitive};

use crate::config::MapConfig;
use crate::error::{Error, Result};
use crate::types::{Bounds, BoundsBuilder, CameraPosition, LatLng, Location, Marker};

/// Web Mercator cuts off here so the map is square.
pub const MAX_MERCATOR_LAT: f64 = 85.05112878;

/// Compute the length in meters of one degree latitude and longitude at given latitude degree.
pub fn lat_lon(lat: f64) -> (f64, f64) {
    // Port of http://msi.nga.mil/MSISiteContent/StaticFiles/Calculators/degree.html
    let lat = lat * PI * 2.0 / 360.0;
    let m1 = 111132.92;
    let m2 = -559.82;
    let m3 = 1.175;
    let m4 = -0.0023;
    let p1 = 111412.84;
    let p2 = -93.5;
    let p3 = 0.118;

    let latlen = m1 + (m2 * (2.0 * lat).cos()) + (m3 * (4.0 * lat).cos()) +
                 (m4 * (6.0 * lat).cos());
    let longlen = (p1 * lat.cos()) + (p2 * (3.0 * lat).cos()) + (p3 * (5.0 * lat).cos());
    (latlen, longlen)
}

/// Approximate (height, width) of the bounds in meters, measured at the central latitude.
pub fn real_size(bounds: &Bounds) -> (f64, f64) {
    let (lat_len, lon_len) = lat_lon((bounds.south + bounds.north) / 2.0);
    (lat_len * bounds.range_lat(), lon_len * bounds.range_lon())
}

/// Find the bounds over an iterator of coordinates.
pub fn coord_bounds<'a, I: Iterator<Item = &'a LatLng>>(iter: I) -> Result<Bounds> {
    iter.fold(BoundsBuilder::new(), |mut b, p| {
            b.include(*p);
            b
        })
        .build()
}

/// Project to Web Mercator world coordinates in [0, 1], y growing southward.
pub fn project(p: LatLng) -> (f64, f64) {
    let lat = p.lat.max(-MAX_MERCATOR_LAT).min(MAX_MERCATOR_LAT).to_radians();
    let x = (p.lon + 180.0) / 360.0;
    let s = lat.sin();
    let y = 0.5 - ((1.0 + s) / (1.0 - s)).ln() / (4.0 * PI);
    (x, y)
}

/// Inverse of `project`.
pub fn unproject(x: f64, y: f64) -> LatLng {
    let lon = x * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();
    LatLng::new(lat, lon)
}

/// Find the camera that shows `bounds` as large as possible inside a viewport of
/// (width, height) pixels, keeping `padding` pixels clear on every side. The zoom is
/// clamped to the configured range, so at `min_zoom` the bounds may not fit.
pub fn fit_bounds(bounds: &Bounds,
                  viewport: (u32, u32),
                  padding: u32,
                  config: &MapConfig)
                  -> Result<CameraPosition> {
    let (width, height) = viewport;
    let avail_w = width as f64 - 2.0 * padding as f64;
    let avail_h = height as f64 - 2.0 * padding as f64;
    if avail_w <= 0.0 || avail_h <= 0.0 {
        return Err(Error::PaddingTooLarge {
            padding,
            width,
            height,
        });
    }

    let (west, north) = project(LatLng::new(bounds.north, bounds.west));
    let (east, south) = project(LatLng::new(bounds.south, bounds.east));
    let tile = config.tile_size as f64;
    let axis_zoom = |avail: f64, span: f64| if span > 0.0 {
        (avail / (span * tile)).log2()
    } else {
        f64::INFINITY
    };
    let zoom = f64::min(axis_zoom(avail_w, east - west), axis_zoom(avail_h, south - north));
    let zoom = if zoom.is_finite() { zoom } else { config.max_zoom };

    Ok(CameraPosition {
        target: unproject((west + east) / 2.0, (north + south) / 2.0),
        zoom: zoom.max(config.min_zoom).min(config.max_zoom),
    })
}

/// Lat/lon rectangle visible through a viewport of (width, height) pixels.
pub fn visible_bounds(camera: &CameraPosition, viewport: (u32, u32), tile_size: u32) -> Bounds {
    let scale = tile_size as f64 * camera.zoom.exp2();
    let (cx, cy) = project(camera.target);
    let half_w = viewport.0 as f64 / 2.0 / scale;
    let half_h = viewport.1 as f64 / 2.0 / scale;
    let nw = unproject(cx - half_w, cy - half_h);
    let se = unproject(cx + half_w, cy + half_h);
    Bounds {
        north: nw.lat,
        south: se.lat,
        east: se.lon,
        west: nw.lon,
    }
}

/// Pixel (row, col) of a coordinate in a viewport, which may fall outside of it.
pub fn to_pixel(camera: &CameraPosition, viewport: (u32, u32), tile_size: u32, p: LatLng)
                -> (f64, f64) {
    let scale = tile_size as f64 * camera.zoom.exp2();
    let (cx, cy) = project(camera.target);
    let (x, y) = project(p);
    ((y - cy) * scale + viewport.1 as f64 / 2.0, (x - cx) * scale + viewport.0 as f64 / 2.0)
}

/// Read named places from a GeoJSON FeatureCollection. Each Point feature with a string
/// `name` property becomes a location; other features are skipped.
pub fn locations_from_geojson<R: Read>(reader: R) -> Result<Vec<Location>> {
    let json: GeoJson = serde_json::from_reader(reader)?;
    let collection = match json {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(Error::GeoJson("expected a FeatureCollection".to_string())),
    };
    let mut locations = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let name = match feature.properties
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(|v| v.as_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        if let Some(ref geometry) = feature.geometry {
            if let Value::Point(ref pos) = geometry.value {
                if pos.len() < 2 {
                    return Err(Error::GeoJson(format!("point {} has fewer than 2 axes", name)));
                }
                locations.push(Location::owned(name, LatLng::checked(pos[1], pos[0])?));
            }
        }
    }
    Ok(locations)
}

/// Export markers as a FeatureCollection of titled points.
pub fn markers_to_geojson(markers: &[Marker]) -> GeoJson {
    let mut builder = BoundsBuilder::new();
    let features = markers.iter()
        .map(|m| {
            builder.include(m.position);
            let mut properties = JsonObject::new();
            if let Some(ref title) = m.title {
                properties.insert("title".to_string(), JsonValue::from(title.clone()));
            }
            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![m.position.lon, m.position.lat]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();
    GeoJson::FeatureCollection(FeatureCollection {
        bbox: builder.build().ok().map(|b| vec![b.west, b.south, b.east, b.north]),
        features,
        foreign_members: None,
    })
}

pub fn write_geojson<W: Write>(writer: W, json: &GeoJson) -> Result<()> {
    Ok(serde_json::to_writer_pretty(writer, json)?)
}

/// Write given 2D numerical matrix to a scaled grayscale image at requested path.
/// Clip specifies lower, upper bounds of values that will be clipped to black/white.
pub fn mat_to_img<T: Clone + Ord + Num + ToPrimitive, P: AsRef<Path>>(t: &[T],
                                                                      dim: (usize, usize),
                                                                      p: P,
                                                                      clip: Option<(T, T)>)
                                                                      -> Result<()> {
    let (m, n) = dim;
    if t.len() != m * n || t.is_empty() {
        return Err(Error::Snapshot(format!("{} values do not fill a {}x{} image", t.len(), m, n)));
    }
    let as_f64 = |v: &T| {
        v.to_f64().ok_or_else(|| Error::Snapshot("value not representable as f64".to_string()))
    };
    let empty = || Error::Snapshot("empty image".to_string());
    let mut min = as_f64(t.iter().min().ok_or_else(empty)?)?;
    let mut max = as_f64(t.iter().max().ok_or_else(empty)?)?;
    if let Some((lo, hi)) = clip {
        min = f64::max(min, as_f64(&lo)?);
        max = f64::min(max, as_f64(&hi)?);
    }
    // make sure range >= 1 to avoid divide by zero later.
    let range = if max > min { max - min } else { 1.0 };
    let bytes = t.iter()
        .map(|v| as_f64(v).map(|v| v.max(min).min(max)))
        .map(|v| v.map(|v| (255.0 * (v - min) / range) as u8))
        .collect::<Result<Vec<u8>>>()?;
    imagefmt::write(p, n, m, ColFmt::Y, &bytes, ColType::Auto)
        .map_err(|e| Error::Snapshot(format!("{:?}", e)))
}
