use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Padding, in pixels, kept between the fitted markers and the viewport edge.
pub const DEFAULT_PADDING: u32 = 100;
pub const DEFAULT_TILE_SIZE: u32 = 256;
/// Deepest zoom a config may ask for.
pub const MAX_ZOOM_LIMIT: f64 = 30.0;

/// Settings for the map host and the camera fit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub padding: u32,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub tile_size: u32,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for MapConfig {
    fn default() -> MapConfig {
        MapConfig {
            padding: DEFAULT_PADDING,
            viewport_width: 1080,
            viewport_height: 1920,
            tile_size: DEFAULT_TILE_SIZE,
            min_zoom: 0.0,
            max_zoom: 21.0,
        }
    }
}

impl MapConfig {
    pub fn from_reader<R: Read>(reader: R) -> Result<MapConfig> {
        let config: MapConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(p: P) -> Result<MapConfig> {
        MapConfig::from_reader(BufReader::new(File::open(p)?))
    }

    /// Check that the viewport and tile are non-empty and that
    /// `0 <= min_zoom <= max_zoom <= MAX_ZOOM_LIMIT`.
    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 {
            return Err(Error::InvalidConfig("tile_size must be positive".to_string()));
        }
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(Error::InvalidConfig(format!("empty viewport {}x{}",
                                                    self.viewport_width,
                                                    self.viewport_height)));
        }
        if !(0.0 <= self.min_zoom && self.min_zoom <= self.max_zoom &&
             self.max_zoom <= MAX_ZOOM_LIMIT) {
            return Err(Error::InvalidConfig(format!("zoom range [{}, {}] not within [0, {}]",
                                                    self.min_zoom,
                                                    self.max_zoom,
                                                    MAX_ZOOM_LIMIT)));
        }
        Ok(())
    }

    /// Viewport as (width, height) pixels.
    pub fn viewport(&self) -> (u32, u32) {
        (self.viewport_width, self.viewport_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = MapConfig::from_reader(r#"{"padding": 32, "viewport_width": 400}"#.as_bytes())
            .unwrap();
        assert_eq!(cfg.padding, 32);
        assert_eq!(cfg.viewport(), (400, 1920));
        assert_eq!(cfg.tile_size, DEFAULT_TILE_SIZE);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        for src in &[r#"{"tile_size": 0}"#,
                     r#"{"viewport_height": 0}"#,
                     r#"{"min_zoom": 12.0, "max_zoom": 4.0}"#,
                     r#"{"min_zoom": -1.0}"#,
                     r#"{"min_zoom": 80.0, "max_zoom": 90.0}"#] {
            match MapConfig::from_reader(src.as_bytes()) {
                Err(Error::InvalidConfig(_)) => (),
                other => panic!("{} gave {:?}", src, other),
            }
        }
    }

    #[test]
    fn nan_zoom_is_rejected() {
        let cfg = MapConfig { max_zoom: f64::NAN, ..MapConfig::default() };
        assert!(cfg.validate().is_err());
        assert!(MapConfig::default().validate().is_ok());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(MapConfig::from_reader("{padding".as_bytes()).is_err());
    }
}
