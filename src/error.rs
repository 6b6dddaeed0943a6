use thiserror::Error;

use crate::types::MarkerId;

/// Errors raised while placing markers or driving a map host.
#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot build bounds from zero coordinates")]
    EmptyBounds,

    #[error("markers were already placed on this map")]
    AlreadyPlaced,

    #[error("coordinate out of range: ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("padding of {padding}px leaves no room in a {width}x{height} viewport")]
    PaddingTooLarge { padding: u32, width: u32, height: u32 },

    #[error("invalid map config: {0}")]
    InvalidConfig(String),

    #[error("map has not been loaded yet")]
    MapNotLoaded,

    #[error("no marker with id {0}")]
    UnknownMarker(MarkerId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(String),

    #[error("could not write snapshot: {0}")]
    Snapshot(String),
}

pub type Result<T> = std::result::Result<T, Error>;
