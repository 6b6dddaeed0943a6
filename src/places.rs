use crate::types::Location;

/// Capital cities of Australia's states and territories, plus Alice Springs.
pub static PLACES: [Location; 7] = [
    Location::new("BRISBANE", -27.47093, 153.0235),
    Location::new("MELBOURNE", -37.81319, 144.96298),
    Location::new("DARWIN", -12.4634, 130.8456),
    Location::new("SYDNEY", -33.87365, 151.20689),
    Location::new("ADELAIDE", -34.92873, 138.59995),
    Location::new("PERTH", -31.952854, 115.857342),
    Location::new("ALICE_SPRINGS", -24.6980, 133.8807),
];
