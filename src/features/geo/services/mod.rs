mod coord_converter;

pub use coord_converter::{
    convert_from_latlon, convert_to_latlon, CoordinateFormat, CoordinateStrings, LatLon,
};
