//! Decoder for the encoded polyline format used by routing providers.
//!
//! Every coordinate is stored as the delta from the previous one, in units of
//! 1e-5 degrees, zig-zag encoded and split into 5-bit groups. Each group is
//! offset by 63 to land in printable ASCII, and a group with bit `0x20` set is
//! followed by another group of the same value.

use crate::geo::Coordinate;

const PRECISION: f64 = 1e5;

/// Decode an encoded polyline into its coordinates, in path order.
///
/// The input is trusted: malformed strings produce meaningless coordinates
/// rather than an error. A trailing value that is cut off, or a latitude
/// without a longitude, is dropped.
pub fn decode(encoded: &str) -> Vec<Coordinate> {
    let mut bytes = encoded.bytes();
    let mut points = Vec::new();
    let mut latitude: i64 = 0;
    let mut longitude: i64 = 0;

    while let Some(delta_lat) = next_value(&mut bytes) {
        let Some(delta_lng) = next_value(&mut bytes) else {
            break;
        };
        latitude = latitude.wrapping_add(delta_lat);
        longitude = longitude.wrapping_add(delta_lng);
        points.push(Coordinate::new(
            latitude as f64 / PRECISION,
            longitude as f64 / PRECISION,
        ));
    }

    points
}

// Reads one zig-zag encoded value. None when the input runs out mid-value.
fn next_value(bytes: &mut impl Iterator<Item = u8>) -> Option<i64> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;

    loop {
        let chunk = i64::from(bytes.next()?) - 63;
        result |= (chunk & 0x1f).wrapping_shl(shift);
        shift = shift.wrapping_add(5);
        if chunk < 0x20 {
            break;
        }
    }

    Some(if result & 1 != 0 { !(result >> 1) } else { result >> 1 })
}
