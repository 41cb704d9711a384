//! Encoded polyline decoding.
//!
//! Standard delta encoding: 5 bits per character, ASCII offset 63,
//! continuation bit 0x20, coordinates scaled by 1e5.

use crate::models::GeoPoint;
use thiserror::Error;

const PRECISION: f64 = 1e5;
const ASCII_OFFSET: u8 = 63;
const CONTINUATION_BIT: i64 = 0x20;
const CHUNK_MASK: i64 = 0x1f;
/// Shift beyond which a chunk no longer fits in an i64 accumulator.
const MAX_SHIFT: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryDecodeError {
    #[error("polyline truncated at byte {offset}")]
    Truncated { offset: usize },
    #[error("invalid polyline byte {byte:#04x} at {offset}")]
    InvalidByte { offset: usize, byte: u8 },
    #[error("polyline value overflows at byte {offset}")]
    Overflow { offset: usize },
}

/// Decode an encoded polyline into an ordered list of points.
///
/// An empty string yields an empty list.
pub fn decode_polyline(encoded: &str) -> Result<Vec<GeoPoint>, GeometryDecodeError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::with_capacity(bytes.len() / 4);
    let mut index = 0;
    let mut latitude: i64 = 0;
    let mut longitude: i64 = 0;

    while index < bytes.len() {
        let offset = index;
        latitude = latitude
            .checked_add(next_delta(bytes, &mut index)?)
            .ok_or(GeometryDecodeError::Overflow { offset })?;
        let offset = index;
        longitude = longitude
            .checked_add(next_delta(bytes, &mut index)?)
            .ok_or(GeometryDecodeError::Overflow { offset })?;

        points.push(GeoPoint::new(
            latitude as f64 / PRECISION,
            longitude as f64 / PRECISION,
        ));
    }

    Ok(points)
}

fn next_delta(bytes: &[u8], index: &mut usize) -> Result<i64, GeometryDecodeError> {
    let mut shift: u32 = 0;
    let mut result: i64 = 0;

    loop {
        let offset = *index;
        let byte = *bytes
            .get(offset)
            .ok_or(GeometryDecodeError::Truncated { offset })?;
        if !(ASCII_OFFSET..=b'~').contains(&byte) {
            return Err(GeometryDecodeError::InvalidByte { offset, byte });
        }
        if shift > MAX_SHIFT {
            return Err(GeometryDecodeError::Overflow { offset });
        }

        let chunk = i64::from(byte - ASCII_OFFSET);
        result |= (chunk & CHUNK_MASK) << shift;
        shift += 5;
        *index += 1;

        if chunk < CONTINUATION_BIT {
            break;
        }
    }

    Ok(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}
