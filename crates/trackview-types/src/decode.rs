//! The frame decoder: fixed-length byte buffer in, named scalar values out.
//!
//! Decoding walks the schema's fields at a running byte offset, reading each
//! scalar little-endian. Padding fields advance the offset but emit nothing.
//! The decoder is total and deterministic for any buffer whose length equals
//! the schema's declared datagram length; every other length is rejected
//! before a single byte is interpreted.

use crate::error::DecodeError;
use crate::schema::{FrameSchema, ScalarType};

/// One decoded scalar value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    /// Signed 8-bit value.
    S8(i8),
    /// Unsigned 8-bit value.
    U8(u8),
    /// Unsigned 16-bit value.
    U16(u16),
    /// Signed 32-bit value.
    S32(i32),
    /// Unsigned 32-bit value.
    U32(u32),
    /// 32-bit float value.
    F32(f32),
}

impl FieldValue {
    /// The value as `f32`, for float fields.
    pub const fn as_f32(self) -> Option<f32> {
        match self {
            Self::F32(v) => Some(v),
            _ => None,
        }
    }

    /// The value as `u32`, widening the unsigned integer variants.
    pub fn as_u32(self) -> Option<u32> {
        match self {
            Self::U8(v) => Some(u32::from(v)),
            Self::U16(v) => Some(u32::from(v)),
            Self::U32(v) => Some(v),
            _ => None,
        }
    }

    /// The value as `i32`, widening the signed integer variants.
    pub fn as_i32(self) -> Option<i32> {
        match self {
            Self::S8(v) => Some(i32::from(v)),
            Self::S32(v) => Some(v),
            _ => None,
        }
    }

    /// The value as `u8`.
    pub const fn as_u8(self) -> Option<u8> {
        match self {
            Self::U8(v) => Some(v),
            _ => None,
        }
    }
}

/// The decoded output of one frame: named values in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    values: Vec<(String, FieldValue)>,
}

impl DecodedFrame {
    /// Look up a value by field name.
    pub fn get(&self, name: &str) -> Option<FieldValue> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Iterate `(name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Number of decoded (non-padding) fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no fields were decoded.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Decode one datagram against a schema.
///
/// # Errors
///
/// Returns [`DecodeError::LengthMismatch`] if the buffer length differs from
/// the schema's declared datagram length. [`DecodeError::Truncated`] cannot
/// occur after the length check passes but is returned instead of panicking
/// should the two ever disagree.
pub fn decode_frame(schema: &FrameSchema, bytes: &[u8]) -> Result<DecodedFrame, DecodeError> {
    let expected = schema.datagram_len();
    if bytes.len() != expected {
        return Err(DecodeError::LengthMismatch {
            expected,
            actual: bytes.len(),
        });
    }

    let mut values = Vec::with_capacity(schema.fields.len());
    let mut offset = 0usize;
    for field in &schema.fields {
        let width = field.scalar.width();
        if field.is_padding() {
            offset = offset
                .checked_add(width)
                .ok_or(DecodeError::Truncated { offset })?;
            continue;
        }
        let value = read_scalar(bytes, offset, field.scalar)?;
        values.push((field.name.clone(), value));
        offset = offset
            .checked_add(width)
            .ok_or(DecodeError::Truncated { offset })?;
    }

    Ok(DecodedFrame { values })
}

/// Read one little-endian scalar at `offset`.
fn read_scalar(bytes: &[u8], offset: usize, scalar: ScalarType) -> Result<FieldValue, DecodeError> {
    let end = offset
        .checked_add(scalar.width())
        .ok_or(DecodeError::Truncated { offset })?;
    let slice = bytes
        .get(offset..end)
        .ok_or(DecodeError::Truncated { offset })?;
    let value = match scalar {
        ScalarType::S8 => FieldValue::S8(i8::from_le_bytes(to_array(slice, offset)?)),
        ScalarType::U8 => FieldValue::U8(u8::from_le_bytes(to_array(slice, offset)?)),
        ScalarType::U16 => FieldValue::U16(u16::from_le_bytes(to_array(slice, offset)?)),
        ScalarType::S32 => FieldValue::S32(i32::from_le_bytes(to_array(slice, offset)?)),
        ScalarType::U32 => FieldValue::U32(u32::from_le_bytes(to_array(slice, offset)?)),
        ScalarType::F32 => FieldValue::F32(f32::from_le_bytes(to_array(slice, offset)?)),
    };
    Ok(value)
}

/// Convert a checked slice into a fixed-size array without indexing.
fn to_array<const N: usize>(slice: &[u8], offset: usize) -> Result<[u8; N], DecodeError> {
    slice
        .try_into()
        .map_err(|_e| DecodeError::Truncated { offset })
}
