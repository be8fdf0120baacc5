//! Frame schema: scalar types, field specs, and the declared wire layout.
//!
//! A [`FrameSchema`] is an ordered list of named fields plus an optional run
//! of trailing padding. The schema is validated once at load time; decoding
//! never dispatches on type names per frame. Two schemas exist in practice:
//! the deployed fixed layout ([`FrameSchema::deployed`]) and the earlier
//! descriptor-file variant ([`FrameSchema::parse_descriptor`]).

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Field name that consumes bytes but contributes no decoded value.
pub const PADDING_FIELD: &str = "PADDING";

/// The closed set of scalar types a schema field may carry.
///
/// Each variant is bound to a fixed byte width and a fixed little-endian
/// decode operation. Unknown type codes are rejected at schema load time,
/// never per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarType {
    /// Signed 8-bit integer.
    S8,
    /// Unsigned 8-bit integer.
    U8,
    /// Unsigned 16-bit integer.
    U16,
    /// Signed 32-bit integer.
    S32,
    /// Unsigned 32-bit integer.
    U32,
    /// 32-bit IEEE 754 float.
    F32,
}

impl ScalarType {
    /// Byte width of one value of this type on the wire.
    pub const fn width(self) -> usize {
        match self {
            Self::S8 | Self::U8 => 1,
            Self::U16 => 2,
            Self::S32 | Self::U32 | Self::F32 => 4,
        }
    }

    /// Parse a descriptor type code (`s8`, `u8`, `u16`, `s32`, `u32`, `f32`).
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownTypeCode`] for any other code.
    pub fn parse(code: &str) -> Result<Self, SchemaError> {
        match code {
            "s8" => Ok(Self::S8),
            "u8" => Ok(Self::U8),
            "u16" => Ok(Self::U16),
            "s32" => Ok(Self::S32),
            "u32" => Ok(Self::U32),
            "f32" => Ok(Self::F32),
            other => Err(SchemaError::UnknownTypeCode {
                code: other.to_owned(),
            }),
        }
    }
}

/// One named field in a frame schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name as it appears in decoded output. The literal
    /// [`PADDING_FIELD`] marks bytes that are skipped, not decoded.
    pub name: String,
    /// Scalar type (and therefore byte width) of the field.
    pub scalar: ScalarType,
}

impl FieldSpec {
    /// Build a field spec from a name and scalar type.
    pub fn new(name: &str, scalar: ScalarType) -> Self {
        Self {
            name: name.to_owned(),
            scalar,
        }
    }

    /// Whether this field is a padding marker.
    pub fn is_padding(&self) -> bool {
        self.name == PADDING_FIELD
    }
}

/// Ordered field layout of one telemetry datagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSchema {
    /// The declared fields, in wire order.
    pub fields: Vec<FieldSpec>,
    /// Bytes after the last declared field that belong to the datagram but
    /// are never decoded.
    pub trailing_padding: usize,
}

impl FrameSchema {
    /// Build a schema from explicit parts.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NoFields`] if the field list is empty.
    pub fn new(fields: Vec<FieldSpec>, trailing_padding: usize) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::NoFields);
        }
        Ok(Self {
            fields,
            trailing_padding,
        })
    }

    /// The deployed 324-byte layout.
    ///
    /// The upstream source emits a fixed telemetry block; only the leading
    /// 29 bytes carry fields the viewer reads, the rest is treated as
    /// trailing padding and forwarded untouched.
    pub fn deployed() -> Self {
        let fields = vec![
            FieldSpec::new("Id", ScalarType::U32),
            FieldSpec::new("IsRaceOn", ScalarType::S32),
            FieldSpec::new("PositionX", ScalarType::F32),
            FieldSpec::new("PositionY", ScalarType::F32),
            FieldSpec::new("PositionZ", ScalarType::F32),
            FieldSpec::new("Yaw", ScalarType::F32),
            FieldSpec::new("Speed", ScalarType::F32),
            FieldSpec::new("Hue", ScalarType::U8),
        ];
        let declared: usize = fields.iter().map(|f| f.scalar.width()).sum();
        Self {
            fields,
            trailing_padding: crate::frame::DATAGRAM_LEN.saturating_sub(declared),
        }
    }

    /// Parse the descriptor-file schema variant.
    ///
    /// One field per line, `"<typecode> <fieldName>;"`. Lines that do not
    /// match the shape (blank lines, comments) are skipped. A line whose
    /// first token is code-shaped but outside the closed scalar set is a
    /// load-time fatal error. `PADDING` rows are kept as padding fields.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownTypeCode`] on an unknown code and
    /// [`SchemaError::NoFields`] if no line yielded a field.
    pub fn parse_descriptor(text: &str) -> Result<Self, SchemaError> {
        let mut fields = Vec::new();
        for line in text.lines() {
            let Some((code, name)) = split_descriptor_line(line) else {
                continue;
            };
            let scalar = ScalarType::parse(code)?;
            fields.push(FieldSpec::new(name, scalar));
        }
        Self::new(fields, 0)
    }

    /// Total datagram length in bytes: declared field widths plus trailing
    /// padding.
    pub fn datagram_len(&self) -> usize {
        let declared: usize = self.fields.iter().map(|f| f.scalar.width()).sum();
        declared.saturating_add(self.trailing_padding)
    }
}

/// Split a descriptor line into `(type_code, field_name)`.
///
/// Returns `None` for lines that do not have the `"<code> <name>;"` shape
/// or whose first token is not code-shaped (a lowercase letter followed by
/// one or two digits). Shape-matching mirrors the original descriptor
/// grammar so prose lines are skipped rather than rejected.
fn split_descriptor_line(line: &str) -> Option<(&str, &str)> {
    let body = line.trim().strip_suffix(';')?;
    let mut parts = body.split_whitespace();
    let code = parts.next()?;
    let name = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let mut chars = code.chars();
    let first = chars.next()?;
    if !first.is_ascii_lowercase() {
        return None;
    }
    let digits = chars.as_str();
    if digits.is_empty() || digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some((code, name))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn scalar_widths() {
        assert_eq!(ScalarType::S8.width(), 1);
        assert_eq!(ScalarType::U8.width(), 1);
        assert_eq!(ScalarType::U16.width(), 2);
        assert_eq!(ScalarType::S32.width(), 4);
        assert_eq!(ScalarType::U32.width(), 4);
        assert_eq!(ScalarType::F32.width(), 4);
    }

    #[test]
    fn deployed_layout_is_324_bytes() {
        let schema = FrameSchema::deployed();
        assert_eq!(schema.datagram_len(), 324);
        assert_eq!(schema.fields.len(), 8);
        // Field order fixes the wire offsets: Id@0, IsRaceOn@4, PositionX@8.
        assert_eq!(schema.fields.first().unwrap().name, "Id");
        assert_eq!(schema.fields.last().unwrap().name, "Hue");
    }

    #[test]
    fn descriptor_parses_fields_in_order() {
        let text = "u32 TimestampMS;\nf32 EngineMaxRpm;\nu8 PADDING;\ns8 Steer;\n";
        let schema = FrameSchema::parse_descriptor(text).unwrap();
        assert_eq!(schema.fields.len(), 4);
        assert_eq!(schema.fields.first().unwrap().name, "TimestampMS");
        assert!(schema.fields.get(2).unwrap().is_padding());
        assert_eq!(schema.datagram_len(), 4 + 4 + 1 + 1);
    }

    #[test]
    fn descriptor_skips_non_matching_lines() {
        let text = "\n# telemetry layout\nu16 Rpm;\nnot a field line\n";
        let schema = FrameSchema::parse_descriptor(text).unwrap();
        assert_eq!(schema.fields.len(), 1);
        assert_eq!(schema.fields.first().unwrap().name, "Rpm");
    }

    #[test]
    fn unknown_type_code_is_fatal() {
        let text = "u32 Good;\nq7 Bad;\n";
        let err = FrameSchema::parse_descriptor(text);
        assert!(matches!(err, Err(SchemaError::UnknownTypeCode { code }) if code == "q7"));
    }

    #[test]
    fn empty_descriptor_is_rejected() {
        let err = FrameSchema::parse_descriptor("just prose\n");
        assert!(matches!(err, Err(SchemaError::NoFields)));
    }
}
