//! Typed projection of the deployed telemetry layout.
//!
//! [`TelemetryFrame`] names the eight fields the viewer actually consumes.
//! It is built from a [`DecodedFrame`] so the byte-level work stays in one
//! place and the rest of the pipeline never touches raw buffers.

use crate::decode::{DecodedFrame, decode_frame};
use crate::error::DecodeError;
use crate::schema::FrameSchema;

/// Fixed datagram size of the deployed telemetry schema, in bytes.
pub const DATAGRAM_LEN: usize = 324;

/// One telemetry snapshot for one vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryFrame {
    /// Stable vehicle identifier.
    pub id: u32,
    /// Whether the vehicle is currently in a race (i32 boolean semantics
    /// on the wire: nonzero means true).
    pub is_race_on: bool,
    /// World-space X position.
    pub pos_x: f32,
    /// World-space Y position (altitude).
    pub pos_y: f32,
    /// World-space Z position.
    pub pos_z: f32,
    /// Heading in radians.
    pub yaw: f32,
    /// Speed in meters per second.
    pub speed: f32,
    /// Marker hue, 0-254.
    pub hue: u8,
}

impl TelemetryFrame {
    /// Build a typed frame from decoded field values.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MissingField`] if any of the named fields is
    /// absent or carries the wrong scalar shape.
    pub fn from_decoded(decoded: &DecodedFrame) -> Result<Self, DecodeError> {
        let id = decoded
            .get("Id")
            .and_then(crate::decode::FieldValue::as_u32)
            .ok_or_else(|| DecodeError::MissingField("Id".to_owned()))?;
        let is_race_on = decoded
            .get("IsRaceOn")
            .and_then(crate::decode::FieldValue::as_i32)
            .ok_or_else(|| DecodeError::MissingField("IsRaceOn".to_owned()))?
            != 0;
        let pos_x = require_f32(decoded, "PositionX")?;
        let pos_y = require_f32(decoded, "PositionY")?;
        let pos_z = require_f32(decoded, "PositionZ")?;
        let yaw = require_f32(decoded, "Yaw")?;
        let speed = require_f32(decoded, "Speed")?;
        let hue = decoded
            .get("Hue")
            .and_then(crate::decode::FieldValue::as_u8)
            .ok_or_else(|| DecodeError::MissingField("Hue".to_owned()))?;

        Ok(Self {
            id,
            is_race_on,
            pos_x,
            pos_y,
            pos_z,
            yaw,
            speed,
            hue,
        })
    }

    /// Decode a raw datagram straight into a typed frame.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::LengthMismatch`] for mis-sized buffers and
    /// [`DecodeError::MissingField`] if the schema does not declare the
    /// deployed field names.
    pub fn from_datagram(schema: &FrameSchema, bytes: &[u8]) -> Result<Self, DecodeError> {
        let decoded = decode_frame(schema, bytes)?;
        Self::from_decoded(&decoded)
    }
}

/// Fetch a required `f32` field by name.
fn require_f32(decoded: &DecodedFrame, name: &str) -> Result<f32, DecodeError> {
    decoded
        .get(name)
        .and_then(crate::decode::FieldValue::as_f32)
        .ok_or_else(|| DecodeError::MissingField(name.to_owned()))
}
