//! Shared frame schema and decoding types for the Trackview relay and viewer.
//!
//! This crate is the single source of truth for the telemetry wire format.
//! The relay uses it to validate datagram lengths before fan-out; the viewer
//! uses it to turn raw bytes into typed per-vehicle state.
//!
//! # Modules
//!
//! - [`schema`] -- Scalar types, field specs, and the frame schema (declared
//!   layout plus the descriptor-file parser)
//! - [`decode`] -- The offset-walking little-endian decoder
//! - [`frame`] -- The typed [`TelemetryFrame`] projection of the deployed
//!   schema
//! - [`error`] -- Schema and decode error types

pub mod decode;
pub mod error;
pub mod frame;
pub mod schema;

// Re-export primary types at the crate root for convenience.
pub use decode::{DecodedFrame, FieldValue, decode_frame};
pub use error::{DecodeError, SchemaError};
pub use frame::{DATAGRAM_LEN, TelemetryFrame};
pub use schema::{FieldSpec, FrameSchema, PADDING_FIELD, ScalarType};
