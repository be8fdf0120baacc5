//! Error types for schema loading and frame decoding.
//!
//! Schema errors are load-time fatal: a configuration that names an unknown
//! scalar type must halt startup rather than silently skip the field. Decode
//! errors are per-frame and recoverable; callers log and drop the frame.

/// Errors that can occur while loading or validating a frame schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A descriptor line names a scalar type code outside the closed set.
    #[error("unknown scalar type code: {code}")]
    UnknownTypeCode {
        /// The offending type code as written in the descriptor.
        code: String,
    },

    /// The descriptor produced no fields at all.
    #[error("schema descriptor contains no fields")]
    NoFields,
}

/// Errors that can occur while decoding a single frame.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The buffer length does not match the schema's declared datagram size.
    #[error("datagram length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch {
        /// The schema's declared datagram length.
        expected: usize,
        /// The actual buffer length.
        actual: usize,
    },

    /// A field read ran past the end of the buffer.
    ///
    /// Unreachable once the length check has passed, but kept as a typed
    /// error so the decoder never indexes unchecked.
    #[error("field read out of bounds at offset {offset}")]
    Truncated {
        /// Byte offset of the failed read.
        offset: usize,
    },

    /// A named field expected by the typed projection is absent.
    #[error("missing field: {0}")]
    MissingField(String),
}
