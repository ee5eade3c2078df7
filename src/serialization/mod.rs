//! Postcard-based document encoding with versioned envelopes.
//!
//! Every stored document follows this format:
//! ```text
//! ┌─────────────────┬─────────────────┬──────────────────────────┐
//! │  MAGIC (4 bytes)│VERSION (varint) │POSTCARD PAYLOAD (N bytes)│
//! └─────────────────┴─────────────────┴──────────────────────────┘
//!   "WDOC"              u32                postcard::to_allocvec(T)
//! ```
//!
//! Decoding checks magic and version before handing the payload back, so
//! bytes written by another program or an older schema are rejected rather
//! than misread.
//!
//! Types stored this way must not use `skip_serializing_if` or other serde
//! attributes that make the field sequence data-dependent.

use crate::error::{Result, StoreError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Magic header for stored documents: b"WDOC"
pub const DOCUMENT_MAGIC: [u8; 4] = *b"WDOC";

/// Current schema version.
///
/// Increment when `Watch` or any nested record changes shape:
/// - adding/removing fields
/// - changing field types or order
/// - changing enum variants
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Versioned envelope around a stored document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DocumentEnvelope<T> {
    /// Magic header: must be b"WDOC"
    pub magic: [u8; 4],
    /// Schema version: must match CURRENT_SCHEMA_VERSION
    pub version: u32,
    pub payload: T,
}

impl<T> DocumentEnvelope<T> {
    /// Create a new envelope with current magic and version.
    pub fn new(payload: T) -> Self {
        Self {
            magic: DOCUMENT_MAGIC,
            version: CURRENT_SCHEMA_VERSION,
            payload,
        }
    }
}

/// Encode a document for storage.
///
/// # Errors
///
/// Returns `StoreError::Serialization` if Postcard serialization fails.
pub fn encode_document<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let envelope = DocumentEnvelope::new(value);
    postcard::to_allocvec(&envelope).map_err(|e| {
        error!("Document serialization failed: {}", e);
        StoreError::Serialization(e.to_string())
    })
}

/// Decode a stored document, validating the envelope.
///
/// # Errors
///
/// - `StoreError::InvalidDocument`: Invalid magic header
/// - `StoreError::VersionMismatch`: Schema version mismatch
/// - `StoreError::Deserialization`: Corrupted Postcard payload
pub fn decode_document<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let envelope: DocumentEnvelope<T> = postcard::from_bytes(bytes).map_err(|e| {
        error!("Document deserialization failed: {}", e);
        StoreError::Deserialization(e.to_string())
    })?;

    if envelope.magic != DOCUMENT_MAGIC {
        warn!(
            "Invalid stored document: expected magic {:?}, got {:?}",
            DOCUMENT_MAGIC, envelope.magic
        );
        return Err(StoreError::InvalidDocument(format!(
            "Invalid magic: expected {:?}, got {:?}",
            DOCUMENT_MAGIC, envelope.magic
        )));
    }

    if envelope.version != CURRENT_SCHEMA_VERSION {
        warn!(
            "Document version mismatch: expected {}, got {}",
            CURRENT_SCHEMA_VERSION, envelope.version
        );
        return Err(StoreError::VersionMismatch {
            expected: CURRENT_SCHEMA_VERSION,
            found: envelope.version,
        });
    }

    Ok(envelope.payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
    struct Sample {
        id: String,
        price: f64,
        tags: Vec<String>,
        note: Option<String>,
    }

    fn sample() -> Sample {
        Sample {
            id: "w-1".to_string(),
            price: 199.99,
            tags: vec!["sport".to_string()],
            note: None,
        }
    }

    #[test]
    fn test_roundtrip() {
        let bytes = encode_document(&sample()).unwrap();
        let decoded: Sample = decode_document(&bytes).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn test_envelope_structure() {
        let bytes = encode_document(&sample()).unwrap();

        // postcard uses varints, so inspect through the envelope type
        let envelope: DocumentEnvelope<Sample> = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(envelope.magic, DOCUMENT_MAGIC);
        assert_eq!(envelope.version, CURRENT_SCHEMA_VERSION);
        assert_eq!(envelope.payload, sample());
    }

    #[test]
    fn test_invalid_magic_rejected() {
        let mut envelope = DocumentEnvelope::new(sample());
        envelope.magic = *b"CKIT";
        let bytes = postcard::to_allocvec(&envelope).unwrap();

        match decode_document::<Sample>(&bytes) {
            Err(StoreError::InvalidDocument(_)) => {}
            other => panic!("Expected InvalidDocument, got {:?}", other),
        }
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut envelope = DocumentEnvelope::new(sample());
        envelope.version = 999;
        let bytes = postcard::to_allocvec(&envelope).unwrap();

        match decode_document::<Sample>(&bytes) {
            Err(StoreError::VersionMismatch { expected, found }) => {
                assert_eq!(expected, CURRENT_SCHEMA_VERSION);
                assert_eq!(found, 999);
            }
            other => panic!("Expected VersionMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_payload_rejected() {
        let mut bytes = encode_document(&sample()).unwrap();
        let len = bytes.len();
        bytes.truncate(len / 2);

        assert!(matches!(
            decode_document::<Sample>(&bytes),
            Err(StoreError::Deserialization(_))
        ));
    }

    #[test]
    fn test_deterministic_encoding() {
        let a = encode_document(&sample()).unwrap();
        let b = encode_document(&sample().clone()).unwrap();
        assert_eq!(a, b);
    }
}
