//! Versioned save envelope
//!
//! The payload is stored as a JSON string inside a small JSON wrapper, so the
//! wrapper can be checked before the payload schema is trusted.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current envelope format version
pub const ENVELOPE_VERSION: u32 = 1;

/// On-disk wrapper around a serialized payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub version: u32,
    pub payload: String,
}

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("malformed save data: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported save version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Serialize `value` and wrap it in an envelope
pub fn seal<T: Serialize>(value: &T) -> Result<String, EnvelopeError> {
    let envelope = Envelope {
        version: ENVELOPE_VERSION,
        payload: serde_json::to_string(value)?,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Unwrap an envelope and deserialize its payload
pub fn open<T: DeserializeOwned>(text: &str) -> Result<T, EnvelopeError> {
    let envelope: Envelope = serde_json::from_str(text)?;
    if envelope.version != ENVELOPE_VERSION {
        return Err(EnvelopeError::UnsupportedVersion {
            found: envelope.version,
            expected: ENVELOPE_VERSION,
        });
    }
    Ok(serde_json::from_str(&envelope.payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        highscores: Vec<u64>,
    }

    #[test]
    fn test_payload_is_nested_json_string() {
        let text = seal(&Sample {
            highscores: vec![3, 1],
        })
        .unwrap();
        let raw: Envelope = serde_json::from_str(&text).unwrap();
        assert_eq!(raw.version, ENVELOPE_VERSION);
        assert_eq!(raw.payload, r#"{"highscores":[3,1]}"#);
    }

    #[test]
    fn test_open_rejects_garbage() {
        assert!(matches!(
            open::<Sample>("\u{0}\u{1}not json"),
            Err(EnvelopeError::Malformed(_))
        ));
    }

    #[test]
    fn test_open_rejects_bad_payload() {
        let text = r#"{"version":1,"payload":"{\"highscores\":\"oops\"}"}"#;
        assert!(matches!(open::<Sample>(text), Err(EnvelopeError::Malformed(_))));
    }

    #[test]
    fn test_open_rejects_future_version() {
        let text = r#"{"version":7,"payload":"{\"highscores\":[]}"}"#;
        assert!(matches!(
            open::<Sample>(text),
            Err(EnvelopeError::UnsupportedVersion { found: 7, .. })
        ));
    }
}
