use thiserror::Error;

use crate::core::types::{MetricKey, MetricKind};

/// Failures raised while decoding or aggregating InterOp metrics.
///
/// None of these are retried or swallowed inside the library; whether a failure
/// is fatal for a whole run is up to the caller.
#[derive(Error, Debug)]
pub enum MetricError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported {kind} metric format version: {version}")]
    UnsupportedVersion { kind: MetricKind, version: u8 },

    #[error("Bad {kind} metric format (version {version}) at byte {offset}: {reason}")]
    BadFormat {
        kind: MetricKind,
        version: u8,
        offset: u64,
        reason: String,
    },

    #[error("Truncated {kind} metric file at byte {offset}: expected {expected} bytes, found {found}")]
    Truncated {
        kind: MetricKind,
        offset: u64,
        expected: usize,
        found: usize,
    },

    #[error("Duplicate {kind} metric record for {key}")]
    DuplicateKey { kind: MetricKind, key: MetricKey },

    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(String),

    #[error("{0} metrics were already loaded")]
    AlreadyLoaded(MetricKind),
}

impl MetricError {
    /// True for failures caused by the content of an InterOp file
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedVersion { .. }
                | Self::BadFormat { .. }
                | Self::Truncated { .. }
                | Self::DuplicateKey { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = MetricError::Truncated {
            kind: MetricKind::Error,
            offset: 32,
            expected: 30,
            found: 29,
        };
        let msg = err.to_string();
        assert!(msg.contains("Error"));
        assert!(msg.contains("32"));
        assert!(msg.contains("29"));
        assert!(err.is_format_error());

        let err = MetricError::IndexOutOfBounds("no bins".to_string());
        assert!(!err.is_format_error());
    }
}
