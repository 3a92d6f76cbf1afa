//! Error handling for DCL codec operations
//!
//! Every failure of the implode/explode entry points is reported as a
//! [`DclError`]. The coarse [`ErrorKind`] taxonomy lets callers decide how to
//! react without matching on every variant.

use thiserror::Error;

/// Coarse classification of a [`DclError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unrecognized mode byte or dictionary class byte in the stream header
    InvalidHeader,
    /// A caller-supplied parameter is outside the supported set
    InvalidParameter,
    /// Input ended in the middle of a symbol
    UnexpectedEof,
    /// A read or write callback failed
    Aborted,
    /// The compressed stream decodes to something impossible
    BadData,
}

/// Error type for DCL operations
#[derive(Debug, Error)]
pub enum DclError {
    /// Invalid compression mode value
    #[error("Invalid compression mode: {0} (expected 0 or 1)")]
    InvalidCompressionMode(u8),

    /// Invalid dictionary size bits
    #[error("Invalid dictionary bits: {0} (expected 4, 5, or 6)")]
    InvalidDictionaryBits(u8),

    /// Invalid dictionary size
    #[error("Invalid dictionary size: {0} (expected 1024, 2048, or 4096)")]
    InvalidDictionarySize(u32),

    /// Input exhausted mid-symbol; `produced` bytes were already decoded
    #[error("Unexpected end of input after {produced} decoded bytes")]
    UnexpectedEof {
        /// Number of bytes decoded before the input ran out
        produced: u64,
    },

    /// Back-reference reaching outside the decoded history
    #[error("Invalid distance {distance} with only {available} bytes of history")]
    InvalidDistance {
        /// Decoded backward distance
        distance: u32,
        /// Bytes of history available at that point
        available: u64,
    },

    /// Invalid data format or corruption
    #[error("Invalid data: {0}")]
    BadData(String),

    /// A read or write callback reported an error
    #[error("Callback aborted: {0}")]
    Aborted(#[from] std::io::Error),
}

impl DclError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DclError::InvalidCompressionMode(_) | DclError::InvalidDictionaryBits(_) => {
                ErrorKind::InvalidHeader
            }
            DclError::InvalidDictionarySize(_) => ErrorKind::InvalidParameter,
            DclError::UnexpectedEof { .. } => ErrorKind::UnexpectedEof,
            DclError::InvalidDistance { .. } | DclError::BadData(_) => ErrorKind::BadData,
            DclError::Aborted(_) => ErrorKind::Aborted,
        }
    }

    /// An equivalent error for reporting the same failure again
    ///
    /// Callback errors keep their [`std::io::ErrorKind`] and message.
    pub(crate) fn replay(&self) -> Self {
        match self {
            DclError::InvalidCompressionMode(mode) => DclError::InvalidCompressionMode(*mode),
            DclError::InvalidDictionaryBits(bits) => DclError::InvalidDictionaryBits(*bits),
            DclError::InvalidDictionarySize(size) => DclError::InvalidDictionarySize(*size),
            DclError::UnexpectedEof { produced } => DclError::UnexpectedEof {
                produced: *produced,
            },
            DclError::InvalidDistance {
                distance,
                available,
            } => DclError::InvalidDistance {
                distance: *distance,
                available: *available,
            },
            DclError::BadData(msg) => DclError::BadData(msg.clone()),
            DclError::Aborted(inner) => {
                DclError::Aborted(std::io::Error::new(inner.kind(), inner.to_string()))
            }
        }
    }
}

impl From<DclError> for std::io::Error {
    fn from(err: DclError) -> Self {
        match err {
            DclError::Aborted(inner) => inner,
            DclError::UnexpectedEof { .. } => {
                std::io::Error::new(std::io::ErrorKind::UnexpectedEof, err)
            }
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}

/// Result type alias for DCL operations
pub type Result<T> = std::result::Result<T, DclError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            DclError::InvalidCompressionMode(9).kind(),
            ErrorKind::InvalidHeader
        );
        assert_eq!(
            DclError::InvalidDictionaryBits(7).kind(),
            ErrorKind::InvalidHeader
        );
        assert_eq!(
            DclError::InvalidDictionarySize(512).kind(),
            ErrorKind::InvalidParameter
        );
        assert_eq!(
            DclError::UnexpectedEof { produced: 3 }.kind(),
            ErrorKind::UnexpectedEof
        );
        assert_eq!(
            DclError::InvalidDistance {
                distance: 10,
                available: 2
            }
            .kind(),
            ErrorKind::BadData
        );
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        assert_eq!(DclError::from(io).kind(), ErrorKind::Aborted);
    }

    #[test]
    fn test_io_error_conversion() {
        let eof: std::io::Error = DclError::UnexpectedEof { produced: 0 }.into();
        assert_eq!(eof.kind(), std::io::ErrorKind::UnexpectedEof);

        let bad: std::io::Error = DclError::BadData("broken".to_string()).into();
        assert_eq!(bad.kind(), std::io::ErrorKind::InvalidData);

        let original = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let round: std::io::Error = DclError::Aborted(original).into();
        assert_eq!(round.kind(), std::io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_replay_keeps_kind() {
        let eof = DclError::UnexpectedEof { produced: 7 };
        assert!(matches!(eof.replay(), DclError::UnexpectedEof { produced: 7 }));

        let distance = DclError::InvalidDistance {
            distance: 9,
            available: 4,
        };
        assert_eq!(distance.replay().to_string(), distance.to_string());

        let aborted = DclError::Aborted(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "gone",
        ));
        let io: std::io::Error = aborted.replay().into();
        assert_eq!(io.kind(), std::io::ErrorKind::BrokenPipe);
        assert_eq!(io.to_string(), "gone");
    }
}
