//! Error types for recordstore and the layers built on it

use std::fmt;
use std::io;

/// Result type alias for record and search operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for record loading, storage and search
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(io::Error),

    /// Malformed input record (1-based line number)
    Parse {
        /// Line the error was found on
        line: usize,
        /// What was wrong with it
        message: String,
    },

    /// Key not found
    NotFound(u64),

    /// Replicated key does not fit in a u64
    KeyOverflow {
        /// Base record id
        base_id: u64,
        /// Replica index that overflowed
        replica: u64,
    },

    /// Attribute is not indexed by this cache
    UnknownAttribute(String),

    /// Query was finished without any criteria
    EmptyQuery,

    /// Search configuration rejected at cache construction
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Parse { line, message } => write!(f, "Parse error on line {}: {}", line, message),
            Error::NotFound(key) => write!(f, "Key not found: {}", key),
            Error::KeyOverflow { base_id, replica } => write!(
                f,
                "Key overflow: replica {} of record {} exceeds u64",
                replica, base_id
            ),
            Error::UnknownAttribute(name) => write!(f, "Attribute '{}' is not searchable", name),
            Error::EmptyQuery => write!(f, "Query has no criteria"),
            Error::InvalidConfig(msg) => write!(f, "Invalid search configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_parse() {
        let err = Error::Parse {
            line: 7,
            message: "expected gender".to_string(),
        };
        assert_eq!(err.to_string(), "Parse error on line 7: expected gender");
    }

    #[test]
    fn test_io_source() {
        use std::error::Error as _;

        let err = Error::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(err.source().is_some());
        assert!(Error::EmptyQuery.source().is_none());
    }
}
