use thiserror::Error;

/// Errors that can occur when using the heterogeneous containers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum HetError {
    /// No value of the requested type is stored
    #[error("Value not found: no `{0}` stored")]
    ValueNotFound(&'static str),

    /// The requested key was not found in the map of the requested type
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Position outside of the fraction of the requested type
    #[error("Index {index} out of range for `{type_name}` (len {len})")]
    IndexOutOfRange {
        /// Payload type of the fraction
        type_name: &'static str,
        /// Requested position
        index: usize,
        /// Length of the fraction at the time of the call
        len: usize,
    },

    /// A bulk conversion asked for a value that is not bound
    #[error("Try to access unbounded value: `{0}`")]
    UnboundedValue(&'static str),

    /// A copy was requested but a stored type was inserted as move-only
    #[error("Type `{0}` was stored as move-only and cannot be copied")]
    NotCloneable(&'static str),

    /// Aggregate size computation overflowed
    #[error("Adding overflows")]
    Overflow,

    /// The allocator could not satisfy a reservation
    #[error("Out of memory")]
    OutOfMemory,
}

/// The two families of failures a container can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Control access failures: absent values, keys, positions or copies
    Access,
    /// System failures: overflow and resource exhaustion
    System,
}

impl HetError {
    /// Returns the category this error belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            HetError::Overflow | HetError::OutOfMemory => ErrorCategory::System,
            _ => ErrorCategory::Access,
        }
    }
}

impl From<std::collections::TryReserveError> for HetError {
    fn from(_: std::collections::TryReserveError) -> Self {
        HetError::OutOfMemory
    }
}

impl From<indexmap::TryReserveError> for HetError {
    fn from(_: indexmap::TryReserveError) -> Self {
        HetError::OutOfMemory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(HetError::OutOfMemory.category(), ErrorCategory::System);
        assert_eq!(HetError::Overflow.category(), ErrorCategory::System);
        assert_eq!(
            HetError::ValueNotFound("i32").category(),
            ErrorCategory::Access
        );
        assert_eq!(
            HetError::KeyNotFound("1".to_string()).category(),
            ErrorCategory::Access
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            HetError::ValueNotFound("i32").to_string(),
            "Value not found: no `i32` stored"
        );
        assert_eq!(
            HetError::UnboundedValue("f64").to_string(),
            "Try to access unbounded value: `f64`"
        );
        assert_eq!(
            HetError::IndexOutOfRange {
                type_name: "char",
                index: 3,
                len: 1
            }
            .to_string(),
            "Index 3 out of range for `char` (len 1)"
        );
        assert_eq!(HetError::Overflow.to_string(), "Adding overflows");
        assert!(format!("{:?}", HetError::OutOfMemory).contains("OutOfMemory"));
    }
}
