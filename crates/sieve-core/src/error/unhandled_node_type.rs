use super::Error;

/// Error when no handler is registered for a node type or any of its supertypes.
#[derive(Debug)]
pub(super) struct UnhandledNodeTypeError {
    kind: Box<str>,
}

impl std::error::Error for UnhandledNodeTypeError {}

impl core::fmt::Display for UnhandledNodeTypeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "no handler registered for node type {}", self.kind)
    }
}

impl Error {
    /// Creates an unhandled node type error.
    pub fn unhandled_node_type(kind: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnhandledNodeType(UnhandledNodeTypeError {
            kind: kind.into().into(),
        }))
    }

    /// Returns `true` if this error is an unhandled node type error.
    pub fn is_unhandled_node_type(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnhandledNodeType(_))
    }
}
