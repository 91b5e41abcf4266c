use super::Error;

/// Error when a request fails static validation.
///
/// This occurs when:
/// - A source name is not part of the schema
/// - An attribute is read from a value that has no such field
/// - A collection operator is applied to a non-sequence
/// - A context reference escapes every enclosing scope
#[derive(Debug)]
pub(super) struct InvalidRequestError {
    message: Box<str>,
}

impl std::error::Error for InvalidRequestError {}

impl core::fmt::Display for InvalidRequestError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid request: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidRequest(InvalidRequestError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid request error.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidRequest(_))
    }
}
