use super::Error;

/// Error when `one()` finds more than one element.
#[derive(Debug)]
pub(super) struct MultipleResultsError {
    context: Option<Box<str>>,
}

impl std::error::Error for MultipleResultsError {}

impl core::fmt::Display for MultipleResultsError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("multiple results")?;
        if let Some(ref ctx) = self.context {
            write!(f, ": {}", ctx)?;
        }
        Ok(())
    }
}

impl Error {
    /// Creates a multiple results error.
    pub fn multiple_results(context: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::MultipleResults(MultipleResultsError {
            context: Some(context.into().into()),
        }))
    }

    /// Returns `true` if this error is a multiple results error.
    pub fn is_multiple_results(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::MultipleResults(_))
    }
}
