use super::Error;

/// Error when `index(i)` addresses a position past either end of the sequence.
#[derive(Debug)]
pub(super) struct IndexOutOfRangeError {
    index: i64,
    len: usize,
}

impl std::error::Error for IndexOutOfRangeError {}

impl core::fmt::Display for IndexOutOfRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "index out of range: index {} on a sequence of {} elements",
            self.index, self.len
        )
    }
}

impl Error {
    /// Creates an index out of range error.
    ///
    /// `len` is the number of elements observed before the sequence ran out.
    pub fn index_out_of_range(index: i64, len: usize) -> Error {
        Error::from(super::ErrorKind::IndexOutOfRange(IndexOutOfRangeError {
            index,
            len,
        }))
    }

    /// Returns `true` if this error is an index out of range error.
    pub fn is_index_out_of_range(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::IndexOutOfRange(_))
    }
}
