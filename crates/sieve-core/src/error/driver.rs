use super::{Error, ErrorKind};

use std::{error::Error as StdError, fmt, iter};

/// A native error raised by a backend while running a fragment or accessing a source.
///
/// Displayed with its whole `source()` chain, since the chain is where backends such as rusqlite
/// put the useful part.
#[derive(Debug)]
pub(super) struct DriverError {
    cause: Box<dyn StdError + Send + Sync>,
}

impl StdError for DriverError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.cause)
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first: &(dyn StdError + 'static) = &*self.cause;
        let causes = iter::successors(Some(first), |&err| err.source());
        for (i, err) in causes.enumerate() {
            if i > 0 {
                f.write_str(": ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Wraps a backend's native error. The error is kept as is and reachable through `source()`.
    pub fn driver(err: impl StdError + Send + Sync + 'static) -> Error {
        Error::from(ErrorKind::Driver(DriverError {
            cause: Box::new(err),
        }))
    }

    pub fn is_driver(&self) -> bool {
        matches!(self.kind(), ErrorKind::Driver(_))
    }
}
