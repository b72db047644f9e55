//! Error conversion helpers for common I/O operations
//!
//! Provides extension traits for cleaner error handling with path context.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// A missing file becomes `TreeNotFound` so callers can report it as
    /// missing input rather than a generic failure.
    ///
    /// # Example
    /// ```ignore
    /// fs.read_to_string(&path)
    ///     .with_path_context("read tree", &path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ApplicationError::TreeNotFound(path.to_path_buf()),
            _ => ApplicationError::OperationFailed {
                context: format!("{}: {}", action, path.display()),
                source: Box::new(e),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn given_not_found_when_adding_context_then_tree_not_found() {
        let result: io::Result<()> = Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = result
            .with_path_context("read tree", Path::new("x.tree"))
            .unwrap_err();
        assert!(matches!(err, ApplicationError::TreeNotFound(p) if p == PathBuf::from("x.tree")));
    }

    #[test]
    fn given_other_error_when_adding_context_then_keeps_action_and_path() {
        let result: io::Result<()> = Err(io::Error::new(io::ErrorKind::PermissionDenied, "nope"));
        let err = result
            .with_path_context("read tree", Path::new("x.tree"))
            .unwrap_err();
        assert_eq!(err.to_string(), "operation failed: read tree: x.tree");
    }
}
