//! Error types used by the [`meeteval-der`](crate) program.

use std::fmt::{Display, Formatter};

use anyhow::Context;

/// Error type used by the [`meeteval-der`](crate) program.
///
/// Currently mapped to [`anyhow::Error`].
pub type Error = anyhow::Error;

/// Result type used by the [`meeteval-der`](crate) program.
///
/// Currently mapped to [`anyhow::Result`] in order to use our [`Error`] type.
pub type Result<T> = anyhow::Result<T>;

/// Several errors collected from concurrent tasks, reported as one.
#[derive(Debug)]
pub struct MultiError(Vec<Error>);

impl MultiError {
    /// Returns `Ok(())` if `errors` is empty, otherwise a [`MultiError`] wrapped in `context`.
    pub fn check<C, F>(errors: Vec<Error>, context: F) -> Result<()>
    where
        F: FnOnce() -> C,
        C: Display + Send + Sync + 'static,
    {
        errors
            .is_empty()
            .then_some(())
            .ok_or_else(|| MultiError(errors))
            .with_context(context)
    }

    /// The collected errors.
    pub fn errors(&self) -> &[Error] {
        &self.0
    }
}

impl Display for MultiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Multiple errors encountered:\n")?;
        self.0
            .iter()
            .enumerate()
            .try_fold((), |_, (i, error)| writeln!(f, "{i}: {error:#}\n"))
    }
}

impl std::error::Error for MultiError {}

#[cfg(test)]
mod tests {
    mod multi_error {
        use anyhow::anyhow;
        use assert_matches::assert_matches;

        use crate::error::MultiError;

        #[test]
        fn test_no_errors() {
            assert!(MultiError::check(vec![], || "unused").is_ok());
        }

        #[test]
        fn test_with_errors() {
            let result = MultiError::check(vec![anyhow!("first"), anyhow!("second")], || "outer");

            assert_matches!(result, Err(err) => {
                assert_eq!("outer", err.to_string());
                assert_matches!(err.source(), Some(source) => {
                    assert_matches!(source.downcast_ref::<MultiError>(), Some(multi_err) => {
                        assert_eq!(2, multi_err.errors().len());

                        let message = multi_err.to_string();
                        assert!(message.contains("0: first"));
                        assert!(message.contains("1: second"));
                    });
                });
            });
        }
    }
}
