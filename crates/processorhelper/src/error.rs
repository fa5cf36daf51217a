// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use collector_core::BoxError;

/// Errors raised while building a processor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("nil processor function")]
    MissingProcessFunc,
}

/// Outcome of a processing function that did not produce a batch.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// The function intentionally produced nothing for this batch. The
    /// processor reports success and forwards nothing.
    #[error("sentinel error to skip processing data from the remainder of the pipeline")]
    SkipProcessingData,

    /// Any other failure. Returned to the caller unchanged.
    #[error("{0}")]
    Other(BoxError),
}

impl ProcessError {
    pub fn other(err: impl Into<BoxError>) -> Self {
        ProcessError::Other(err.into())
    }

    #[must_use]
    pub fn is_skip(&self) -> bool {
        matches!(self, ProcessError::SkipProcessingData)
    }
}

impl From<BoxError> for ProcessError {
    fn from(err: BoxError) -> Self {
        ProcessError::Other(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("my_error")]
    struct MyError;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::MissingProcessFunc.to_string(), "nil processor function");
        assert_eq!(ProcessError::other(MyError).to_string(), "my_error");
    }

    #[test]
    fn test_skip_is_distinct_from_other() {
        assert!(ProcessError::SkipProcessingData.is_skip());
        assert!(!ProcessError::other(MyError).is_skip());
        // An ordinary error that happens to carry the same message is not a skip.
        let lookalike = ProcessError::other(ProcessError::SkipProcessingData.to_string());
        assert!(!lookalike.is_skip());
    }

    #[test]
    fn test_other_keeps_original_error() {
        let ProcessError::Other(inner) = ProcessError::other(MyError) else {
            panic!("expected Other");
        };
        assert_eq!(inner.downcast_ref::<MyError>(), Some(&MyError));
    }
}
