// Error taxonomy for the import pipeline
//
// Operators need to tell "bad legacy data" apart from "infrastructure
// failure", so normalization and persistence problems are distinct kinds.

use thiserror::Error;

/// Errors raised by normalization, mapping and persistence.
///
/// Mapping functions propagate these to their import step with `?`.
/// The orchestrator is the last stop: it converts any `ImportError` into a
/// failure notification and never re-raises past its boundary.
#[derive(Debug, Error)]
pub enum ImportError {
    /// A legacy field failed to parse into its expected type.
    ///
    /// Fatal to the current step. Issue/increment counters in particular
    /// must never be defaulted to 0 on parse failure: that would silently
    /// change which licence version wins resolution.
    #[error("normalization failed for {field}={value:?}: {reason}")]
    Normalization {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// The target store rejected a write or could not be reached.
    #[error("target store error: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// A batch merge failed partway through.
    ///
    /// `merged` rows of `scope` were applied (and rolled back) before
    /// `failed_id` was rejected; callers get the scope and identifier
    /// rather than an opaque boolean.
    #[error("merge of {scope} failed at {failed_id} after {merged} rows: {source}")]
    PartialMerge {
        scope: &'static str,
        merged: usize,
        failed_id: String,
        #[source]
        source: rusqlite::Error,
    },
}

impl ImportError {
    pub fn normalization(field: &'static str, value: &str, reason: impl Into<String>) -> Self {
        ImportError::Normalization {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the failure is a data problem rather than infrastructure.
    pub fn is_data_error(&self) -> bool {
        matches!(self, ImportError::Normalization { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_distinguishable() {
        let data = ImportError::normalization("ISSUE_NO", "abc", "not a number");
        assert!(data.is_data_error());

        let infra = ImportError::Persistence(rusqlite::Error::InvalidQuery);
        assert!(!infra.is_data_error());
    }

    #[test]
    fn test_partial_merge_names_scope_and_id() {
        let err = ImportError::PartialMerge {
            scope: "companies",
            merged: 3,
            failed_id: "1:1001".to_string(),
            source: rusqlite::Error::InvalidQuery,
        };

        let msg = err.to_string();
        assert!(msg.contains("companies"));
        assert!(msg.contains("1:1001"));
        assert!(msg.contains("3"));
    }
}
