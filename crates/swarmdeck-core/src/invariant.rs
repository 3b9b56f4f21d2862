//! Invariant violation reporting.
//!
//! An invariant violation is a programming error, not a recoverable runtime
//! condition: an unrecognized domain state reaching a row update, a row whose
//! column count drifted, an index the model itself handed out going stale
//! inside a single call. In debug builds [`violation`] panics so the defect is
//! caught where it happens. In release builds it is logged at `error` and the
//! caller continues with a degraded value.

use crate::logging::targets;

/// A reported invariant violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invariant violated in {context}: {message}")]
pub struct InvariantViolation {
    /// Where the violation was detected (type or operation name).
    pub context: &'static str,
    /// What was violated.
    pub message: String,
}

/// Report an invariant violation.
///
/// Panics in debug builds. In release builds logs an `error` event and
/// returns the violation so the caller may propagate or drop it.
#[track_caller]
pub fn violation(context: &'static str, message: impl Into<String>) -> InvariantViolation {
    let violation = InvariantViolation {
        context,
        message: message.into(),
    };
    if cfg!(debug_assertions) {
        panic!("{violation}");
    }
    tracing::error!(target: targets::INVARIANT, context, message = %violation.message, "invariant violated");
    violation
}

/// Check a condition, reporting a violation when it does not hold.
///
/// Returns `true` when the condition held.
#[track_caller]
pub fn check(condition: bool, context: &'static str, message: impl FnOnce() -> String) -> bool {
    if !condition {
        let _ = violation(context, message());
    }
    condition
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_passes_silently() {
        assert!(check(true, "test", || unreachable!()));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invariant violated in RowCollection: column drift")]
    fn test_violation_panics_in_debug() {
        let _ = violation("RowCollection", "column drift");
    }

    #[test]
    fn test_violation_display() {
        let v = InvariantViolation {
            context: "DownloadRow",
            message: "unknown state".into(),
        };
        assert_eq!(v.to_string(), "invariant violated in DownloadRow: unknown state");
    }
}
