//! Error types for ledger operations.

use thiserror::Error;

/// Errors raised by the ledger, its store and the transaction builder.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// User supplied a value that cannot be recorded. Nothing was mutated.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// The persisted snapshot could not be read or decoded.
    #[error("stored ledger is unreadable: {0}")]
    Persistence(String),

    /// A transaction carries a date that cannot be interpreted.
    #[error("unparseable transaction date '{0}'")]
    Parse(String),

    /// A transaction with zero weight reached a per-gram computation.
    #[error("transaction has zero weight")]
    Division,

    #[error("historical price lookup failed: {0}")]
    PriceLookup(#[source] anyhow::Error),

    #[error("failed to persist ledger: {0}")]
    Storage(#[source] anyhow::Error),
}

impl LedgerError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        LedgerError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// Checks that `value` is a finite number strictly greater than zero.
pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<f64, LedgerError> {
    if !value.is_finite() {
        return Err(LedgerError::validation(field, "must be a finite number"));
    }
    if value <= 0.0 {
        return Err(LedgerError::validation(
            field,
            format!("must be greater than zero, got {value}"),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_positive_accepts_positive() {
        assert_eq!(ensure_positive("weight", 0.5).unwrap(), 0.5);
    }

    #[test]
    fn test_ensure_positive_rejects_zero_negative_and_nan() {
        assert!(ensure_positive("weight", 0.0).is_err());
        assert!(ensure_positive("weight", -3.0).is_err());
        assert!(ensure_positive("weight", f64::NAN).is_err());
        assert!(ensure_positive("weight", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validation_message_names_field() {
        let err = ensure_positive("amount", -1.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid amount: must be greater than zero, got -1"
        );
    }
}
