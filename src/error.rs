use thiserror::Error;

/// Error type for every fallible operation on chains, schemas and indexes.
///
/// Both kinds signal a broken caller contract; nothing in this crate retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainsError {
    /// Structurally malformed input, e.g. mismatched lengths or a probability outside `[0, 1]`.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A well-formed index that falls outside its domain.
    #[error("out of range: {0}")]
    OutOfRange(String),
}

/// Convenience type for `Result<T, ChainsError>`.
pub type Result<T> = std::result::Result<T, ChainsError>;

/// Fails with [`ChainsError::OutOfRange`] unless `idx < len`.
pub(crate) fn check_index(what: &str, idx: usize, len: usize) -> Result<()> {
    if idx >= len {
        return Err(ChainsError::OutOfRange(format!(
            "{what} index {idx} must be less than {len}"
        )));
    }
    Ok(())
}

/// Fails with [`ChainsError::InvalidArgument`] unless `prob` lies in `[0, 1]`.
pub(crate) fn check_probability(prob: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&prob) {
        return Err(ChainsError::InvalidArgument(format!(
            "probability {prob} must lie in [0, 1]"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_index() {
        assert!(check_index("chain", 3, 4).is_ok());
        assert!(matches!(
            check_index("chain", 4, 4),
            Err(ChainsError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_check_probability() {
        assert!(check_probability(0.0).is_ok());
        assert!(check_probability(1.0).is_ok());
        for bad in [-0.1, 1.2, f64::NAN] {
            assert!(matches!(
                check_probability(bad),
                Err(ChainsError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_display() {
        let err = ChainsError::OutOfRange("chain index 5 must be less than 4".into());
        assert_eq!(
            err.to_string(),
            "out of range: chain index 5 must be less than 4"
        );
    }
}
