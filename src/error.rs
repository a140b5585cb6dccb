//! Errors returned when constructing filters through the factory.

/// Errors that can occur while selecting or configuring a filter.
///
/// Capacity pressure is not an error: a filter that cannot admit a key reports it through the
/// `bool` returned by [`Filter::insert`](crate::Filter::insert).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// The requested filter variant does not exist.
    #[error("unsupported filter variant: {0:?}")]
    UnsupportedVariant(String),

    /// A construction parameter is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for filter construction.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn test_display() {
        let err = Error::UnsupportedVariant("ribbon".to_string());
        assert_eq!(err.to_string(), "unsupported filter variant: \"ribbon\"");

        let err = Error::InvalidArgument("item_count must be positive".to_string());
        assert_eq!(err.to_string(), "invalid argument: item_count must be positive");
    }
}
