//! Result type alias for tableshuttle

use super::errors::ShuttleError;

/// Result type alias for tableshuttle operations
///
/// # Examples
///
/// ```
/// use tableshuttle::domain::result::Result;
/// use tableshuttle::domain::errors::ShuttleError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ShuttleError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ShuttleError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ShuttleError;

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(ShuttleError::Validation("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
