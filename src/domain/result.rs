//! Result type alias for batch export operations

use super::errors::BatchExportError;

/// Result type alias using [`BatchExportError`] as the error type
///
/// # Examples
///
/// ```
/// use batch_exports::domain::result::Result;
/// use batch_exports::domain::errors::BatchExportError;
///
/// fn resolve() -> Result<String> {
///     Ok("s3-export".to_string())
/// }
///
/// fn reject() -> Result<()> {
///     Err(BatchExportError::Validation("start_at must precede end_at".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, BatchExportError>;
