//! Error-related types for document parsing.

use std::error::Error;
use std::string::FromUtf8Error;

/// Alias for `Result<T, ParseError>`.
pub type ParseResult<T> = Result<T, ParseError>;

/// Possible errors while materializing an XML element tree.
///
/// Recoverable per-entry conditions (an unresolvable href, an unknown
/// vocabulary prefix, a missing required attribute) never surface here;
/// the affected entry is dropped and parsing continues. Missing
/// mandatory document structure is signaled as [`None`] by the
/// individual parsers, not as an error.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    /// Document content unexpectedly causes an internal parser error,
    /// such as improper XML.
    #[error(transparent)]
    Unparsable(#[from] Box<dyn Error + Send + Sync + 'static>),

    /// Invalid UTF-8 data.
    #[error(transparent)]
    InvalidUtf8(#[from] FromUtf8Error),

    /// The document contains no root element.
    #[error("the document contains no root element")]
    NoRootElement,
}
