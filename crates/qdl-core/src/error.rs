use crate::types::SourceLocation;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct QdlError {
    pub code: String,
    pub message: String,
    /// Char offset into the raw source, when the error points at one.
    pub index: Option<usize>,
    pub unexpected: Option<char>,
    pub location: Option<SourceLocation>,
}

impl QdlError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            index: None,
            unexpected: None,
            location: None,
        }
    }

    /// Error anchored at a character of the source text.
    pub fn at(
        code: impl Into<String>,
        message: impl Into<String>,
        index: usize,
        unexpected: char,
        location: SourceLocation,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            index: Some(index),
            unexpected: Some(unexpected),
            location: Some(location),
        }
    }
}
