//! Lookup error taxonomy
//!
//! Loaders work in `anyhow`; at the lookup boundary failures become a
//! [`LocateError`] so callers can tell an unreadable signature from a number
//! with no shelf, and both from a broken shelving map. The original signature
//! is kept verbatim in every variant that has one.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocateError {
    /// The signature holds no numeric classification token
    #[error("could not extract a number from signature '{input}'")]
    ParseFailure { input: String },

    /// A number was extracted but no loaded range contains it
    #[error("no shelf location found for '{input}' (value {value})")]
    NoMatch { input: String, value: f64 },

    /// A shelving map could not be read; a later reload may succeed
    ///
    /// `detail` is the flattened load error chain.
    #[error("failed to load {source_name}: {detail}")]
    SourceLoad {
        source_name: String,
        detail: String,
        input: Option<String>,
    },
}

impl LocateError {
    pub fn source_load(source_name: impl Into<String>, err: anyhow::Error) -> Self {
        LocateError::SourceLoad {
            source_name: source_name.into(),
            detail: format!("{:#}", err),
            input: None,
        }
    }

    /// Attach the signature whose lookup hit a load failure
    pub fn with_input(mut self, signature: &str) -> Self {
        if let LocateError::SourceLoad { input, .. } = &mut self {
            *input = Some(signature.to_string());
        }
        self
    }

    /// Stable machine-readable tag
    pub fn kind(&self) -> &'static str {
        match self {
            LocateError::ParseFailure { .. } => "parse_failure",
            LocateError::NoMatch { .. } => "no_match",
            LocateError::SourceLoad { .. } => "source_load",
        }
    }

    /// Signature the lookup was asked for, if the failure concerns one
    pub fn input(&self) -> Option<&str> {
        match self {
            LocateError::ParseFailure { input } | LocateError::NoMatch { input, .. } => Some(input),
            LocateError::SourceLoad { input, .. } => input.as_deref(),
        }
    }
}
