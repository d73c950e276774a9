use crate::prelude::*;

use std::path::PathBuf;

/// Every way reading a GRDECL deck (or an out-of-band property file) can fail.
///
/// All of these abort the load in progress. Unrecognized keywords are not errors, they are
/// collected on the [`Deck`](crate::Deck) instead.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("can't open the file {}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("input ended before the `/` terminating the {keyword} section")]
    UnexpectedEndOfInput { keyword: String },
    #[error("attempting to change already defined grid size")]
    DuplicateDimensions,
    #[error("{keyword} grids are not supported, only corner-point (SPECGRID) grids can be read")]
    UnsupportedGridType { keyword: String },
    #[error("GRDECL keyword {keyword} found before dimension specification")]
    DimensionsNotYetDefined { keyword: String },
    #[error("{0}")]
    SectionSizeMismatch(SizeMismatch),
    #[error("{0}")]
    PropertySizeMismatch(SizeMismatch),
    #[error("expected three positive integers NX NY NZ after SPECGRID, got `{line}`")]
    InvalidDimensions { line: String },
    #[error("could not read `{token}` as a value of the {keyword} section")]
    InvalidValue { keyword: String, token: String },
    #[error("repeat count in `{token}` is not a positive integer")]
    InvalidRepeatCount { token: String },
    #[error("expected a single-quoted file name after INCLUDE, got `{line}`")]
    MalformedInclude { line: String },
    #[error("An io error occured: `{0}`")]
    Io(#[from] std::io::Error),
}

/// A decoded section whose length does not match what its keyword requires.
#[derive(From, Display, Debug, Constructor, Clone, PartialEq, Eq)]
#[display(fmt = "{keyword} data size must be {formula} ({expected} values), found {actual}")]
pub struct SizeMismatch {
    pub keyword: String,
    pub formula: &'static str,
    pub expected: usize,
    pub actual: usize,
}

impl ParseError {
    /// the keyword (or property name) a size mismatch was reported for, if this is one
    pub fn mismatched_keyword(&self) -> Option<&str> {
        match self {
            Self::SectionSizeMismatch(m) | Self::PropertySizeMismatch(m) => Some(&m.keyword),
            _ => None,
        }
    }
}
