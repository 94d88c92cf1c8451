//! Parse-time error type. Mirrors the shape of `zusi-schemac`'s
//! `CompilerError`/`CompilerErrorReport`: a `thiserror` enum wrapped in a
//! `rootcause::Report` so call sites can `.attach()` context without
//! inventing a second error layer.
//!
//! Every parse-time variant carries `offset`, the byte position in the input
//! buffer at which the failure was detected, so callers can report a location
//! without re-scanning the document.

use rootcause::Report;
use thiserror::Error;

pub type ParseErrorReport = Report<ParseError>;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("at byte {offset}: expected '='")]
    ExpectedEquals { offset: usize },

    #[error("at byte {offset}: expected ' or \"")]
    ExpectedQuote { offset: usize },

    #[error("at byte {offset}: expected > or />")]
    ExpectedTagEnd { offset: usize },

    #[error("at byte {offset}: expected an element name")]
    ExpectedElementName { offset: usize },

    #[error("at byte {offset}: expected ';'")]
    ExpectedSemicolon { offset: usize },

    #[error("at byte {offset}: value too long")]
    ValueTooLong { offset: usize },

    #[error("at byte {offset}: invalid numeric character reference")]
    InvalidCharacterReference { offset: usize },

    #[error("at byte {offset}: unexpected end of data")]
    UnexpectedEndOfData { offset: usize },

    #[error("I/O error: {_0}")]
    IoError(#[from] std::io::Error),

    #[error("`{_0}` is not valid UTF-8 at the point it was required to be")]
    Utf8Error(String),
}

pub type MeshErrorReport = Report<MeshError>;

/// Errors from loading a sidecar binary mesh file (`mesh.rs`).
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("I/O error: {_0}")]
    IoError(#[from] std::io::Error),

    #[error("mesh file is {len} bytes, not a whole number of {record_size}-byte records")]
    MisalignedLength { len: usize, record_size: usize },
}
