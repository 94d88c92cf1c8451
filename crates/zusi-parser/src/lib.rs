//! Generated, allocation-conscious parser for Zusi 3 data files.
//!
//! The four files `build.rs` writes into `OUT_DIR` are spliced in here:
//! forward declarations first (so every record type name exists before any
//! other record references it), then the full definitions, then the matching
//! pair for the per-type `parse_element_*` routines. Everything those
//! routines call into lives in [`runtime`], which is hand-written and never
//! regenerated.

pub mod error;
pub mod mesh;
pub mod paths;
pub mod runtime;

pub mod types {
    include!(concat!(env!("OUT_DIR"), "/types_fwd.rs"));
    include!(concat!(env!("OUT_DIR"), "/types.rs"));
}

pub mod parser {
    include!(concat!(env!("OUT_DIR"), "/parser_fwd.rs"));
    include!(concat!(env!("OUT_DIR"), "/parser.rs"));
}

pub use types::Zusi;

/// Parses a complete Zusi XML document, returning the root `Zusi` record.
///
/// This is the one entry point most callers need; it skips the BOM, prolog,
/// comments and doctype, then hands off to the generated root parser.
pub fn parse(input: &[u8]) -> Result<Zusi<'_>, error::ParseErrorReport> {
    runtime::parse_document(input, parser::parse_element_zusi)
}
