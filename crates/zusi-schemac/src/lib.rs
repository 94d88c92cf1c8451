//! Schema-driven parser generator for the Zusi 3 XML dialect.
//!
//! Pipeline: [`loader`] reads one or more root XSDs into a [`model::SchemaModel`],
//! [`layout`] decides how every child edge should be embedded, [`topo`] orders the
//! resulting types for emission, and [`codegen`] renders the four generated
//! artefacts. [`whitelist`] optionally narrows the schema before codegen runs.

pub mod codegen;
pub mod error;
pub mod layout;
pub mod loader;
pub mod model;
pub mod topo;
pub mod utils;
pub mod whitelist;

use std::path::Path;

use error::CompilerErrorReport;
use model::SchemaModel;

pub use codegen::{CodegenOptions, GeneratedArtifacts};
pub use whitelist::Whitelist;

/// Runs the full pipeline: load, plan layout, resolve the whitelist, generate.
///
/// `roots` is one or more root XSD files (later roots' types are folded into the
/// same [`SchemaModel`] via their own `xs:include` chains); `raw_whitelist` is the
/// set of unparsed `--whitelist` CLI values.
pub fn compile(
    roots: &[impl AsRef<Path>],
    raw_whitelist: &[String],
    options: &CodegenOptions,
) -> Result<(SchemaModel, GeneratedArtifacts), CompilerErrorReport> {
    let mut schema = loader::load_schema(roots[0].as_ref())?;
    for extra in &roots[1..] {
        let more = loader::load_schema(extra.as_ref())?;
        merge_schema(&mut schema, more);
    }

    loader::validate_schema(&mut schema);
    layout::plan_layout(&mut schema);

    let parsed_specs: Vec<Vec<String>> = raw_whitelist
        .iter()
        .map(|s| Whitelist::parse_spec(s))
        .collect();
    let whitelist = Whitelist::resolve(&parsed_specs, &schema);

    let artifacts = codegen::generate(&schema, &whitelist, options)?;
    Ok((schema, artifacts))
}

fn merge_schema(into: &mut SchemaModel, other: SchemaModel) {
    for ty in other.types {
        if into.type_by_name(&ty.name).is_none() {
            into.types.push(ty);
        }
    }
}
