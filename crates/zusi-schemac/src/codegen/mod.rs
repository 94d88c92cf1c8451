//! Code generator. Produces the four fixed artefacts:
//! forward-declarations, record definitions, parser forward-declarations, and
//! parser definitions. Shared decoder *bodies* live in `zusi_parser::runtime`
//! (a hand-written crate, not generated); this module only emits call sites
//! into it, plus the per-type dispatch chains around those calls.

pub mod parsers;
pub mod records;

use crate::error::CompilerErrorReport;
use crate::model::{ElementType, SchemaModel};
use crate::topo::topological_order;
use crate::whitelist::Whitelist;
use proc_macro2::TokenStream;
use quote::quote;
use rayon::prelude::*;

pub struct GeneratedArtifacts {
    pub types_fwd: String,
    pub types: String,
    pub parser_fwd: String,
    pub parser: String,
}

pub struct CodegenOptions {
    pub use_glm: bool,
    pub ignore_unknown: bool,
}

/// A type is "concrete" (gets a generated `parse_element_*`) iff it is the root
/// or it appears as a retained child target somewhere.
pub fn concrete_type_closure(schema: &SchemaModel, whitelist: &Whitelist) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut stack = vec![schema.root.clone()];

    while let Some(name) = stack.pop() {
        if !seen.insert(name.clone()) {
            continue;
        }
        let Some(ty) = schema.type_by_name(&name) else {
            continue;
        };
        for edge in &schema.all_children(ty) {
            if whitelist.retains(&name, &edge.name) {
                stack.push(edge.target.clone());
            }
        }
    }

    schema
        .types
        .iter()
        .map(|t| t.name.clone())
        .filter(|n| seen.contains(n))
        .collect()
}

pub fn generate(
    schema: &SchemaModel,
    whitelist: &Whitelist,
    options: &CodegenOptions,
) -> Result<GeneratedArtifacts, CompilerErrorReport> {
    let order = topological_order(schema);
    let concrete = concrete_type_closure(schema, whitelist);
    let concrete_set: std::collections::HashSet<&str> =
        concrete.iter().map(|s| s.as_str()).collect();

    let ordered_types: Vec<&ElementType> = order
        .iter()
        .filter_map(|name| schema.type_by_name(name))
        .filter(|t| concrete_set.contains(t.name.as_str()))
        .collect();

    let (fwd_decls, defs): (Vec<TokenStream>, Vec<TokenStream>) = ordered_types
        .par_iter()
        .map(|ty| {
            (
                records::generate_forward_declaration(ty, options.use_glm),
                records::generate_definition(schema, ty, whitelist, options.use_glm),
            )
        })
        .collect::<Vec<_>>()
        .into_iter()
        .unzip();

    let (parser_decls, parser_defs): (Vec<TokenStream>, Vec<TokenStream>) = ordered_types
        .par_iter()
        .map(|ty| {
            (
                parsers::generate_declaration(ty),
                parsers::generate_definition(schema, ty, whitelist, options),
            )
        })
        .collect::<Vec<_>>()
        .into_iter()
        .unzip();

    let types_fwd = quote! { #( #fwd_decls )* };
    let types = quote! { #( #defs )* };
    let parser_fwd = quote! { #( #parser_decls )* };
    let parser = quote! {
        use zusi_parser::runtime::*;
        use crate::types::*;

        #( #parser_defs )*
    };

    Ok(GeneratedArtifacts {
        types_fwd: pretty(types_fwd),
        types: pretty(types),
        parser_fwd: pretty(parser_fwd),
        parser: pretty(parser),
    })
}

fn pretty(tokens: TokenStream) -> String {
    match syn::parse2::<syn::File>(tokens.clone()) {
        Ok(file) => prettyplease::unparse(&file),
        Err(_) => tokens.to_string(),
    }
}
