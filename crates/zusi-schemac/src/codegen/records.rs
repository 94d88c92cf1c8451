//! Record declarations and definitions.

use crate::model::{AttributeKind, ElementType, LayoutDecision, SchemaModel};
use crate::utils::{escape_snake_case, escape_upper_camel_case};
use crate::whitelist::Whitelist;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::Ident;

fn type_ident(name: &str) -> Ident {
    syn::parse_str(&escape_upper_camel_case(name)).unwrap()
}

fn field_ident(name: &str) -> Ident {
    syn::parse_str(&escape_snake_case(name)).unwrap()
}

/// Rust item definitions need no forward declaration — a struct may
/// reference another defined later in the same module. `types_fwd.rs` is
/// kept as a distinct artefact for parity with the four-file CLI contract,
/// but it is intentionally empty: emitting a same-named stub struct here
/// would collide with the real definition `generate_definition` writes to
/// `types.rs`.
pub fn generate_forward_declaration(_ty: &ElementType, _use_glm: bool) -> TokenStream {
    TokenStream::new()
}

fn attribute_rust_type(kind: AttributeKind) -> TokenStream {
    match kind {
        AttributeKind::Int32 => quote! { i32 },
        AttributeKind::Int64 => quote! { i64 },
        AttributeKind::Boolean => quote! { bool },
        AttributeKind::String => quote! { zusi_parser::runtime::Str<'input> },
        AttributeKind::Float => quote! { f32 },
        AttributeKind::DateTime => quote! { zusi_parser::runtime::Datum },
        AttributeKind::HexInt32 => quote! { u32 },
        AttributeKind::FaceIndexes => quote! { zusi_parser::runtime::FaceIndexes },
        AttributeKind::ArgbColor => quote! { zusi_parser::runtime::ArgbColor },
    }
}

fn child_rust_type(schema: &SchemaModel, target: &str, layout: LayoutDecision) -> TokenStream {
    let target_ident = type_ident(target);

    // Indexed collections (StrElement/ReferenzElement multiple-Heap children)
    // store a placeholder-growable Vec<Option<Box<T>>> keyed by their index
    // attribute, rather than an append-only Vec<Box<T>>.
    let is_indexed = ElementType::indexed_collection_field(target).is_some();

    match layout {
        LayoutDecision::Heap => {
            if is_indexed {
                quote! { ::std::vec::Vec<::std::option::Option<::std::boxed::Box<#target_ident<'input>>>> }
            } else {
                quote! { ::std::vec::Vec<::std::boxed::Box<#target_ident<'input>>> }
            }
        }
        LayoutDecision::Optional => quote! { ::std::option::Option<#target_ident<'input>> },
        LayoutDecision::Inline => quote! { #target_ident<'input> },
        LayoutDecision::SmallVector(n) => {
            let n = n as usize;
            quote! { zusi_parser::runtime::SmallVec2<#target_ident<'input>, #n> }
        }
    }
}

/// Single-child (non-`multiple`) Heap children are `Option<Box<T>>`, since the
/// child may legitimately be absent; `multiple` Heap children use the Vec forms
/// in `child_rust_type`.
fn child_rust_type_for_edge(
    schema: &SchemaModel,
    target: &str,
    layout: LayoutDecision,
    multiple: bool,
) -> TokenStream {
    if layout == LayoutDecision::Heap && !multiple {
        let target_ident = type_ident(target);
        quote! { ::std::option::Option<::std::boxed::Box<#target_ident<'input>>> }
    } else {
        child_rust_type(schema, target, layout)
    }
}

/// Emits the full struct definition for `ty`, with member inclusion (base-type
/// attributes/children flattened in) replacing runtime inheritance, and the
/// whitelist/deprecated filters applied.
pub fn generate_definition(
    schema: &SchemaModel,
    ty: &ElementType,
    whitelist: &Whitelist,
    use_glm: bool,
) -> TokenStream {
    if use_glm {
        if let Some(alias) = glm_alias(&ty.name) {
            return alias;
        }
    }

    let ident = type_ident(&ty.name);

    let retained_attrs: Vec<_> = schema
        .all_attributes(ty)
        .into_iter()
        .filter(|a| retained(&ty.name, &a.name, a.deprecated(), a.is_legacy_color(), whitelist))
        .collect();

    let retained_children: Vec<_> = schema
        .all_children(ty)
        .into_iter()
        .filter(|c| retained(&ty.name, &c.name, c.deprecated(), false, whitelist))
        .collect();

    // Every child field's type names the child's own `<'input>` generic, so
    // any retained child uses the lifetime. Otherwise it's only used by a
    // `String`-kind attribute (the borrowed-or-owned `Str<'input>`). A type
    // with neither — every leaf numeric-only record, e.g. `Vec3`, `Face`,
    // `NachfolgerSelbesModul` — needs a marker field or `E0392` fires on the
    // unused `'input` parameter.
    let uses_lifetime = !retained_children.is_empty()
        || retained_attrs.iter().any(|a| matches!(a.kind, AttributeKind::String));

    let attrs: Vec<TokenStream> = retained_attrs
        .iter()
        .map(|a| {
            let field = field_ident(a.storage_name());
            let rust_type = attribute_rust_type(a.kind);
            quote! { pub #field: #rust_type }
        })
        .collect();

    let children: Vec<TokenStream> = retained_children
        .iter()
        .map(|c| {
            let field = field_ident(&c.name);
            let layout = c.layout.unwrap_or(LayoutDecision::Heap);
            let rust_type = child_rust_type_for_edge(schema, &c.target, layout, c.multiple);
            quote! { pub #field: #rust_type }
        })
        .collect();

    let marker_field = if uses_lifetime {
        quote! {}
    } else {
        quote! { #[doc(hidden)] pub _marker: ::std::marker::PhantomData<&'input ()>, }
    };

    // `Vertex` swaps field order (children first) to match the companion
    // packed binary mesh layout; every other type is attributes-then-children.
    let fields = if ElementType::children_before_attributes(&ty.name) {
        quote! { #marker_field #( #children, )* #( #attrs, )* }
    } else {
        quote! { #marker_field #( #attrs, )* #( #children, )* }
    };

    quote! {
        #[derive(Debug, Default, Clone)]
        pub struct #ident<'input> {
            #fields
        }
    }
}

fn retained(
    parent: &str,
    name: &str,
    deprecated: bool,
    always_keep: bool,
    whitelist: &Whitelist,
) -> bool {
    if always_keep {
        return true;
    }
    if !whitelist.is_empty() {
        // Open Question #2: whitelist membership wins over the deprecated-drop
        // rule when both apply.
        return whitelist.retains(parent, name);
    }
    !deprecated
}

/// `--use-glm` replaces the three vector/quaternion record definitions with
/// aliases to an external vector library's own types;
/// member names become `x/y/z/w` to match that library's convention.
fn glm_alias(name: &str) -> Option<TokenStream> {
    let glm_ty = match name {
        "Vec2" => format_ident!("Vec2"),
        "Vec3" => format_ident!("Vec3"),
        "Quaternion" => format_ident!("Quat"),
        _ => return None,
    };
    Some(quote! {
        pub use ::glam::#glm_ty as #glm_ty;
    })
}
