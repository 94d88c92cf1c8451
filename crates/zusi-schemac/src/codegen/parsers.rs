//! Per-type parser routine generation.
//!
//! Each concrete type gets one `parse_element_*` function. Attribute dispatch is
//! a chain of `size == k && bytes == …` guards ordered derived-first-then-base;
//! child dispatch is the same shape but ordered base-first-then-derived (the
//! asymmetry is intentional, see DESIGN.md). Shared decoders are calls into
//! `zusi_parser::runtime`, not inlined bodies.

use crate::model::{Attribute, AttributeKind, ChildEdge, ElementType, LayoutDecision, SchemaModel};
use crate::utils::{escape_snake_case, escape_upper_camel_case};
use crate::whitelist::Whitelist;
use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};
use syn::Ident;

use super::CodegenOptions;

fn byte_string_lit(bytes: &[u8]) -> Literal {
    Literal::byte_string(bytes)
}

fn type_ident(name: &str) -> Ident {
    syn::parse_str(&escape_upper_camel_case(name)).unwrap()
}

fn field_ident(name: &str) -> Ident {
    syn::parse_str(&escape_snake_case(name)).unwrap()
}

fn parse_fn_ident(name: &str) -> Ident {
    format_ident!("parse_element_{}", escape_snake_case(name))
}

/// Forward declaration: a bare function-pointer type alias documenting the
/// signature, with no body — the closest Rust equivalent of a C-style forward
/// declaration, since Rust items need no textual ordering to call each other.
pub fn generate_declaration(ty: &ElementType) -> TokenStream {
    let alias_ident = format_ident!("{}Fn", escape_upper_camel_case(&ty.name));
    let type_ident = type_ident(&ty.name);
    quote! {
        #[allow(dead_code)]
        pub type #alias_ident<'input> =
            fn(&mut zusi_parser::runtime::Cursor<'input>) -> ::std::result::Result<#type_ident<'input>, zusi_parser::runtime::ParseErrorReport>;
    }
}

pub fn generate_definition(
    schema: &SchemaModel,
    ty: &ElementType,
    whitelist: &Whitelist,
    options: &CodegenOptions,
) -> TokenStream {
    if matches!(ty.name.as_str(), "Vec2" | "Vec3" | "Quaternion") {
        return generate_shape_parser(ty);
    }

    let fn_ident = parse_fn_ident(&ty.name);
    let type_ident = type_ident(&ty.name);

    let attrs: Vec<Attribute> = schema
        .all_attributes(ty)
        .into_iter()
        .filter(|a| retained(&ty.name, &a.name, a.deprecated(), a.is_legacy_color(), whitelist))
        .collect();

    let children: Vec<ChildEdge> = schema
        .all_children(ty)
        .into_iter()
        .filter(|c| retained(&ty.name, &c.name, c.deprecated(), false, whitelist))
        .collect();

    // Whitespace between the element name and the first attribute (or `>`)
    // must always be skipped here: `read_child_name` stops at the name itself
    // and leaves any trailing whitespace for the callee to consume.
    let leading_skip = quote! { cursor.skip_whitespace(); };

    let attr_arms: Vec<TokenStream> = attrs.iter().map(|a| attribute_match_arm(a)).collect();

    let child_arms: Vec<TokenStream> = children
        .iter()
        .map(|c| child_match_arm(&ty.name, c))
        .collect();

    let ignore_unknown = options.ignore_unknown;
    let ty_name_lit = ty.name.as_str();
    let unknown_attr_warn = if ignore_unknown {
        quote! {}
    } else {
        quote! { tracing::warn!("unknown attribute {} on <{}>", String::from_utf8_lossy(name), #ty_name_lit); }
    };
    let unknown_child_warn = if ignore_unknown {
        quote! {}
    } else {
        quote! { tracing::warn!("unknown child element {} in <{}>", String::from_utf8_lossy(name), #ty_name_lit); }
    };

    quote! {
        pub fn #fn_ident<'input>(
            cursor: &mut zusi_parser::runtime::Cursor<'input>,
        ) -> ::std::result::Result<#type_ident<'input>, zusi_parser::runtime::ParseErrorReport> {
            let mut record = #type_ident::default();

            #leading_skip
            while cursor.at_attribute_name() {
                let name = cursor.read_attribute_name()?;
                cursor.expect_byte(b'=')?;
                let quote_char = cursor.read_quote_char()?;

                match name {
                    #( #attr_arms )*
                    _unknown => {
                        #unknown_attr_warn
                        cursor.skip_attribute_value(quote_char);
                    }
                }

                cursor.expect_byte(quote_char)?;
                cursor.skip_whitespace();
            }

            match cursor.read_element_tail()? {
                zusi_parser::runtime::ElementTail::SelfClosing => {}
                zusi_parser::runtime::ElementTail::Open => {
                    loop {
                        cursor.skip_whitespace();
                        if cursor.at_close_tag() {
                            cursor.read_close_tag()?;
                            break;
                        }
                        if cursor.at_eof() {
                            return Err(zusi_parser::runtime::ParseError::UnexpectedEndOfData {
                                offset: cursor.offset(),
                            }
                            .into());
                        }
                        let name = cursor.read_child_name()?;
                        match name {
                            #( #child_arms )*
                            _unknown => {
                                #unknown_child_warn
                                cursor.skip_element_subtree()?;
                            }
                        }
                    }
                }
            }

            Ok(record)
        }
    }
}

fn retained(parent: &str, name: &str, deprecated: bool, always_keep: bool, whitelist: &Whitelist) -> bool {
    if always_keep {
        return true;
    }
    if !whitelist.is_empty() {
        return whitelist.retains(parent, name);
    }
    !deprecated
}

fn attribute_match_arm(attr: &Attribute) -> TokenStream {
    let name_bytes = attr.name.as_bytes();
    let len = name_bytes.len();
    let name_lit = byte_string_lit(name_bytes);
    let field = field_ident(attr.storage_name());

    let decode: TokenStream = if attr.is_legacy_color() {
        quote! {
            record.#field = zusi_parser::runtime::parse_legacy_color(cursor, quote_char)?;
        }
    } else {
        match attr.kind {
            AttributeKind::Int32 => quote! { record.#field = zusi_parser::runtime::parse_i32(cursor, quote_char)?; },
            AttributeKind::Int64 => quote! { record.#field = zusi_parser::runtime::parse_i64(cursor, quote_char)?; },
            AttributeKind::Boolean => quote! { record.#field = zusi_parser::runtime::parse_bool(cursor, quote_char)?; },
            AttributeKind::String => quote! { record.#field = zusi_parser::runtime::parse_string(cursor, quote_char)?; },
            AttributeKind::Float => quote! { record.#field = zusi_parser::runtime::parse_float(cursor, quote_char)?; },
            AttributeKind::DateTime => quote! { zusi_parser::runtime::parse_datetime(cursor, quote_char, &mut record.#field)?; },
            AttributeKind::HexInt32 => quote! { record.#field = zusi_parser::runtime::parse_hex_u32(cursor, quote_char)?; },
            AttributeKind::FaceIndexes => quote! { record.#field = zusi_parser::runtime::parse_face_indexes(cursor, quote_char)?; },
            AttributeKind::ArgbColor => quote! { record.#field = zusi_parser::runtime::parse_argb_color(cursor, quote_char)?; },
        }
    };

    quote! {
        _ if name.len() == #len && name == #name_lit => {
            #decode
        }
    }
}

fn child_match_arm(parent_name: &str, edge: &ChildEdge) -> TokenStream {
    let name_bytes = edge.name.as_bytes();
    let len = name_bytes.len();
    let name_lit = byte_string_lit(name_bytes);
    let target_fn = parse_fn_ident(&edge.target);
    let field = field_ident(&edge.name);
    let layout = edge.layout.unwrap_or(LayoutDecision::Heap);
    let target_name_lit = edge.target.as_str();
    let parent_name_lit = parent_name;

    // An indexed-collection target (`StrElement`/`ReferenzElement`) only gets
    // the placeholder-growable-Vec treatment for the `multiple` edge that
    // actually forms the collection (`children_StrElement`,
    // `children_ReferenzElemente`); a singular self-edge to the same type
    // (e.g. `StrElement.FolgeElement`) is an ordinary Heap child and must
    // fall through to the `Option<Box<T>>` arm below, since that's the field
    // type `records.rs` gives it.
    let indexed_field = edge.multiple.then(|| ElementType::indexed_collection_field(&edge.target)).flatten();

    let body = match (indexed_field, layout) {
        (Some(index_field), _) => {
            let index_ident = field_ident(index_field);
            quote! {
                let child = #target_fn(cursor)?;
                let index = child.#index_ident as usize;
                if record.#field.len() <= index {
                    record.#field.resize_with(index + 1, ::std::default::Default::default);
                }
                if record.#field[index].is_some() {
                    tracing::warn!(
                        "duplicate indexed child {} on {}: index {} already populated, keeping first",
                        #target_name_lit, #parent_name_lit, index
                    );
                } else {
                    record.#field[index] = Some(::std::boxed::Box::new(child));
                }
            }
        }
        (None, LayoutDecision::Heap) if edge.multiple => quote! {
            record.#field.push(::std::boxed::Box::new(#target_fn(cursor)?));
        },
        (None, LayoutDecision::Heap) => quote! {
            record.#field = Some(::std::boxed::Box::new(#target_fn(cursor)?));
        },
        (None, LayoutDecision::Optional) => quote! {
            record.#field = Some(#target_fn(cursor)?);
        },
        (None, LayoutDecision::Inline) => quote! {
            record.#field = #target_fn(cursor)?;
        },
        (None, LayoutDecision::SmallVector(_)) => quote! {
            record.#field.push(#target_fn(cursor)?);
        },
    };

    quote! {
        _ if name.len() == #len && name == #name_lit => {
            #body
        }
    }
}

/// `Vec2`, `Vec3`, and `Quaternion` are shape-polymorphic over attribute name:
/// instead of a per-name chain, a single indexed store dispatches on
/// `name[0] - 'X'` (or `- 'W'` for Quaternion's `W`), writing directly into a
/// small fixed-size float array.
fn generate_shape_parser(ty: &ElementType) -> TokenStream {
    let fn_ident = parse_fn_ident(&ty.name);
    let type_ident = type_ident(&ty.name);
    let field_names: &[&str] = match ty.name.as_str() {
        "Vec2" => &["x", "y"],
        "Vec3" => &["x", "y", "z"],
        "Quaternion" => &["w", "x", "y", "z"],
        _ => unreachable!(),
    };
    let fields: Vec<Ident> = field_names.iter().map(|f| format_ident!("{f}")).collect();
    let component_count = field_names.len();
    let field_indices: Vec<usize> = (0..field_names.len()).collect();
    // Vec2/Vec3 key their single-letter attributes off 'X'; only Quaternion's
    // leading component is 'W'.
    let base_letter = if ty.name == "Quaternion" { 'W' } else { 'X' };
    let base_lit = syn::LitByte::new(base_letter as u8, proc_macro2::Span::call_site());

    quote! {
        pub fn #fn_ident<'input>(
            cursor: &mut zusi_parser::runtime::Cursor<'input>,
        ) -> ::std::result::Result<#type_ident<'input>, zusi_parser::runtime::ParseErrorReport> {
            let mut components: [f32; #component_count] = ::std::default::Default::default();

            while cursor.at_attribute_name() {
                let name = cursor.read_attribute_name()?;
                cursor.expect_byte(b'=')?;
                let quote_char = cursor.read_quote_char()?;

                if name.len() == 1 {
                    if let Some(slot) = zusi_parser::runtime::shape_component_index(name[0], #base_lit, #component_count) {
                        components[slot] = zusi_parser::runtime::parse_float(cursor, quote_char)?;
                    } else {
                        cursor.skip_attribute_value(quote_char);
                    }
                } else {
                    cursor.skip_attribute_value(quote_char);
                }

                cursor.expect_byte(quote_char)?;
                cursor.skip_whitespace();
            }

            if let zusi_parser::runtime::ElementTail::Open = cursor.read_element_tail()? {
                cursor.skip_element_contents_no_children()?;
            }

            let mut record = #type_ident::default();
            #( record.#fields = components[#field_indices]; )*
            Ok(record)
        }
    }
}
