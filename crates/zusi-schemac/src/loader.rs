//! XSD loader. Walks a root XSD with `roxmltree`, follows
//! `<xs:include>` transitively and uniquely by canonicalised path, and extracts
//! complex types, attributes, and child edges into the plain `model::SchemaModel`.

use crate::error::{CompilerError, CompilerErrorReport};
use crate::model::{Attribute, AttributeKind, ChildEdge, ElementType, SchemaModel};
use rootcause::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::warn;

const XS_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// Loads `root_xsd` and every file it transitively includes, returning a
/// `SchemaModel` whose `root` is the outermost `<xs:element>`'s type.
pub fn load_schema(root_xsd: &Path) -> Result<SchemaModel, CompilerErrorReport> {
    let mut visited = HashSet::new();
    let mut types = Vec::new();
    let mut root_element_type = None;

    load_file(root_xsd, &mut visited, &mut types, &mut root_element_type)?;

    let root = root_element_type.ok_or_else(|| CompilerError::LookupError(
        "a top-level <xs:element> naming the document root".to_string(),
    ))?;

    Ok(SchemaModel { root, types })
}

/// Drops duplicate type definitions (keeping the first, as the spec's
/// "second is discarded" rule requires), then clears dangling `base`
/// references and drops child edges whose target type was never defined —
/// both logged and non-fatal, "aborting emission" only for the affected
/// member rather than the whole compile.
pub fn validate_schema(schema: &mut SchemaModel) {
    let mut seen = HashSet::new();
    let mut deduped = Vec::with_capacity(schema.types.len());
    for ty in schema.types.drain(..) {
        if !seen.insert(ty.name.clone()) {
            warn!("duplicate type definition {}, discarding the second", ty.name);
            continue;
        }
        deduped.push(ty);
    }
    schema.types = deduped;

    let names: HashSet<String> = schema.types.iter().map(|t| t.name.clone()).collect();

    for ty in &mut schema.types {
        if let Some(base) = ty.base.clone() {
            if !names.contains(&base) {
                warn!("{}", CompilerError::DanglingBase(ty.name.clone(), base));
                ty.base = None;
            }
        }

        ty.children.retain(|edge| {
            if names.contains(&edge.target) {
                return true;
            }
            warn!(
                "{}",
                CompilerError::DanglingChild {
                    parent: ty.name.clone(),
                    child: edge.name.clone(),
                    target: edge.target.clone(),
                }
            );
            false
        });
    }
}

fn load_file(
    path: &Path,
    visited: &mut HashSet<PathBuf>,
    types: &mut Vec<ElementType>,
    root_element_type: &mut Option<String>,
) -> Result<(), CompilerErrorReport> {
    let canonical = path
        .canonicalize()
        .map_err(CompilerError::from)
        .attach(format!("canonicalizing {}", path.display()))?;

    if !visited.insert(canonical.clone()) {
        return Ok(());
    }

    let text = std::fs::read_to_string(path).map_err(CompilerError::from)?;
    let doc = roxmltree::Document::parse(&text).map_err(|source| CompilerError::XmlError {
        path: path.to_path_buf(),
        source,
    })?;

    let schema_root = doc.root_element();
    let base_dir = path.parent().unwrap_or(Path::new("."));

    for include in schema_root
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "include")
    {
        let Some(location) = include.attribute("schemaLocation") else {
            continue;
        };
        let included_path = base_dir.join(location);
        if !included_path.exists() {
            warn!("unresolved <xs:include schemaLocation=\"{location}\"> from {}", path.display());
            return Err(CompilerError::UnresolvedInclude {
                from: path.to_path_buf(),
                schema_location: location.to_string(),
            }
            .into());
        }
        load_file(&included_path, visited, types, root_element_type)?;
    }

    for child in schema_root.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "element" if child.tag_name().namespace() == Some(XS_NS) => {
                // A top-level <xs:element name="Zusi" type="..."/> or one with an
                // inline anonymous complexType names the document root.
                if let Some(type_name) = child.attribute("type") {
                    if root_element_type.is_none() {
                        *root_element_type = Some(local_name(type_name).to_string());
                    }
                } else if let Some(complex_type) = child
                    .children()
                    .find(|n| n.is_element() && n.tag_name().name() == "complexType")
                {
                    let name = child.attribute("name").unwrap_or_default().to_string();
                    if root_element_type.is_none() {
                        *root_element_type = Some(name.clone());
                    }
                    types.push(parse_complex_type(&complex_type, &name, path));
                }
            }
            "complexType" => {
                let name = child.attribute("name").unwrap_or_default().to_string();
                types.push(parse_complex_type(&child, &name, path));
            }
            _ => {}
        }
    }

    Ok(())
}

/// Parses a single `<xs:complexType>` (named or anonymous — `name` is supplied by
/// the caller in the anonymous case, taken from the enclosing `<xs:element>`).
fn parse_complex_type(node: &roxmltree::Node, name: &str, path: &Path) -> ElementType {
    let documentation = find_documentation(node);
    let base = find_extension_base(node);

    let mut attributes = Vec::new();
    for attr_node in descendant_elements(node, "attribute") {
        let Some(attr_name) = attr_node.attribute("name") else {
            continue;
        };
        let Some(xsd_type) = attr_node.attribute("type") else {
            continue;
        };
        match AttributeKind::from_xsd_type(xsd_type) {
            Some(kind) => attributes.push(Attribute {
                name: attr_name.to_string(),
                kind,
                documentation: find_documentation(&attr_node),
            }),
            None => warn!(
                "unknown attribute type \"{xsd_type}\" on {attr_name} in {}, dropping",
                path.display()
            ),
        }
    }

    // Flatten every descendant <xs:element>, regardless of the enclosing
    // compositor (sequence/choice/all).
    let mut children = Vec::new();
    for el_node in descendant_elements(node, "element") {
        let multiple = is_multiple(&el_node);
        let (member_name, target) = if let Some(ref_attr) = el_node.attribute("ref") {
            (local_name(ref_attr).to_string(), local_name(ref_attr).to_string())
        } else {
            let n = el_node.attribute("name").unwrap_or_default().to_string();
            let t = el_node
                .attribute("type")
                .map(|t| local_name(t).to_string())
                .unwrap_or_else(|| n.clone());
            (n, t)
        };

        children.push(ChildEdge {
            name: member_name,
            target,
            multiple,
            documentation: find_documentation(&el_node),
            layout: None,
        });
    }

    let line = node.range().start as u32;

    ElementType {
        name: name.to_string(),
        base,
        documentation,
        attributes,
        children,
        size: None,
        source_span: Some((path.to_path_buf(), line)),
    }
}

fn find_extension_base(node: &roxmltree::Node) -> Option<String> {
    descendant_elements(node, "extension")
        .next()
        .and_then(|ext| ext.attribute("base"))
        .map(|b| local_name(b).to_string())
}

fn find_documentation(node: &roxmltree::Node) -> String {
    descendant_elements(node, "documentation")
        .next()
        .map(|n| n.text().unwrap_or_default().trim().to_string())
        .unwrap_or_default()
}

fn is_multiple(el_node: &roxmltree::Node) -> bool {
    match el_node.attribute("maxOccurs") {
        Some("unbounded") => true,
        Some(n) => n.parse::<u64>().map(|v| v > 1).unwrap_or(false),
        None => false,
    }
}

fn local_name(qname: &str) -> &str {
    qname.rsplit(':').next().unwrap_or(qname)
}

/// All descendant elements (of any depth, any compositor) with the given local
/// name in the XML Schema namespace.
fn descendant_elements<'a, 'input>(
    node: &'a roxmltree::Node<'a, 'input>,
    local: &'static str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> + 'a {
    node.descendants()
        .filter(move |n| n.is_element() && n.tag_name().name() == local)
}
