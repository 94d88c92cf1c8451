//! Whitelist gate: an optional `parent-type-name →
//! {child-or-attribute-name}` filter that prunes generated record members and
//! parser dispatch arms down to a subset of the schema.

use crate::model::{ElementType, SchemaModel};
use std::collections::{HashMap, HashSet};
use tracing::warn;

#[derive(Debug, Default)]
pub struct Whitelist {
    retained: HashMap<String, HashSet<String>>,
}

impl Whitelist {
    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }

    /// Parses one `--whitelist` CLI occurrence. The raw form is
    /// `ParentName::Name` with `Name` itself possibly chained via further `::`
    /// segments (`ParentName::A::B` retains member `A` on `ParentName`, *and*
    /// member `B` on whatever type `A` targets). Chain resolution needs the
    /// loaded schema, so parsing here only records the raw segment path; call
    /// `resolve` once the schema is available.
    pub fn parse_spec(spec: &str) -> Vec<String> {
        spec.split("::").map(str::to_string).collect()
    }

    /// Resolves every raw whitelist spec against `schema`, following the
    /// `::`-chain of child-target types, and folds in the two always-retained
    /// structural members (`StrElement::Nr`, `ReferenzElement::ReferenzNr`) —
    /// but only when `raw_specs` is non-empty. An empty `raw_specs` must
    /// produce an empty `Whitelist` (`is_empty()` true), since that's how
    /// `retains` and the codegen call sites recognise "no gate requested".
    pub fn resolve(raw_specs: &[Vec<String>], schema: &SchemaModel) -> Self {
        let mut retained: HashMap<String, HashSet<String>> = HashMap::new();

        for segments in raw_specs {
            if segments.len() < 2 {
                warn!("malformed --whitelist entry {segments:?}, skipping");
                continue;
            }

            let mut current_parent = segments[0].clone();
            for name in &segments[1..] {
                let Some(parent_ty) = schema.type_by_name(&current_parent) else {
                    warn!("--whitelist references unknown type {current_parent}, skipping rest of chain");
                    break;
                };

                if !member_exists(parent_ty, name) {
                    warn!(
                        "--whitelist references unknown member {current_parent}::{name}, skipping rest of chain"
                    );
                    break;
                }

                retained
                    .entry(current_parent.clone())
                    .or_default()
                    .insert(name.clone());

                match parent_ty.children.iter().find(|c| &c.name == name) {
                    Some(edge) => current_parent = edge.target.clone(),
                    None => break, // it was an attribute; no further chaining possible
                }
            }
        }

        if !raw_specs.is_empty() {
            retained
                .entry("StrElement".to_string())
                .or_default()
                .insert("Nr".to_string());
            retained
                .entry("ReferenzElement".to_string())
                .or_default()
                .insert("ReferenzNr".to_string());
        }

        Self { retained }
    }

    /// Whether `member` on `parent` survives the whitelist. When the whitelist
    /// is empty every member is retained (the gate is disabled).
    pub fn retains(&self, parent: &str, member: &str) -> bool {
        match self.retained.get(parent) {
            Some(names) => names.contains(member),
            None => self.retained.is_empty(),
        }
    }
}

fn member_exists(ty: &ElementType, name: &str) -> bool {
    ty.attributes.iter().any(|a| a.name == name) || ty.children.iter().any(|c| c.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, AttributeKind, ChildEdge};

    fn schema() -> SchemaModel {
        SchemaModel {
            root: "Zusi".into(),
            types: vec![
                ElementType {
                    name: "Zusi".into(),
                    base: None,
                    documentation: String::new(),
                    attributes: vec![],
                    children: vec![ChildEdge {
                        name: "Info".into(),
                        target: "Info".into(),
                        multiple: false,
                        documentation: String::new(),
                        layout: None,
                    }],
                    size: None,
                    source_span: None,
                },
                ElementType {
                    name: "Info".into(),
                    base: None,
                    documentation: String::new(),
                    attributes: vec![Attribute {
                        name: "DateiTyp".into(),
                        kind: AttributeKind::String,
                        documentation: String::new(),
                    }],
                    children: vec![],
                    size: None,
                    source_span: None,
                },
            ],
        }
    }

    #[test]
    fn chained_whitelist_resolves_through_child_target() {
        let raw = vec![Whitelist::parse_spec("Zusi::Info::DateiTyp")];
        let wl = Whitelist::resolve(&raw, &schema());
        assert!(wl.retains("Zusi", "Info"));
        assert!(wl.retains("Info", "DateiTyp"));
    }

    #[test]
    fn always_retained_members_present_even_when_whitelist_set() {
        let raw = vec![Whitelist::parse_spec("Zusi::Info")];
        let wl = Whitelist::resolve(&raw, &schema());
        assert!(wl.retains("StrElement", "Nr"));
        assert!(wl.retains("ReferenzElement", "ReferenzNr"));
    }

    #[test]
    fn empty_whitelist_retains_everything() {
        let wl = Whitelist::default();
        assert!(wl.retains("Anything", "AnyMember"));
    }
}
