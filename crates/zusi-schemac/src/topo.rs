//! Topological emitter. Orders element types so that any
//! type appearing value-inlined (or as a base) in another is defined first; Heap
//! edges are deliberately excluded from the graph, since they are exactly the
//! edges self-recursion relies on to not constrain emission order.

use crate::model::{LayoutDecision, SchemaModel};
use std::collections::{HashMap, VecDeque};
use tracing::warn;

/// Returns type names in emission order: dependencies (inline/optional/
/// small-vector targets, and base types) before dependents. Types left over
/// after the acyclic prefix are cyclic; they're logged and appended in their
/// original schema order so emission still proceeds.
pub fn topological_order(schema: &SchemaModel) -> Vec<String> {
    let mut in_degree: HashMap<String, usize> = HashMap::new();
    let mut dependents: HashMap<String, Vec<String>> = HashMap::new();

    for ty in &schema.types {
        in_degree.entry(ty.name.clone()).or_insert(0);
        dependents.entry(ty.name.clone()).or_default();
    }

    let mut add_edge = |from_dependency: &str, to_dependent: &str| {
        if !in_degree.contains_key(from_dependency) {
            return;
        }
        dependents
            .entry(from_dependency.to_string())
            .or_default()
            .push(to_dependent.to_string());
        *in_degree.entry(to_dependent.to_string()).or_insert(0) += 1;
    };

    for ty in &schema.types {
        if let Some(base) = &ty.base {
            add_edge(base, &ty.name);
        }
        for edge in &ty.children {
            let is_dependency_edge = matches!(
                edge.layout,
                Some(LayoutDecision::Inline)
                    | Some(LayoutDecision::Optional)
                    | Some(LayoutDecision::SmallVector(_))
            );
            if is_dependency_edge {
                add_edge(&edge.target, &ty.name);
            }
        }
    }

    let mut queue: VecDeque<String> = in_degree
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(name, _)| name.clone())
        .collect();
    // Stable order: process in schema declaration order among zero-in-degree nodes.
    let declared_order: HashMap<&str, usize> = schema
        .types
        .iter()
        .enumerate()
        .map(|(i, t)| (t.name.as_str(), i))
        .collect();
    queue.make_contiguous().sort_by_key(|n| declared_order.get(n.as_str()).copied().unwrap_or(usize::MAX));

    let mut order = Vec::with_capacity(schema.types.len());
    let mut remaining_in_degree = in_degree.clone();

    while let Some(name) = queue.pop_front() {
        order.push(name.clone());
        if let Some(deps) = dependents.get(&name) {
            let mut newly_ready = Vec::new();
            for dependent in deps {
                if let Some(d) = remaining_in_degree.get_mut(dependent) {
                    *d -= 1;
                    if *d == 0 {
                        newly_ready.push(dependent.clone());
                    }
                }
            }
            newly_ready.sort_by_key(|n| declared_order.get(n.as_str()).copied().unwrap_or(usize::MAX));
            for n in newly_ready {
                queue.push_back(n);
            }
        }
    }

    if order.len() != schema.types.len() {
        let emitted: std::collections::HashSet<&str> = order.iter().map(|s| s.as_str()).collect();
        let cyclic: Vec<&str> = schema
            .types
            .iter()
            .map(|t| t.name.as_str())
            .filter(|n| !emitted.contains(n))
            .collect();
        warn!(
            "cyclic inline/base dependency among types {:?}; emitting in declaration order",
            cyclic
        );
        for name in cyclic {
            order.push(name.to_string());
        }
    }

    // The generator consumes this as "dependencies first", i.e. reverse
    // topological order relative to "dependents first" graphs built from
    // inline-edge direction above; `order` is already dependency-before-dependent.
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, AttributeKind, ChildEdge, ElementType};

    fn leaf(name: &str) -> ElementType {
        ElementType {
            name: name.to_string(),
            base: None,
            documentation: String::new(),
            attributes: vec![Attribute {
                name: "X".into(),
                kind: AttributeKind::Float,
                documentation: String::new(),
            }],
            children: vec![],
            size: None,
            source_span: None,
        }
    }

    #[test]
    fn inline_dependency_precedes_dependent() {
        let schema = SchemaModel {
            root: "Face".into(),
            types: vec![
                ElementType {
                    children: vec![ChildEdge {
                        name: "Normal".into(),
                        target: "Vec3".into(),
                        multiple: false,
                        documentation: String::new(),
                        layout: Some(LayoutDecision::Inline),
                    }],
                    ..leaf("Face")
                },
                leaf("Vec3"),
            ],
        };
        let order = topological_order(&schema);
        let vec3_pos = order.iter().position(|n| n == "Vec3").unwrap();
        let face_pos = order.iter().position(|n| n == "Face").unwrap();
        assert!(vec3_pos < face_pos);
    }

    #[test]
    fn heap_edges_do_not_constrain_order() {
        // Two types referencing each other only via Heap edges must not be
        // reported as cyclic.
        let schema = SchemaModel {
            root: "A".into(),
            types: vec![
                ElementType {
                    children: vec![ChildEdge {
                        name: "b".into(),
                        target: "B".into(),
                        multiple: false,
                        documentation: String::new(),
                        layout: Some(LayoutDecision::Heap),
                    }],
                    ..leaf("A")
                },
                ElementType {
                    children: vec![ChildEdge {
                        name: "a".into(),
                        target: "A".into(),
                        multiple: false,
                        documentation: String::new(),
                        layout: Some(LayoutDecision::Heap),
                    }],
                    ..leaf("B")
                },
            ],
        };
        let order = topological_order(&schema);
        assert_eq!(order.len(), 2);
    }
}
