//! Layout planner: decides the embedding strategy for
//! every child edge and memoises record sizes.

use crate::model::{ChildEdge, ElementType, LayoutDecision, SchemaModel};

/// Forward-referenced sizes (a child type whose own layout hasn't been computed
/// yet because of a cycle break) are treated as this conservative sentinel, large
/// enough to force `Heap` for anything that reads it before it's known. Mirrors
/// the original compiler's literal `9999` sentinel.
const UNKNOWN_SIZE_SENTINEL: u32 = 9999;

const POINTER_WIDTH: u32 = 8;
const OPTIONAL_FLAG_WIDTH: u32 = 1;
const LENGTH_FIELD_WIDTH: u32 = 4;

/// Computes a `LayoutDecision` for every child edge across the whole schema, then
/// memoises each type's record size. Mutates `schema` in place.
pub fn plan_layout(schema: &mut SchemaModel) {
    let names: Vec<String> = schema.types.iter().map(|t| t.name.clone()).collect();

    for parent_name in &names {
        let decisions: Vec<LayoutDecision> = {
            let parent = schema.type_by_name(parent_name).unwrap();
            parent
                .children
                .iter()
                .map(|edge| decide_layout(parent_name, edge))
                .collect()
        };
        let parent = schema.type_by_name_mut(parent_name).unwrap();
        for (edge, decision) in parent.children.iter_mut().zip(decisions) {
            edge.layout = Some(decision);
        }
    }

    // Sizes depend on child sizes; types land in whatever order the loader
    // produced them in, so compute iteratively until no size changes, same as
    // the topological emitter's own fixed-point tolerance for forward refs.
    for _ in 0..names.len().max(1) {
        let mut changed = false;
        for name in &names {
            let size = compute_size(schema, name);
            let ty = schema.type_by_name_mut(name).unwrap();
            if ty.size != Some(size) {
                ty.size = Some(size);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
}

fn decide_layout(parent_name: &str, edge: &ChildEdge) -> LayoutDecision {
    if edge.target == parent_name {
        return LayoutDecision::Heap;
    }

    if !edge.multiple && ElementType::is_inline_always(&edge.target) {
        return LayoutDecision::Inline;
    }

    if !edge.multiple && edge.target == "StreckenelementRichtungsInfo" {
        return LayoutDecision::Optional;
    }

    if edge.multiple && ElementType::is_small_vector_target(&edge.target) {
        return LayoutDecision::SmallVector(2);
    }

    LayoutDecision::Heap
}

fn compute_size(schema: &SchemaModel, name: &str) -> u32 {
    let ty = schema.type_by_name(name).unwrap();

    let attrs_size: u32 = ty.attributes.iter().map(|a| a.kind.size()).sum();

    let children_size: u32 = ty
        .children
        .iter()
        .map(|edge| {
            let child_size = schema
                .type_by_name(&edge.target)
                .and_then(|t| t.size)
                .unwrap_or(UNKNOWN_SIZE_SENTINEL);

            match edge.layout {
                Some(LayoutDecision::Heap) | None => POINTER_WIDTH,
                Some(LayoutDecision::Optional) => child_size + OPTIONAL_FLAG_WIDTH,
                Some(LayoutDecision::Inline) => child_size,
                Some(LayoutDecision::SmallVector(n)) => {
                    n as u32 * child_size + LENGTH_FIELD_WIDTH
                }
            }
        })
        .sum();

    attrs_size + children_size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attribute;
    use crate::model::AttributeKind;

    fn ty(name: &str, children: Vec<ChildEdge>) -> ElementType {
        ElementType {
            name: name.to_string(),
            base: None,
            documentation: String::new(),
            attributes: vec![Attribute {
                name: "X".into(),
                kind: AttributeKind::Float,
                documentation: String::new(),
            }],
            children,
            size: None,
            source_span: None,
        }
    }

    fn edge(name: &str, target: &str, multiple: bool) -> ChildEdge {
        ChildEdge {
            name: name.to_string(),
            target: target.to_string(),
            multiple,
            documentation: String::new(),
            layout: None,
        }
    }

    #[test]
    fn self_recursion_is_heap() {
        let mut schema = SchemaModel {
            root: "Knoten".into(),
            types: vec![ty("Knoten", vec![edge("Kind", "Knoten", false)])],
        };
        plan_layout(&mut schema);
        let knoten = schema.type_by_name("Knoten").unwrap();
        assert_eq!(knoten.children[0].layout, Some(LayoutDecision::Heap));
    }

    #[test]
    fn inline_always_set_inlines_singular_children() {
        let mut schema = SchemaModel {
            root: "Face".into(),
            types: vec![
                ty("Vec3", vec![]),
                ty("Face", vec![edge("Normal", "Vec3", false)]),
            ],
        };
        plan_layout(&mut schema);
        let face = schema.type_by_name("Face").unwrap();
        assert_eq!(face.children[0].layout, Some(LayoutDecision::Inline));
    }

    #[test]
    fn small_vector_target_gets_capacity_two() {
        let mut schema = SchemaModel {
            root: "Streckenelement".into(),
            types: vec![
                ty("NachfolgerSelbesModul", vec![]),
                ty(
                    "Streckenelement",
                    vec![edge("Nachfolger", "NachfolgerSelbesModul", true)],
                ),
            ],
        };
        plan_layout(&mut schema);
        let se = schema.type_by_name("Streckenelement").unwrap();
        assert_eq!(se.children[0].layout, Some(LayoutDecision::SmallVector(2)));
    }

    #[test]
    fn default_strategy_is_heap() {
        let mut schema = SchemaModel {
            root: "Info".into(),
            types: vec![
                ty("AutorEintrag", vec![]),
                ty(
                    "Info",
                    vec![edge("AutorEintrag", "AutorEintrag", true)],
                ),
            ],
        };
        plan_layout(&mut schema);
        let info = schema.type_by_name("Info").unwrap();
        assert_eq!(info.children[0].layout, Some(LayoutDecision::Heap));
    }
}
