//! End-to-end tests over the fixture schema set in `tests/fixtures/`,
//! exercising the full `load -> plan -> topo -> codegen` pipeline the way
//! `build.rs` drives it for the real Zusi schema, but over a small schema
//! built for this test suite.

use std::path::PathBuf;

use zusi_schemac::codegen::CodegenOptions;
use zusi_schemac::model::LayoutDecision;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn default_options() -> CodegenOptions {
    CodegenOptions { use_glm: false, ignore_unknown: false }
}

#[test]
fn loads_includes_and_extracts_every_attribute_kind() {
    let (schema, _) = zusi_schemac::compile(&[fixture("basic.xsd")], &[], &default_options()).unwrap();

    let root = schema.type_by_name("Root").expect("Root type loaded");
    let kinds: Vec<_> = root.attributes.iter().map(|a| (a.name.as_str(), a.kind)).collect();
    assert!(kinds.contains(&("Id", zusi_schemac::model::AttributeKind::Int32)));
    assert!(kinds.contains(&("BigId", zusi_schemac::model::AttributeKind::Int64)));
    assert!(kinds.contains(&("Aktiv", zusi_schemac::model::AttributeKind::Boolean)));
    assert!(kinds.contains(&("Name", zusi_schemac::model::AttributeKind::String)));
    assert!(kinds.contains(&("Gewicht", zusi_schemac::model::AttributeKind::Float)));
    assert!(kinds.contains(&("Erstellt", zusi_schemac::model::AttributeKind::DateTime)));
    assert!(kinds.contains(&("Flags", zusi_schemac::model::AttributeKind::HexInt32)));
    assert!(kinds.contains(&("Indizes", zusi_schemac::model::AttributeKind::FaceIndexes)));
    assert!(kinds.contains(&("Farbe", zusi_schemac::model::AttributeKind::ArgbColor)));

    // Vec3/NachfolgerSelbesModul came in transitively via common_types.xsd's
    // <xs:include>, proving the loader follows includes.
    assert!(schema.type_by_name("Vec3").is_some());
    assert!(schema.type_by_name("NachfolgerSelbesModul").is_some());
}

#[test]
fn layout_planner_assigns_every_strategy() {
    let (schema, _) = zusi_schemac::compile(&[fixture("basic.xsd")], &[], &default_options()).unwrap();
    let root = schema.type_by_name("Root").unwrap();

    let layout_of = |child_name: &str| {
        root.children
            .iter()
            .find(|c| c.name == child_name)
            .unwrap_or_else(|| panic!("no child edge named {child_name}"))
            .layout
            .unwrap()
    };

    assert_eq!(layout_of("Position"), LayoutDecision::Inline);
    assert_eq!(layout_of("Richtung"), LayoutDecision::Optional);
    assert_eq!(layout_of("Nachfolger"), LayoutDecision::SmallVector(2));
    assert_eq!(layout_of("Child"), LayoutDecision::Heap);
    assert_eq!(layout_of("StrElement"), LayoutDecision::Heap);

    let knoten = schema.type_by_name("Knoten").unwrap();
    assert_eq!(knoten.children[0].layout, Some(LayoutDecision::Heap), "self-recursion must break via Heap");
}

#[test]
fn deprecated_members_are_dropped_except_legacy_colors() {
    let (schema, artifacts) = zusi_schemac::compile(&[fixture("basic.xsd")], &[], &default_options()).unwrap();
    let leaf = schema.type_by_name("Leaf").unwrap();

    let alt = leaf.attributes.iter().find(|a| a.name == "Alt").unwrap();
    assert!(alt.deprecated());
    let c = leaf.attributes.iter().find(|a| a.name == "C").unwrap();
    assert!(c.deprecated());
    assert!(c.is_legacy_color());

    // The generated struct keeps `Cd` (the legacy-colour remap) but drops
    // `alt`/`r#alt`.
    assert!(artifacts.types.contains("pub cd"), "legacy colour field should survive as `cd`");
    assert!(!artifacts.types.contains("pub alt"), "plain deprecated field should be dropped");
}

#[test]
fn empty_whitelist_keeps_non_deprecated_members_on_every_type() {
    // Regression test: `Whitelist::resolve` must not fold in the two
    // always-retained entries (StrElement::Nr, ReferenzElement::ReferenzNr)
    // when no `--whitelist` flag was given at all, or every other type's
    // members would be filtered down to nothing once `is_empty()` goes false.
    let (_, artifacts) = zusi_schemac::compile(&[fixture("basic.xsd")], &[], &default_options()).unwrap();
    assert!(artifacts.types.contains("pub gewicht"));
    assert!(artifacts.types.contains("pub name"));
}

#[test]
fn whitelist_narrows_generated_members() {
    let raw = vec!["Root::Name".to_string(), "Root::Id".to_string()];
    let (_, artifacts) = zusi_schemac::compile(&[fixture("basic.xsd")], &raw, &default_options()).unwrap();

    // Root keeps Name/Id but drops Gewicht, which wasn't whitelisted.
    assert!(artifacts.types.contains("pub name"));
    assert!(artifacts.types.contains("pub id"));
    assert!(!artifacts.types.contains("pub gewicht"));
}

#[test]
fn use_glm_aliases_vec3_and_drops_its_own_struct() {
    let options = CodegenOptions { use_glm: true, ignore_unknown: false };
    let (_, artifacts) = zusi_schemac::compile(&[fixture("basic.xsd")], &[], &options).unwrap();
    assert!(artifacts.types.contains("glam :: Vec3") || artifacts.types.contains("glam::Vec3"));
    assert!(!artifacts.types.contains("pub struct Vec3"));
}

#[test]
fn unresolved_include_aborts_with_a_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.xsd");
    std::fs::write(
        &path,
        r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:include schemaLocation="does_not_exist.xsd"/>
  <xs:element name="Root" type="Root"/>
  <xs:complexType name="Root"/>
</xs:schema>"#,
    )
    .unwrap();

    let result = zusi_schemac::compile(&[path], &[], &default_options());
    assert!(result.is_err());
}

#[test]
fn unknown_attribute_type_is_dropped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weird.xsd");
    std::fs::write(
        &path,
        r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Root" type="Root"/>
  <xs:complexType name="Root">
    <xs:attribute name="Known" type="xs:int"/>
    <xs:attribute name="Mystery" type="xs:someUnknownType"/>
  </xs:complexType>
</xs:schema>"#,
    )
    .unwrap();

    let (schema, _) = zusi_schemac::compile(&[path], &[], &default_options()).unwrap();
    let root = schema.type_by_name("Root").unwrap();
    assert_eq!(root.attributes.len(), 1);
    assert_eq!(root.attributes[0].name, "Known");
}

#[test]
fn duplicate_type_definition_keeps_the_first() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dup.xsd");
    std::fs::write(
        &path,
        r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Root" type="Root"/>
  <xs:complexType name="Root">
    <xs:attribute name="First" type="xs:int"/>
  </xs:complexType>
  <xs:complexType name="Root">
    <xs:attribute name="Second" type="xs:int"/>
  </xs:complexType>
</xs:schema>"#,
    )
    .unwrap();

    let (schema, _) = zusi_schemac::compile(&[path], &[], &default_options()).unwrap();
    let roots: Vec<_> = schema.types.iter().filter(|t| t.name == "Root").collect();
    assert_eq!(roots.len(), 1, "the second definition must be discarded");
    assert_eq!(roots[0].attributes[0].name, "First");
}

#[test]
fn dangling_base_and_child_refs_are_dropped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dangling.xsd");
    std::fs::write(
        &path,
        r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Root" type="Root"/>
  <xs:complexType name="Root">
    <xs:complexContent>
      <xs:extension base="MissingBase">
        <xs:attribute name="Known" type="xs:int"/>
      </xs:extension>
    </xs:complexContent>
    <xs:sequence>
      <xs:element name="Ghost" type="MissingTarget" minOccurs="0"/>
    </xs:sequence>
  </xs:complexType>
</xs:schema>"#,
    )
    .unwrap();

    let (schema, _) = zusi_schemac::compile(&[path], &[], &default_options()).unwrap();
    let root = schema.type_by_name("Root").unwrap();
    assert_eq!(root.base, None, "a dangling base reference must be cleared");
    assert!(
        root.children.iter().all(|c| c.name != "Ghost"),
        "a child edge to a never-defined type must be dropped"
    );
    assert_eq!(root.attributes.len(), 1);
}
