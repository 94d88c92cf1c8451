//! The schema-time entities. Built once per compiler run by
//! the loader, then annotated in place by the layout planner; never mutated again
//! after that.

use serde::{Deserialize, Serialize};

/// The closed set of scalar attribute kinds. No dynamic dispatch is ever needed
/// over this enum; every consumer of it is an exhaustive match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKind {
    Int32,
    Int64,
    Boolean,
    String,
    Float,
    DateTime,
    HexInt32,
    FaceIndexes,
    ArgbColor,
}

impl AttributeKind {
    /// Maps an XSD `type` string onto its `AttributeKind`. Returns `None` for
    /// an unrecognised type, which the loader logs and drops the attribute for.
    pub fn from_xsd_type(xsd_type: &str) -> Option<Self> {
        // Types may arrive namespace-prefixed (`xs:int`) or bare (`dateTime`,
        // `faceIndexes`, `argbColor` are schema-local simple types with no prefix).
        let local = xsd_type.rsplit(':').next().unwrap_or(xsd_type);

        match local {
            "int" => Some(Self::Int32),
            "long" => Some(Self::Int64),
            "float" => Some(Self::Float),
            "string" => Some(Self::String),
            "boolean" => Some(Self::Boolean),
            "hexBinary" => Some(Self::HexInt32),
            "dateTime" => Some(Self::DateTime),
            "faceIndexes" => Some(Self::FaceIndexes),
            "argbColor" => Some(Self::ArgbColor),
            _ => None,
        }
    }

    /// Natural alignment/size in bytes used by the layout planner's record-size
    /// accumulation.
    pub fn size(self) -> u32 {
        match self {
            Self::Int32 | Self::HexInt32 | Self::Float | Self::ArgbColor => 4,
            Self::Int64 | Self::DateTime => 8,
            Self::Boolean => 1,
            Self::String => 16, // borrowed-or-owned tagged representation
            Self::FaceIndexes => 12, // three u32 indices
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Attribute {
    /// The XML attribute name. Also the legacy-colour remap key (`C`, `CA`, `E`);
    /// the field these three end up stored as (`Cd`, `Ca`, `Ce`) is computed by
    /// the code generator, not stored here.
    pub name: String,
    pub kind: AttributeKind,
    pub documentation: String,
}

impl Attribute {
    pub fn deprecated(&self) -> bool {
        self.documentation.contains("@deprecated")
    }

    /// The three legacy colour attributes are always retained and remapped,
    /// overriding the ordinary deprecated-drop rule.
    pub fn is_legacy_color(&self) -> bool {
        matches!(self.name.as_str(), "C" | "CA" | "E")
    }

    /// The field name this attribute is stored under on the generated record.
    pub fn storage_name(&self) -> &str {
        match self.name.as_str() {
            "C" => "Cd",
            "CA" => "Ca",
            "E" => "Ce",
            other => other,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChildEdge {
    /// XML element name and (absent a whitelist rename) Rust member name.
    pub name: String,
    /// Name of the target `ElementType`.
    pub target: String,
    pub multiple: bool,
    pub documentation: String,
    /// Filled in by the layout planner; `None` until `plan_layout` runs.
    pub layout: Option<LayoutDecision>,
}

impl ChildEdge {
    pub fn deprecated(&self) -> bool {
        self.documentation.contains("@deprecated")
    }
}

/// The per-child-edge embedding strategy. Kept as an
/// explicit four-variant sum even though the original C++ implementation folds
/// `SmallVector` into the same code path as `Inline` — see DESIGN.md.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutDecision {
    Heap,
    Optional,
    Inline,
    SmallVector(u8),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElementType {
    pub name: String,
    pub base: Option<String>,
    pub documentation: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<ChildEdge>,
    /// Record size in planner-internal units, filled in once every descendant's
    /// layout is fixed. `None` until planning completes for this type.
    pub size: Option<u32>,
    /// File + 1-based line the type was declared at, for diagnostics only.
    pub source_span: Option<(std::path::PathBuf, u32)>,
}

impl ElementType {
    pub fn deprecated(&self) -> bool {
        self.documentation.contains("@deprecated")
    }

    /// True for the hard-coded inline-always leaf types.
    pub fn is_inline_always(name: &str) -> bool {
        matches!(
            name,
            "Vertex"
                | "Face"
                | "Vec2"
                | "Vec3"
                | "Quaternion"
                | "Dateiverknuepfung"
                | "Tastaturzuordnung"
                | "Bremsgewicht"
                | "MatrixEintrag"
        )
    }

    /// True for the two hard-coded small-vector target types.
    pub fn is_small_vector_target(name: &str) -> bool {
        matches!(name, "NachfolgerSelbesModul" | "NachfolgerAnderesModul")
    }

    /// True for the two indexed-collection target types (`StrElement`,
    /// `ReferenzElement`) and the name of their index attribute.
    pub fn indexed_collection_field(name: &str) -> Option<&'static str> {
        match name {
            "StrElement" => Some("Nr"),
            "ReferenzElement" => Some("ReferenzNr"),
            _ => None,
        }
    }

    /// The `Vertex` type alone swaps field order (children before attributes) to
    /// match the sidecar binary mesh layout.
    pub fn children_before_attributes(name: &str) -> bool {
        name == "Vertex"
    }
}

/// The complete in-memory schema, indexed by type name. Built once by the loader
/// (`loader.rs`), annotated by the planner (`layout.rs`), ordered by the
/// topological emitter (`topo.rs`), then handed to the code generator unmodified.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SchemaModel {
    pub root: String,
    pub types: Vec<ElementType>,
}

impl SchemaModel {
    pub fn type_by_name(&self, name: &str) -> Option<&ElementType> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn type_by_name_mut(&mut self, name: &str) -> Option<&mut ElementType> {
        self.types.iter_mut().find(|t| t.name == name)
    }

    /// All attributes reachable on `ty`, in dispatch order: derived-class
    /// attributes first, then the base chain appended.
    pub fn all_attributes(&self, ty: &ElementType) -> Vec<Attribute> {
        let mut out: Vec<Attribute> = ty.attributes.clone();
        let mut cur = ty.base.clone();
        while let Some(base_name) = cur {
            let Some(base) = self.type_by_name(&base_name) else {
                break;
            };
            out.extend(base.attributes.iter().cloned());
            cur = base.base.clone();
        }
        out
    }

    /// All child edges reachable on `ty`, in dispatch order: base-class-first,
    /// then derived children appended (note the asymmetry vs. `all_attributes`).
    pub fn all_children(&self, ty: &ElementType) -> Vec<ChildEdge> {
        let mut chain = vec![ty.clone()];
        let mut cur = ty.base.clone();
        while let Some(base_name) = cur {
            let Some(base) = self.type_by_name(&base_name) else {
                break;
            };
            chain.push(base.clone());
            cur = base.base.clone();
        }
        let mut out = Vec::new();
        for t in chain.iter().rev() {
            out.extend(t.children.iter().cloned());
        }
        out
    }
}
