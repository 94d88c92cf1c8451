use rootcause::Report;
use thiserror::Error;

pub type CompilerErrorReport = Report<CompilerError>;

#[derive(Error, Debug)]
pub enum CompilerError {
    #[error("I/O error: {_0}")]
    IOError(#[from] std::io::Error),
    #[error("syn error: {_0}")]
    SynError(#[from] syn::Error),
    #[error("XML error in {path}: {source}")]
    XmlError {
        path: std::path::PathBuf,
        #[source]
        source: roxmltree::Error,
    },
    #[error("expected {_0} to exist, but found none")]
    LookupError(String),
    #[error("unresolved <xs:include> {schema_location} from {from}")]
    UnresolvedInclude {
        from: std::path::PathBuf,
        schema_location: String,
    },
    #[error("dangling base type reference {_0} -> {_1}")]
    DanglingBase(String, String),
    #[error("dangling child type reference {parent}.{child} -> {target}")]
    DanglingChild {
        parent: String,
        child: String,
        target: String,
    },
    #[error("serde_json error: {_0}")]
    JsonError(#[from] serde_json::Error),
}
