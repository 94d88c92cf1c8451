//! Drives `zusi-schemac` over this crate's fixed schema set at build time and
//! writes the four generated artefacts into `OUT_DIR`, where `src/lib.rs`
//! splices them into `mod types`/`mod parser` via `include!`.

use std::env;
use std::path::{Path, PathBuf};

use zusi_schemac::codegen::CodegenOptions;

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR set"));
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR set"));
    let schema_dir = manifest_dir.join("schema");

    let root_xsd = schema_dir.join("zusi.xsd");
    println!("cargo:rerun-if-changed={}", schema_dir.display());

    let options = CodegenOptions {
        use_glm: env::var_os("CARGO_FEATURE_USE_GLM").is_some(),
        ignore_unknown: false,
    };

    let roots = [root_xsd];
    let (_schema, artifacts) = zusi_schemac::compile(&roots, &[], &options)
        .unwrap_or_else(|report| panic!("zusi-schemac failed to compile {}: {report}", schema_dir.display()));

    write(&out_dir, "types_fwd.rs", &artifacts.types_fwd);
    write(&out_dir, "types.rs", &artifacts.types);
    write(&out_dir, "parser_fwd.rs", &artifacts.parser_fwd);
    write(&out_dir, "parser.rs", &artifacts.parser);
}

fn write(out_dir: &Path, name: &str, contents: &str) {
    std::fs::write(out_dir.join(name), contents)
        .unwrap_or_else(|e| panic!("writing {}: {e}", out_dir.join(name).display()));
}
