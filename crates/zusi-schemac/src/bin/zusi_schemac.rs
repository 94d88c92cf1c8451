//! Schema-compiler CLI: compiles one or more root XSDs into the generated
//! record/parser sources, independent of the `build.rs`-driven path that
//! `zusi-parser` uses at its own build time.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use zusi_schemac::codegen::CodegenOptions;
use zusi_schemac::error::{CompilerError, CompilerErrorReport};

/// Compiles one or more Zusi 3 XSDs into a specialised Rust parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Root XSD file(s). Later roots' types fold into the same schema model.
    #[arg(value_name = "ROOT_XSD", num_args = 1..)]
    root_xsd: Vec<PathBuf>,

    /// Directory to write the four generated artefacts into.
    #[arg(long, value_name = "PATH")]
    out_dir: PathBuf,

    /// Retain only `ParentName::Name[::Name...]`; repeatable.
    #[arg(long = "whitelist", value_name = "ParentName::Name")]
    whitelist: Vec<String>,

    /// Suppress "unknown attribute/child" warnings instead of logging them.
    #[arg(long)]
    ignore_unknown: bool,

    /// Replace Vec2/Vec3/Quaternion with aliases to `glam`'s vector types.
    #[arg(long)]
    use_glm: bool,

    /// Serialize the loaded, post-whitelist schema model to JSON at this path.
    #[arg(long, value_name = "PATH")]
    dump_model: Option<PathBuf>,

    /// Increase log verbosity (repeatable).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            eprintln!("error: {report}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(cli: &Cli) -> Result<(), CompilerErrorReport> {
    if cli.root_xsd.is_empty() {
        return Err(CompilerError::LookupError("at least one ROOT_XSD".to_string()).into());
    }

    let options = CodegenOptions {
        use_glm: cli.use_glm,
        ignore_unknown: cli.ignore_unknown,
    };

    let (schema, artifacts) = zusi_schemac::compile(&cli.root_xsd, &cli.whitelist, &options)?;

    std::fs::create_dir_all(&cli.out_dir).map_err(CompilerError::from)?;

    std::fs::write(cli.out_dir.join("types_fwd.rs"), &artifacts.types_fwd).map_err(CompilerError::from)?;
    std::fs::write(cli.out_dir.join("types.rs"), &artifacts.types).map_err(CompilerError::from)?;
    std::fs::write(cli.out_dir.join("parser_fwd.rs"), &artifacts.parser_fwd).map_err(CompilerError::from)?;
    std::fs::write(cli.out_dir.join("parser.rs"), &artifacts.parser).map_err(CompilerError::from)?;

    if let Some(dump_path) = &cli.dump_model {
        let json = serde_json::to_string_pretty(&schema).map_err(CompilerError::from)?;
        std::fs::write(dump_path, json).map_err(CompilerError::from)?;
    }

    Ok(())
}
