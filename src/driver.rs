// src/driver.rs
//! Orchestrates one generator invocation: validate input, load the local
//! package, resolve, analyze, emit, verify, write.

use crate::analyze::analyze;
use crate::cli::Cli;
use crate::debug::DebugSink;
use crate::emit::Emitter;
use crate::errors::{warn, Error, FsError};
use crate::frontend::{scan_file, RawDeclKind};
use crate::graph::loader::{PackageLoader, SourceLoader};
use crate::graph::TypeGraph;
use crate::input::ParsedInput;
use crate::resolve::Resolver;

/// Run the generator for parsed command-line arguments and write the
/// artifact to the output file.
pub fn run(cli: &Cli, header_args: &str) -> Result<(), Error> {
    let debug = DebugSink::from_env();
    let input = ParsedInput::from_cli(cli)?;
    let mut loader = SourceLoader::for_file(&input.in_file, debug.clone());
    let mut graph = TypeGraph::new();
    let text = generate(&mut graph, &input, &mut loader, &debug, header_args)?;

    if let Err(reason) = verify_source(&text) {
        // Non-fatal: write the bytes anyway so the user can inspect them.
        warn(format!(
            "generated source does not re-parse, compile to see what is wrong: {reason}"
        ));
    }

    std::fs::write(&input.out_file, &text).map_err(|e| FsError::Write {
        path: input.out_file.clone(),
        source: e,
    })?;
    debug.log(|| format!("wrote {}", input.out_file.display()));
    Ok(())
}

/// The loader-agnostic pipeline: resolve → analyze → emit.
pub fn generate(
    graph: &mut TypeGraph,
    input: &ParsedInput,
    loader: &mut dyn PackageLoader,
    debug: &DebugSink,
    header_args: &str,
) -> Result<String, Error> {
    let mut resolver = Resolver::new(graph, loader, debug);
    let resolved = resolver.resolve_input(input)?;
    let analysis = analyze(&mut resolver, &resolved, &input.imports)?;
    Emitter::new(&resolved, &analysis, input).render(header_args)
}

/// Feed the emitted bytes back through the scanner; the generated type
/// declarations must parse with the same frontend that read the input.
fn verify_source(text: &str) -> Result<(), String> {
    let raw = scan_file(text).map_err(|e| e.to_string())?;
    for decl in &raw.types {
        if let RawDeclKind::Unsupported(reason) = &decl.kind {
            return Err(format!("type {}: {reason}", decl.name));
        }
    }
    Ok(())
}
