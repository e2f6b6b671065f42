//! CLI logic for the PDL schema compiler.
//!
//! Reads the input documents, compiles them as one library and writes
//! either the generated Rust source or the default parameter trees.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use log::{debug, info};

use pdl::{PdlError, SchemaCompiler, document_name, tree::TreeView};

/// Run the PDL CLI application
///
/// # Errors
///
/// Returns `PdlError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing and validation errors
/// - Emit errors
pub fn run(args: &Args) -> Result<(), PdlError> {
    info!(
        inputs = args.inputs.len(),
        print_default = args.print_default;
        "Compiling documents"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let mut sources = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        let stem = Path::new(input)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = document_name(&stem).to_string();
        debug!(input = input.as_str(), document = name.as_str(); "Reading document");
        sources.push((name, fs::read_to_string(input)?));
    }
    let sources: Vec<(&str, &str)> = sources
        .iter()
        .map(|(name, source)| (name.as_str(), source.as_str()))
        .collect();

    let compiler = SchemaCompiler::new(app_config);
    let library = compiler.parse(&sources)?;

    let output = if args.print_default {
        let mut text = String::new();
        for document in library.documents() {
            let tree = compiler.default_tree(&library, document.name())?;
            text.push_str(&TreeView::new(document.name(), &tree).to_string());
        }
        text
    } else {
        compiler.emit(&library)?
    };

    match &args.output {
        Some(path) => {
            fs::write(path, output)?;
            info!(output_file = path.as_str(); "Output written");
        }
        None => io::stdout().write_all(output.as_bytes())?,
    }

    Ok(())
}
