//! Locates the schemas compiled into this crate.
//!
//! Shared by the build script and the tests so that both compile the same
//! library.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Directories holding `.pdl` files, relative to the crate root.
pub const SCHEMA_DIRS: &[&str] = &["../../demos", "schemas"];

/// Returns the `.pdl` files of every schema directory, sorted by path.
pub fn schema_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for dir in SCHEMA_DIRS {
        for entry in fs::read_dir(root.join(dir))? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "pdl") {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Reads every schema as a `(document name, source)` pair.
pub fn read_schemas(root: &Path) -> io::Result<Vec<(String, String)>> {
    schema_files(root)?
        .into_iter()
        .map(|path| {
            let stem = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or_default();
            let name = pdl::document_name(stem).to_string();
            Ok((name, fs::read_to_string(&path)?))
        })
        .collect()
}

/// Parses and emits the schemas found under `root`.
pub fn emit_schemas(root: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let schemas = read_schemas(root)?;
    let sources: Vec<(&str, &str)> = schemas
        .iter()
        .map(|(name, source)| (name.as_str(), source.as_str()))
        .collect();

    let compiler = pdl::SchemaCompiler::default();
    let library = compiler.parse(&sources)?;
    Ok(compiler.emit(&library)?)
}
