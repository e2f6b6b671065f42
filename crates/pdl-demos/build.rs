//! Generates the Rust types of the demo schemas.
//!
//! The output lands in `$OUT_DIR/params.rs` and is included by `src/lib.rs`.

use std::{env, fs, path::PathBuf};

#[path = "schemas.rs"]
mod schemas;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let root = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    for dir in schemas::SCHEMA_DIRS {
        println!("cargo:rerun-if-changed={}", root.join(dir).display());
    }
    for file in schemas::schema_files(&root)? {
        println!("cargo:rerun-if-changed={}", file.display());
    }
    println!("cargo:rerun-if-changed=schemas.rs");

    let code = schemas::emit_schemas(&root)?;
    fs::write(out_dir.join("params.rs"), code)?;
    Ok(())
}
