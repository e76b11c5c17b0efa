//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use less::{Compiler, DebugInfo, LessError, MemoryImporter, Options};

/// Compile `source` as `input.less` without debug annotations.
pub fn compile(source: &str) -> String {
    compile_with(source, DebugInfo::empty())
}

pub fn compile_with(source: &str, debug: DebugInfo) -> String {
    Compiler::new(Options::default())
        .parse_str(source, "input.less")
        .unwrap_or_else(|err| panic!("compilation failed: {err}"))
        .get_css(debug)
}

/// Compile `source` and return the error it fails with.
pub fn compile_err(source: &str) -> LessError {
    match Compiler::new(Options::default()).parse_str(source, "input.less") {
        Ok(compiled) => panic!(
            "expected an error, got:\n{}",
            compiled.get_css(DebugInfo::empty())
        ),
        Err(err) => err,
    }
}

/// Compile `entry` from an in-memory file set.
pub fn compile_files(files: &[(&str, &str)], entry: &str) -> Result<String, LessError> {
    let importer = files
        .iter()
        .fold(MemoryImporter::new(), |importer, (path, contents)| {
            importer.with_file(path, contents)
        });
    Compiler::new(Options::default())
        .with_importer(importer)
        .compile_file(entry)
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}
