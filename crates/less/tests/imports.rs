//! Integration tests for `@import` resolution, import options and caching.

mod support;

use std::sync::Arc;

use less::{Compiler, DebugInfo, FileSystemImporter, LessError, MemoryCache, Options};
use support::{compile_files, fixture};

// ============================================================================
// File system
// ============================================================================

#[test]
fn test_imports_from_disk() {
    let path = fixture("main.less");
    let css = Compiler::new(Options::default())
        .compile_file(path.to_str().unwrap())
        .unwrap();
    assert_eq!(
        css,
        "@import \"reset.css\";\n.raw{color:red}\n.page {\n  color: #333;\n  width: 960px;\n  margin: 0 auto;\n}\n"
    );
}

#[test]
fn test_import_cycle_names_both_files() {
    let path = fixture("cycle_a.less");
    let err = Compiler::new(Options::default())
        .parse_file(path.to_str().unwrap())
        .unwrap_err();
    let LessError::ImportCycle { chain, .. } = &err else {
        panic!("expected an import cycle, got {err:?}");
    };
    assert_eq!(chain.len(), 3);
    assert!(chain[0].ends_with("cycle_a.less"));
    assert!(chain[1].ends_with("cycle_b.less"));
    assert!(chain[2].ends_with("cycle_a.less"));
    let message = err.to_string();
    assert!(message.contains("cycle_a.less") && message.contains("cycle_b.less"));
}

#[test]
fn test_include_paths_are_searched() {
    let options = Options {
        import_paths: vec![fixture("include")],
        ..Options::default()
    };
    let css = Compiler::new(options)
        .compile_file(fixture("with_include.less").to_str().unwrap())
        .unwrap();
    assert_eq!(css, ".a {\n  color: green;\n}\n");

    let err = Compiler::new(Options::default())
        .compile_file(fixture("with_include.less").to_str().unwrap())
        .unwrap_err();
    assert!(matches!(err, LessError::ImportNotFound { ref path, .. } if path == "shared.less"));
}

#[test]
fn test_file_system_importer_directly() {
    let importer = FileSystemImporter::new(vec![fixture("lib")]);
    let compiler = Compiler::new(Options::default()).with_importer(importer);
    let css = compiler
        .parse_str("@import \"variables\";\n.a { color: @text; }", "inline.less")
        .unwrap()
        .get_css(DebugInfo::empty());
    assert_eq!(css, ".a {\n  color: #333;\n}\n");
}

// ============================================================================
// Import semantics
// ============================================================================

#[test]
fn test_imported_variables_and_mixins_are_visible() {
    let css = compile_files(
        &[
            ("main.less", "@import \"theme\";\n.a { color: @brand; .pad(); }"),
            ("theme.less", "@brand: navy;\n.pad() { padding: 1px; }"),
        ],
        "main.less",
    )
    .unwrap();
    assert_eq!(css, ".a {\n  color: navy;\n  padding: 1px;\n}\n");
}

#[test]
fn test_import_once_by_default() {
    let files = [
        ("main.less", "@import \"a\";\n@import \"a\";\n@import (multiple) \"b\";\n@import (multiple) \"b\";"),
        ("a.less", ".a { x: 1; }"),
        ("b.less", ".b { y: 2; }"),
    ];
    let css = compile_files(&files, "main.less").unwrap();
    assert_eq!(
        css,
        ".a {\n  x: 1;\n}\n.b {\n  y: 2;\n}\n.b {\n  y: 2;\n}\n"
    );
}

#[test]
fn test_imports_resolve_relative_to_importing_file() {
    let files = [
        ("main.less", "@import \"lib/index\";"),
        ("lib/index.less", "@import \"colors\";\n.a { color: @c; }"),
        ("lib/colors.less", "@c: teal;"),
    ];
    let css = compile_files(&files, "main.less").unwrap();
    assert_eq!(css, ".a {\n  color: teal;\n}\n");
}

#[test]
fn test_nested_import_inside_ruleset() {
    let files = [
        ("main.less", ".scope { @import \"inner\"; }"),
        ("inner.less", ".x { color: red; }"),
    ];
    let css = compile_files(&files, "main.less").unwrap();
    assert_eq!(css, ".scope .x {\n  color: red;\n}\n");
}

#[test]
fn test_css_imports_are_hoisted() {
    let files = [(
        "main.less",
        "@charset \"utf-8\";\n.a { x: 1; }\n@import url(\"base.css\");\n@import \"print.css\" print;\n@import (css) \"forced\";",
    )];
    let css = compile_files(&files, "main.less").unwrap();
    assert_eq!(
        css,
        "@charset \"utf-8\";\n@import url(\"base.css\");\n@import \"print.css\" print;\n@import \"forced\";\n.a {\n  x: 1;\n}\n"
    );
}

#[test]
fn test_variable_in_import_path() {
    let files = [
        ("main.less", "@theme: \"dark\";\n@import \"themes/@{theme}\";\n.a { color: @fg; }"),
        ("themes/dark.less", "@fg: white;"),
    ];
    let css = compile_files(&files, "main.less").unwrap();
    assert_eq!(css, ".a {\n  color: white;\n}\n");
}

#[test]
fn test_self_import_is_a_cycle() {
    let err = compile_files(&[("main.less", "@import \"main\";")], "main.less").unwrap_err();
    assert!(matches!(err, LessError::ImportCycle { .. }));
}

#[test]
fn test_missing_import() {
    let err = compile_files(&[("main.less", "\n@import \"nope\";")], "main.less").unwrap_err();
    let LessError::ImportNotFound { position, path } = err else {
        panic!("expected import-not-found");
    };
    assert_eq!(path, "nope.less");
    assert_eq!(position.line, 2);
}

// ============================================================================
// Cache
// ============================================================================

#[test]
fn test_cache_does_not_change_output() {
    let files = [
        ("main.less", "@import \"a\";\n.m { .mixin(); }"),
        ("a.less", ".mixin() { color: red; }\n.a { x: 1; }"),
    ];
    let uncached = compile_files(&files, "main.less").unwrap();

    let cache = Arc::new(MemoryCache::new());
    let importer = files
        .iter()
        .fold(less::MemoryImporter::new(), |i, (path, contents)| i.with_file(path, contents));
    let compiler = Compiler::new(Options::default())
        .with_importer(importer)
        .with_cache(cache.clone());
    let first = compiler.compile_file("main.less").unwrap();
    assert_eq!(cache.len(), 1);
    let second = compiler.compile_file("main.less").unwrap();

    assert_eq!(first, uncached);
    assert_eq!(second, uncached);
}

// ============================================================================
// Read failures
// ============================================================================

#[test]
fn test_unreadable_import_reports_the_import_site() {
    let dir = std::env::temp_dir().join(format!("less-unreadable-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("main.less"), ".a { x: 1; }\n@import \"binary\";\n").unwrap();
    std::fs::write(dir.join("binary.less"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();

    let err = Compiler::new(Options::default())
        .compile_file(dir.join("main.less").to_str().unwrap())
        .unwrap_err();
    let LessError::Io { position, path, .. } = &err else {
        panic!("expected a read failure, got {err:?}");
    };
    assert_eq!(position.line, 2);
    assert!(position.file.ends_with("main.less"));
    assert!(path.ends_with("binary.less"));
    assert!(err.to_string().contains("binary.less"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_importer_failures_take_the_import_position() {
    struct Failing;

    impl less::Importer for Failing {
        fn resolve(
            &self,
            path: &str,
            origin: Option<&str>,
        ) -> less::Result<Option<less::ImportedFile>> {
            if origin.is_none() {
                return Ok(Some(less::ImportedFile {
                    key: path.to_string(),
                    contents: "\n\n@import \"other\";".to_string(),
                }));
            }
            Err(LessError::Io {
                position: less::Position::unknown(path),
                path: path.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            })
        }
    }

    let err = Compiler::new(Options::default())
        .with_importer(Failing)
        .compile_file("main.less")
        .unwrap_err();
    assert!(matches!(&err, LessError::Io { path, .. } if path == "other.less"));
    assert_eq!(err.position().line, 3);
    assert_eq!(&*err.position().file, "main.less");
}
