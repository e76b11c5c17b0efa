//! Integration tests for `--line-numbers` style debug annotations.

mod support;

use less::emitter::escape_filename_for_media_query;
use less::{Compiler, DebugInfo, Options, parse_debug_info};
use support::compile_with;

/// One rule on line 5 of `input.less`.
const SOURCE: &str = "// header\n\n@c: red;\n\n.a { color: @c; }\n";

const MEDIA_MARKER: &str =
    "@media -sass-debug-info{filename{font-family:file\\:\\/\\/input\\.less}line{font-family:\\000035}}\n";

// ============================================================================
// Modes
// ============================================================================

#[test]
fn test_none_emits_no_markers() {
    assert_eq!(compile_with(SOURCE, DebugInfo::empty()), ".a {\n  color: red;\n}\n");
}

#[test]
fn test_comment_mode() {
    assert_eq!(
        compile_with(SOURCE, DebugInfo::COMMENT),
        "/* line 5, input.less */\n.a {\n  color: red;\n}\n"
    );
}

#[test]
fn test_mediaquery_mode() {
    let css = compile_with(SOURCE, DebugInfo::MEDIA_QUERY);
    assert_eq!(css, format!("{MEDIA_MARKER}.a {{\n  color: red;\n}}\n"));
    assert!(css.contains(&escape_filename_for_media_query("input.less")));
}

#[test]
fn test_all_mode_emits_both() {
    let css = compile_with(SOURCE, DebugInfo::ALL);
    assert_eq!(
        css,
        format!("/* line 5, input.less */\n{MEDIA_MARKER}.a {{\n  color: red;\n}}\n")
    );
}

#[test]
fn test_mode_names() {
    assert_eq!(parse_debug_info("comments"), Ok(DebugInfo::COMMENT));
    assert_eq!(parse_debug_info("all"), Ok(DebugInfo::ALL));
    assert_eq!(parse_debug_info("none"), Ok(DebugInfo::empty()));
}

// ============================================================================
// Origins
// ============================================================================

#[test]
fn test_nested_rules_report_their_own_line() {
    let css = compile_with(".a {\n  x: 1;\n  .b {\n    y: 2;\n  }\n}\n", DebugInfo::COMMENT);
    assert_eq!(
        css,
        "/* line 1, input.less */\n.a {\n  x: 1;\n}\n/* line 3, input.less */\n.a .b {\n  y: 2;\n}\n"
    );
}

#[test]
fn test_markers_inside_media_are_indented() {
    let css = compile_with("@media print {\n  .a { x: 1; }\n}\n", DebugInfo::COMMENT);
    assert_eq!(
        css,
        "@media print {\n  /* line 2, input.less */\n  .a {\n    x: 1;\n  }\n}\n"
    );
}

#[test]
fn test_multi_digit_line_numbers() {
    let source = format!("{}.a {{ x: 1; }}\n", "\n".repeat(11));
    let css = compile_with(&source, DebugInfo::MEDIA_QUERY);
    assert!(css.contains("line{font-family:\\000031\\000032}"));
}

#[test]
fn test_compile_file_uses_configured_mode() {
    let importer = less::MemoryImporter::new().with_file("styles/site.less", "\n.a { x: 1; }");
    let options = Options {
        dump_line_numbers: DebugInfo::COMMENT,
        ..Options::default()
    };
    let css = Compiler::new(options)
        .with_importer(importer)
        .compile_file("styles/site.less")
        .unwrap();
    assert_eq!(css, "/* line 2, styles/site.less */\n.a {\n  x: 1;\n}\n");
}
