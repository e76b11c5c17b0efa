//! Integration tests for compile errors and their positions.

mod support;

use less::LessError;
use support::compile_err;

#[test]
fn test_incompatible_units() {
    let err = compile_err(".a {\n  width: 1px + 1s;\n}");
    let LessError::UnitMismatch { position, .. } = &err else {
        panic!("expected a unit mismatch, got {err:?}");
    };
    assert_eq!(position.line, 2);
}

#[test]
fn test_undefined_variable_reports_position() {
    let err = compile_err("\n.a { color: @missing; }");
    let LessError::VariableNotFound { position, name } = &err else {
        panic!("expected an undefined variable, got {err:?}");
    };
    assert_eq!(name, "missing");
    assert_eq!(&*position.file, "input.less");
    assert_eq!(position.line, 2);
    assert!(err.to_string().starts_with("input.less:2:"));
    assert!(err.to_string().contains("@missing"));
}

#[test]
fn test_variable_scoped_to_sibling_is_not_visible() {
    let err = compile_err(".a { @x: 1; }\n.b { width: @x; }");
    assert!(matches!(err, LessError::VariableNotFound { ref name, .. } if name == "x"));
}

#[test]
fn test_recursive_variable() {
    let err = compile_err("@a: @b;\n@b: @a;\n.x { y: @a; }");
    assert!(matches!(err, LessError::RecursiveVariable { .. }));
}

#[test]
fn test_division_by_zero() {
    let err = compile_err(".a { width: (10px / 0); }");
    assert!(matches!(err, LessError::InvalidOperation { .. }));
}

#[test]
fn test_declaration_at_root() {
    let err = compile_err("color: red;");
    assert!(matches!(err, LessError::InvalidOperation { .. } | LessError::Parse { .. }));
}

#[test]
fn test_missing_closing_brace() {
    let err = compile_err(".a {\n  color: red;\n");
    assert!(matches!(err, LessError::Parse { .. }));
}

#[test]
fn test_unterminated_string() {
    let err = compile_err(".a { content: \"abc; }");
    let LessError::Lex { position, .. } = &err else {
        panic!("expected a lex error, got {err:?}");
    };
    assert_eq!(position.line, 1);
}

#[test]
fn test_errors_display_with_location() {
    let err = compile_err(".a {\n  .missing();\n}");
    assert_eq!(
        err.to_string(),
        format!("input.less:2:3: no matching definition was found for .missing: undefined")
    );
}

// ============================================================================
// Nesting limits
// ============================================================================

#[test]
fn test_deeply_nested_rulesets_fail_cleanly() {
    let source = format!("{}w: 1;{}", ".a {".repeat(300), "}".repeat(300));
    let err = compile_err(&source);
    assert!(matches!(err, LessError::RecursionLimit { .. }));
    assert_eq!(err.position().line, 1);
}

#[test]
fn test_deeply_nested_parentheses_fail_cleanly() {
    let source = format!(".a {{ w: {}1{}; }}", "(".repeat(300), ")".repeat(300));
    assert!(matches!(compile_err(&source), LessError::RecursionLimit { .. }));
}

#[test]
fn test_long_variable_chains_fail_cleanly() {
    let chain = |len: usize| {
        let mut source: String = (0..len).map(|i| format!("@v{i}: @v{};\n", i + 1)).collect();
        source.push_str(&format!("@v{len}: 1px;\n.a {{ w: @v0; }}"));
        source
    };
    let err = compile_err(&chain(300));
    assert!(matches!(err, LessError::RecursionLimit { limit: 64, .. }));

    assert_eq!(support::compile(&chain(30)), ".a {\n  w: 1px;\n}\n");
}
