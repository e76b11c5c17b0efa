//! Integration tests for `@media` bubbling and other at-rules.

mod support;

use insta::assert_snapshot;
use support::compile;

// ============================================================================
// Media
// ============================================================================

#[test]
fn test_media_inside_ruleset_bubbles_up() {
    let css = compile(".a {\n  color: red;\n  @media print {\n    color: black;\n  }\n}");
    assert_snapshot!(css, @r"
    .a {
      color: red;
    }
    @media print {
      .a {
        color: black;
      }
    }
    ");
}

#[test]
fn test_nested_media_combine_with_and() {
    let css = compile(
        r#"
@media screen {
  .a { color: red; }
  @media (min-width: 768px) {
    .a { color: blue; }
  }
}
"#,
    );
    assert_snapshot!(css, @r"
    @media screen {
      .a {
        color: red;
      }
    }
    @media screen and (min-width: 768px) {
      .a {
        color: blue;
      }
    }
    ");
}

#[test]
fn test_adjacent_media_statements_merge() {
    let css = compile("@media print { .a { x: 1; } }\n@media print { .b { y: 2; } }");
    assert_eq!(
        css,
        "@media print {\n  .a {\n    x: 1;\n  }\n  .b {\n    y: 2;\n  }\n}\n"
    );
}

#[test]
fn test_media_bubbled_from_different_rulesets_stay_apart() {
    let css = compile(".a { @media print { x: 1; } }\n.b { @media print { y: 1; } }");
    assert_eq!(
        css,
        "@media print {\n  .a {\n    x: 1;\n  }\n}\n@media print {\n  .b {\n    y: 1;\n  }\n}\n"
    );
}

#[test]
fn test_empty_ruleset_between_media_prevents_merge() {
    let css = compile("@media print { .a { x: 1; } }\n.c { }\n@media print { .b { y: 1; } }");
    assert_eq!(
        css,
        "@media print {\n  .a {\n    x: 1;\n  }\n}\n@media print {\n  .b {\n    y: 1;\n  }\n}\n"
    );
}

#[test]
fn test_separated_media_do_not_merge() {
    let css = compile(
        "@media print { .a { x: 1; } }\n.b { y: 2; }\n@media print { .c { z: 3; } }",
    );
    assert_eq!(
        css,
        "@media print {\n  .a {\n    x: 1;\n  }\n}\n.b {\n  y: 2;\n}\n@media print {\n  .c {\n    z: 3;\n  }\n}\n"
    );
}

#[test]
fn test_media_queries_from_variables() {
    let css = compile(
        "@phone: ~\"(max-width: 480px)\";\n@min: 768px;\n@media @phone { .a { x: 1; } }\n@media screen and (min-width: @min) { .b { y: 2; } }",
    );
    assert_eq!(
        css,
        "@media (max-width: 480px) {\n  .a {\n    x: 1;\n  }\n}\n@media screen and (min-width: 768px) {\n  .b {\n    y: 2;\n  }\n}\n"
    );
}

#[test]
fn test_media_features_keep_slash() {
    let css = compile("@media (min-aspect-ratio: 16/9) { .a { x: 1; } }");
    assert_eq!(css, "@media (min-aspect-ratio: 16/9) {\n  .a {\n    x: 1;\n  }\n}\n");
}

// ============================================================================
// Other at-rules
// ============================================================================

#[test]
fn test_font_face_and_keyframes() {
    let css = compile(
        r#"
@name: spin;
@font-face { font-family: "Foo"; src: url(foo.woff); }
@keyframes @{name} {
  from { transform: rotate(0deg); }
  to { transform: rotate(360deg); }
}
"#,
    );
    assert_snapshot!(css, @r#"
    @font-face {
      font-family: "Foo";
      src: url(foo.woff);
    }
    @keyframes spin {
      from {
        transform: rotate(0deg);
      }
      to {
        transform: rotate(360deg);
      }
    }
    "#);
}

#[test]
fn test_supports_inside_ruleset_keeps_selector() {
    let css = compile(".a { @supports (display: grid) { display: grid; } }");
    assert_eq!(
        css,
        "@supports (display: grid) {\n  .a {\n    display: grid;\n  }\n}\n"
    );
}

#[test]
fn test_charset_goes_first_and_statements_pass_through() {
    let css = compile(".a { x: 1; }\n@charset \"utf-8\";\n@namespace svg url(http://www.w3.org/2000/svg);");
    assert_eq!(
        css,
        "@charset \"utf-8\";\n.a {\n  x: 1;\n}\n@namespace svg url(http://www.w3.org/2000/svg);\n"
    );
}
