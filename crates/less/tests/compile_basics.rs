//! Integration tests for variables, scoping, operations and plain CSS output.

mod support;

use insta::assert_snapshot;
use less::{Compiler, DebugInfo, Options};
use support::compile;

// ============================================================================
// Variables and scoping
// ============================================================================

#[test]
fn test_inner_declaration_shadows_outer() {
    let css = compile(
        r#"
@x: 1;
.a { @x: 2; width: @x; }
.b { width: @x; }
"#,
    );
    assert_eq!(css, ".a {\n  width: 2;\n}\n.b {\n  width: 1;\n}\n");
}

#[test]
fn test_variables_are_lazy() {
    let css = compile(".a { width: @w; }\n@w: 10px;");
    assert_eq!(css, ".a {\n  width: 10px;\n}\n");
}

#[test]
fn test_last_declaration_in_a_frame_wins() {
    let css = compile("@c: red;\n.a { color: @c; }\n@c: blue;");
    assert_eq!(css, ".a {\n  color: blue;\n}\n");
}

#[test]
fn test_variable_refers_to_later_variable() {
    let css = compile("@a: @b;\n@b: 3px;\n.x { margin: @a; }");
    assert_eq!(css, ".x {\n  margin: 3px;\n}\n");
}

#[test]
fn test_variable_variables() {
    let css = compile("@primary: green;\n@name: \"primary\";\n.a { color: @@name; }");
    assert_eq!(css, ".a {\n  color: green;\n}\n");
}

#[test]
fn test_interpolation_in_selectors_properties_and_strings() {
    let css = compile(
        r#"
@name: banner;
@prop: color;
.@{name} {
  @{prop}: red;
  background-@{prop}: blue;
  background-image: url("images/@{name}.png");
}
"#,
    );
    assert_snapshot!(css, @r#"
    .banner {
      color: red;
      background-color: blue;
      background-image: url("images/banner.png");
    }
    "#);
}

#[test]
fn test_escaped_strings_lose_quotes() {
    let css = compile(".a { filter: ~\"ms:alwaysHasItsOwnSyntax.For.Stuff()\"; }");
    assert_eq!(
        css,
        ".a {\n  filter: ms:alwaysHasItsOwnSyntax.For.Stuff();\n}\n"
    );
}

// ============================================================================
// Operations
// ============================================================================

#[test]
fn test_unit_arithmetic() {
    let css = compile(".a { width: 2px + 3px; height: 2px + 3; margin: (10px / 2) 4px * 2; }");
    assert_eq!(
        css,
        ".a {\n  width: 5px;\n  height: 5px;\n  margin: 5px 8px;\n}\n"
    );
}

#[test]
fn test_convertible_units_use_left_operand() {
    let css = compile(".a { width: 1cm + 10mm; transition-delay: 1s + 500ms; }");
    assert_eq!(css, ".a {\n  width: 2cm;\n  transition-delay: 1.5s;\n}\n");
}

#[test]
fn test_spaced_minus_starts_a_new_value() {
    let css = compile("@x: 5px;\n.a { margin: 10px -@x; padding: 10px - @x; }");
    assert_eq!(css, ".a {\n  margin: 10px -5px;\n  padding: 5px;\n}\n");
}

#[test]
fn test_font_shorthand_keeps_slash() {
    let css = compile(".a { font: 12px/1.5 Arial, sans-serif; line-height: 12px/2; }");
    assert_eq!(
        css,
        ".a {\n  font: 12px/1.5 Arial, sans-serif;\n  line-height: 6px;\n}\n"
    );
}

#[test]
fn test_color_arithmetic() {
    let css = compile(".a { color: #111 * 3; background: #f00 + #0f0; }");
    assert_eq!(css, ".a {\n  color: #333333;\n  background: #ffff00;\n}\n");
}

#[test]
fn test_literals_keep_their_spelling() {
    let css = compile(".a { width: .50em; color: #FFF; margin: 0.0px; }");
    assert_eq!(css, ".a {\n  width: .50em;\n  color: #FFF;\n  margin: 0.0px;\n}\n");
}

#[test]
fn test_calc_arguments_are_not_evaluated() {
    let css = compile("@w: 10px;\n.a { width: calc(100% - @w); height: ~\"calc(100% - @{w})\"; }");
    assert_eq!(
        css,
        ".a {\n  width: calc(100% - 10px);\n  height: calc(100% - 10px);\n}\n"
    );
}

// ============================================================================
// Nesting and plain CSS
// ============================================================================

#[test]
fn test_nested_rulesets_flatten_after_parent() {
    let css = compile(
        r#"
.nav {
  color: black;
  > li { display: inline; }
  a {
    color: blue;
    &:hover { color: red; }
  }
  &-item { padding: 0; }
}
"#,
    );
    assert_snapshot!(css, @r"
    .nav {
      color: black;
    }
    .nav > li {
      display: inline;
    }
    .nav a {
      color: blue;
    }
    .nav a:hover {
      color: red;
    }
    .nav-item {
      padding: 0;
    }
    ");
}

#[test]
fn test_selector_lists_multiply() {
    let css = compile(".a, .b {\n  .c, .d { x: 1; }\n}");
    assert_eq!(css, ".a .c,\n.b .c,\n.a .d,\n.b .d {\n  x: 1;\n}\n");
}

#[test]
fn test_comments_and_important() {
    let css = compile(
        "/* header */\n.a {\n  /* inner */\n  color: red !important; // dropped\n}\n",
    );
    assert_eq!(
        css,
        "/* header */\n.a {\n  /* inner */\n  color: red !important;\n}\n"
    );
}

#[test]
fn test_empty_rulesets_are_omitted() {
    assert_eq!(compile(".a { }\n.b { .c { } }"), "");
}

// ============================================================================
// Idempotence and determinism
// ============================================================================

const PLAIN_CSS: &str = r#"@charset "utf-8";
/* plain css */
.a,
.b > .c {
  margin: 0 auto;
  font-family: "Helvetica Neue", Arial, sans-serif;
  border: 1px solid #ccc;
  transition: opacity .3s ease;
  filter: alpha(opacity=50);
}
a:hover {
  color: rgba(255, 0, 0, 0.5) !important;
}
@media screen and (min-width: 768px) {
  .a {
    font: 12px/1.5 Arial;
  }
}
@font-face {
  font-family: "Foo";
  src: url(foo.woff);
}
"#;

#[test]
fn test_plain_css_is_a_fixed_point() {
    let once = compile(PLAIN_CSS);
    assert_eq!(once, PLAIN_CSS);
    assert_eq!(compile(&once), once);
}

#[test]
fn test_compilation_is_deterministic() {
    let source = r#"
@base: 10px;
.m(@n) when (@n > 0) { .w-@{n} { width: @base * @n; } .m(@n - 1); }
.m(0) {}
.m(3);
@media print { .a { color: black; } }
"#;
    let mut compiler = Compiler::new(Options::default());
    compiler.set_variables([("base", "4px")]).unwrap();
    let first = compiler
        .parse_str(source, "input.less")
        .unwrap()
        .get_css(DebugInfo::ALL);
    let second = compiler
        .parse_str(source, "input.less")
        .unwrap()
        .get_css(DebugInfo::ALL);
    assert_eq!(first, second);
    assert!(first.contains("width: 12px;"));
}
