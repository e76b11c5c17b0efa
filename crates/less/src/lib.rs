//! # LESS - a LESS to CSS compiler
//!
//! Compiles LESS stylesheets (variables, nesting, mixins, guards,
//! operations, imports) to plain CSS.
//!
//! ## Quick Start
//!
//! ```rust
//! use less::{Compiler, DebugInfo, Options};
//!
//! let source = r#"
//! @brand: #336699;
//! @gap: 12px;
//! .bordered(@width: 2px) {
//!   border: @width solid @brand;
//! }
//! .card {
//!   .bordered(4px);
//!   &-title { padding: @gap / 2; }
//! }
//! "#;
//!
//! let compiled = Compiler::new(Options::default())
//!     .parse_str(source, "card.less")
//!     .expect("valid LESS");
//! assert_eq!(
//!     compiled.get_css(DebugInfo::empty()),
//!     ".card {\n  border: 4px solid #336699;\n}\n.card-title {\n  padding: 6px;\n}\n"
//! );
//! ```
//!
//! ## Pipeline
//!
//! 1. [`lexer`]: source text to tokens
//! 2. [`parser`]: tokens to an immutable [`Stylesheet`](parser::Stylesheet)
//! 3. [`eval`]: scoping, mixins, guards, operations and imports, producing a
//!    [`RenderTree`]
//! 4. [`emitter`]: render tree to CSS text, with optional debug annotations
//!
//! Imported files are read through the [`Importer`] trait and parsed files can
//! be shared between compilations through an [`ImportCache`].
//!
//! ## Modules
//!
//! - [`compiler`]: the [`Compiler`] entry point and [`Options`]
//! - [`error`]: [`LessError`] and source [`Position`]s
//! - [`types`]: numbers with units, colors and evaluated values

pub mod compiler;
pub mod emitter;
pub mod error;
pub mod eval;
pub mod importer;
pub mod lexer;
pub mod parser;
pub mod types;

pub use compiler::{CompiledStylesheet, Compiler, Options};
pub use emitter::{DebugInfo, parse_debug_info};
pub use error::{LessError, Position, Result};
pub use eval::render::{RenderItem, RenderNode, RenderRuleset, RenderTree};
pub use importer::{
    FileSystemImporter, ImportCache, ImportedFile, Importer, MemoryCache, MemoryImporter, NoCache,
};
