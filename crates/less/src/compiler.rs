//! The compiler entry point: options, variable injection and the
//! parse/evaluate pipeline.
//!
//! ```
//! use less::{Compiler, DebugInfo, Options};
//!
//! let mut compiler = Compiler::new(Options::default());
//! compiler.set_variables([("width", "10px")]).unwrap();
//! let compiled = compiler
//!     .parse_str("@width: 1px;\n.a { width: @width * 2; }", "input.less")
//!     .unwrap();
//! assert_eq!(compiled.get_css(DebugInfo::empty()), ".a {\n  width: 20px;\n}\n");
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use crate::emitter::{DebugInfo, emit};
use crate::error::{LessError, Position, Result};
use crate::eval::evaluate;
use crate::eval::render::RenderTree;
use crate::importer::{FileSystemImporter, ImportCache, Importer, NoCache};
use crate::parser::{Expression, Stylesheet, parse_stylesheet, parse_value};

/// Compilation settings.
#[derive(Clone, Debug)]
pub struct Options {
    /// Debug annotations used by [`Compiler::compile_file`].
    pub dump_line_numbers: DebugInfo,
    /// Deepest allowed nesting of mixin calls, of imports and of variables
    /// whose values refer to other variables.
    pub max_depth: usize,
    /// Directories searched for imports after the importing file's own.
    pub import_paths: Vec<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            dump_line_numbers: DebugInfo::empty(),
            max_depth: 64,
            import_paths: Vec::new(),
        }
    }
}

/// A LESS compiler.
///
/// One compiler can compile any number of stylesheets; each compilation
/// owns its own evaluation state.
pub struct Compiler {
    options: Options,
    importer: Box<dyn Importer>,
    cache: Arc<dyn ImportCache>,
    variables: Vec<(String, Arc<Expression>)>,
}

impl Compiler {
    /// A compiler reading imports from disk, without a cache.
    pub fn new(options: Options) -> Self {
        let importer = FileSystemImporter::new(options.import_paths.clone());
        Self {
            options,
            importer: Box::new(importer),
            cache: Arc::new(NoCache),
            variables: Vec::new(),
        }
    }

    pub fn with_importer(mut self, importer: impl Importer + 'static) -> Self {
        self.importer = Box::new(importer);
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn ImportCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Bind variables in the outermost frame of every later compilation.
    ///
    /// Values are LESS source text and are parsed immediately. They override
    /// the stylesheet's own root-level declarations of the same name. A
    /// leading `@` on a name is optional.
    pub fn set_variables<I, K, V>(&mut self, variables: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in variables {
            let name = name.as_ref().trim().trim_start_matches('@').to_string();
            let expr = parse_value(value.as_ref(), &format!("<variable @{name}>"))?;
            log::debug!("injected variable @{name}");
            self.variables.retain(|(existing, _)| *existing != name);
            self.variables.push((name, Arc::new(expr)));
        }
        Ok(())
    }

    /// Compile the file at `path`.
    pub fn parse_file(&self, path: &str) -> Result<CompiledStylesheet> {
        let Some(file) = self.importer.resolve(path, None)? else {
            return Err(LessError::ImportNotFound {
                position: Position::unknown(path),
                path: path.to_string(),
            });
        };
        log::debug!("compiling {}", file.key);
        let sheet = parse_stylesheet(&file.contents, &file.key)?;
        self.evaluate(&sheet, &file.key)
    }

    /// Compile source text; `filename` is used in positions and debug
    /// annotations and as the base for relative imports.
    pub fn parse_str(&self, source: &str, filename: &str) -> Result<CompiledStylesheet> {
        let sheet = parse_stylesheet(source, filename)?;
        self.evaluate(&sheet, filename)
    }

    /// Compile the file at `path` to CSS with the configured debug annotations.
    pub fn compile_file(&self, path: &str) -> Result<String> {
        Ok(self.parse_file(path)?.get_css(self.options.dump_line_numbers))
    }

    fn evaluate(&self, sheet: &Stylesheet, key: &str) -> Result<CompiledStylesheet> {
        let tree = evaluate(
            sheet,
            key,
            &self.variables,
            &self.options,
            self.importer.as_ref(),
            self.cache.as_ref(),
        )?;
        Ok(CompiledStylesheet { tree })
    }
}

/// The result of a successful compilation.
#[derive(Clone, Debug)]
pub struct CompiledStylesheet {
    tree: RenderTree,
}

impl CompiledStylesheet {
    pub fn get_css(&self, debug: DebugInfo) -> String {
        emit(&self.tree, debug)
    }

    pub fn render_tree(&self) -> &RenderTree {
        &self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::MemoryImporter;

    fn compile(source: &str) -> Result<String> {
        Compiler::new(Options::default())
            .parse_str(source, "input.less")
            .map(|c| c.get_css(DebugInfo::empty()))
    }

    #[test]
    fn plain_css_passes_through() {
        let css = compile(".a { color: red; }").unwrap();
        assert_eq!(css, ".a {\n  color: red;\n}\n");
    }

    #[test]
    fn injected_variables_override_root_defaults() {
        let mut compiler = Compiler::new(Options::default());
        compiler.set_variables([("@color", "blue")]).unwrap();
        let css = compiler
            .parse_str("@color: red;\n.a { color: @color; }\n.b { @color: green; color: @color; }", "input.less")
            .unwrap()
            .get_css(DebugInfo::empty());
        assert_eq!(css, ".a {\n  color: blue;\n}\n.b {\n  color: green;\n}\n");
    }

    #[test]
    fn invalid_injected_value_fails_immediately() {
        let mut compiler = Compiler::new(Options::default());
        let err = compiler.set_variables([("x", "(1px")]).unwrap_err();
        assert!(matches!(err, LessError::Parse { .. }));
    }

    #[test]
    fn missing_root_file() {
        let compiler = Compiler::new(Options::default()).with_importer(MemoryImporter::new());
        let err = compiler.parse_file("nope.less").unwrap_err();
        assert!(matches!(err, LessError::ImportNotFound { .. }));
    }

    #[test]
    fn parse_file_through_importer() {
        let importer = MemoryImporter::new()
            .with_file("main.less", "@import \"vars\";\n.a { width: @w; }")
            .with_file("vars.less", "@w: 3px;");
        let compiler = Compiler::new(Options::default()).with_importer(importer);
        let css = compiler.compile_file("main.less").unwrap();
        assert_eq!(css, ".a {\n  width: 3px;\n}\n");
    }
}
