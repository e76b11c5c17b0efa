use std::path::PathBuf;

use clap::Parser;
use less::{DebugInfo, parse_debug_info};

#[derive(Parser, Debug)]
#[command(name = "lessc")]
#[command(about = "LESS to CSS compiler")]
pub struct Cli {
    /// The .less file to compile
    pub input: String,

    /// Write CSS here instead of standard output
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Debug annotations: none, comments, mediaquery or all
    #[arg(long = "line-numbers", value_parser = parse_debug_info, default_value = "none")]
    pub line_numbers: DebugInfo,

    /// Override a variable: --global-var name=value
    #[arg(long = "global-var", value_parser = parse_assignment)]
    pub global_vars: Vec<(String, String)>,

    /// Extra directory searched for imports
    #[arg(long = "include-path")]
    pub include_paths: Vec<PathBuf>,

    /// Deepest allowed mixin and import nesting
    #[arg(long = "max-depth", default_value_t = 64)]
    pub max_depth: usize,

    /// Append log output to this file instead of standard error
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// -v for debug logging, -vv for trace logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_assignment(arg: &str) -> Result<(String, String), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{arg}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in '{arg}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let cli = Cli::parse_from([
            "lessc",
            "main.less",
            "-o",
            "out.css",
            "--line-numbers",
            "all",
            "--global-var",
            "color=red",
            "-vv",
        ]);
        assert_eq!(cli.input, "main.less");
        assert_eq!(cli.output, Some(PathBuf::from("out.css")));
        assert_eq!(cli.line_numbers, DebugInfo::ALL);
        assert_eq!(cli.global_vars, vec![("color".to_string(), "red".to_string())]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn rejects_bad_assignment() {
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
        assert_eq!(
            parse_assignment("w=1px + 2px"),
            Ok(("w".to_string(), "1px + 2px".to_string()))
        );
    }
}
