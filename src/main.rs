mod cli;
mod log_init;

use std::process::ExitCode;

use clap::Parser;
use less::{Compiler, Options};

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = log_init::init_logger(cli.verbose, cli.log_file.clone()) {
        eprintln!("lessc: cannot install logger: {err}");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("lessc: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = Options {
        dump_line_numbers: cli.line_numbers,
        max_depth: cli.max_depth,
        import_paths: cli.include_paths.clone(),
    };
    let mut compiler = Compiler::new(options);
    compiler.set_variables(cli.global_vars.iter().map(|(name, value)| (name, value)))?;

    let css = compiler.compile_file(&cli.input)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, css)?;
            log::debug!("wrote {}", path.display());
        }
        None => print!("{css}"),
    }
    Ok(())
}
