use log::{Level, LevelFilter, Metadata, Record};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

struct CliLogger {
    level: Level,
    file_path: Option<PathBuf>,
}

impl log::Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match &self.file_path {
            Some(path) => {
                if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
                    let _ = writeln!(file, "[{}] {}", record.level(), record.args());
                }
            }
            None => eprintln!("[{}] {}", record.level(), record.args()),
        }
    }

    fn flush(&self) {}
}

/// Install the logger; `verbosity` counts `-v` flags.
pub fn init_logger(verbosity: u8, file_path: Option<PathBuf>) -> Result<(), log::SetLoggerError> {
    let level = level_for(verbosity);
    log::set_boxed_logger(Box::new(CliLogger { level, file_path }))?;
    log::set_max_level(max_level(level));
    Ok(())
}

fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::Warn,
        1 => Level::Debug,
        _ => Level::Trace,
    }
}

fn max_level(level: Level) -> LevelFilter {
    level.to_level_filter()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_the_level() {
        assert_eq!(max_level(level_for(0)), LevelFilter::Warn);
        assert_eq!(max_level(level_for(1)), LevelFilter::Debug);
        assert_eq!(max_level(level_for(4)), LevelFilter::Trace);
    }

    #[test]
    fn file_logger_appends_lines() {
        let path = std::env::temp_dir().join(format!("lessc-log-{}.log", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let logger = CliLogger {
            level: Level::Debug,
            file_path: Some(path.clone()),
        };
        log::Log::log(
            &logger,
            &Record::builder()
                .level(Level::Debug)
                .args(format_args!("resolved {}", "a.less"))
                .build(),
        );
        log::Log::log(
            &logger,
            &Record::builder()
                .level(Level::Trace)
                .args(format_args!("hidden"))
                .build(),
        );
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "[DEBUG] resolved a.less\n");
        let _ = std::fs::remove_file(&path);
    }
}
