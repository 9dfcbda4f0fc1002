use std::{env, fs::File, path::PathBuf};

use log::{info, LevelFilter, Log, Metadata, Record};

/// Forwards every record to each logger that accepts it.
struct Tee(Vec<env_logger::Logger>);

impl Log for Tee {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.0.iter().any(|logger| logger.enabled(metadata))
    }

    fn log(&self, record: &Record) {
        for logger in self.0.iter().filter(|l| l.enabled(record.metadata())) {
            logger.log(record);
        }
    }

    fn flush(&self) {
        for logger in &self.0 {
            logger.flush();
        }
    }
}

/// Points the user to the full log unless disarmed after a successful run.
pub struct Guard {
    file: Option<PathBuf>,
}

impl Guard {
    pub fn disarm(&mut self) {
        if let Some(file) = self.file.take() {
            info!("Full log stored in {file:?}");
        }
    }
}

impl Drop for Guard {
    fn drop(&mut self) {
        if let Some(file) = self.file.as_ref() {
            eprintln!("Full log stored in {file:?}");
        }
    }
}

fn file_logger() -> Option<(PathBuf, env_logger::Logger)> {
    let path = env::temp_dir().join("svc.log");
    let file = File::create(&path).ok()?;
    let logger = env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .build();
    Some((path, logger))
}

fn stderr_logger() -> env_logger::Logger {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .parse_default_env()
        .build()
}

/// Log warnings, or whatever `RUST_LOG` asks for, to stderr and everything to a file.
///
/// The file is skipped if it cannot be created.
pub fn init() -> anyhow::Result<Guard> {
    let mut loggers = vec![stderr_logger()];
    let file = file_logger().map(|(path, logger)| {
        loggers.push(logger);
        path
    });
    let max_level = loggers
        .iter()
        .map(|l| l.filter())
        .max()
        .unwrap_or(LevelFilter::Warn);
    log::set_boxed_logger(Box::new(Tee(loggers)))?;
    log::set_max_level(max_level);
    Ok(Guard { file })
}
