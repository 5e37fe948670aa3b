use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use chrono::{DateTime, Local};
use tracing_subscriber::EnvFilter;

use crate::get_create_corpus_dir;

/// Rotated `log.<timestamp>.txt` files to keep next to `log.txt`.
const KEEP_ROTATED_LOGS: usize = 5;

/// Log levels representing increasing verbosity.
///
/// Setting a level enables that level and all less verbose levels below it:
/// `Silent < Error < Warn < Info < Debug`. The default is `Info`, set with the
/// `LOG_LEVEL` environment variable or at runtime with `set_log_level()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Silent = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl Level {
    /// Parse a log level from a string (case insensitive)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "silent" => Some(Level::Silent),
            "error" => Some(Level::Error),
            "warn" => Some(Level::Warn),
            "info" => Some(Level::Info),
            "debug" => Some(Level::Debug),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Silent => "SILENT",
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false)
}

/// Renames `log.txt` to `log.<modified time>.txt` and prunes old rotations.
fn rotate_log_files(log_file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !log_file.try_exists().unwrap_or(false) {
        return Ok(());
    }

    let modified = std::fs::metadata(log_file)?.modified()?;
    let datetime: DateTime<Local> = modified.into();
    let timestamp = datetime.format("%Y-%m-%dT%H-%M-%S");

    let parent = log_file.parent().ok_or("No parent directory")?;
    std::fs::rename(log_file, parent.join(format!("log.{}.txt", timestamp)))?;

    let mut log_files: Vec<PathBuf> = std::fs::read_dir(parent)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("log.") && n.ends_with(".txt") && n != "log.txt")
                .unwrap_or(false)
        })
        .collect();

    // Timestamped names sort chronologically.
    log_files.sort();

    if log_files.len() > KEEP_ROTATED_LOGS {
        for file in &log_files[0..log_files.len() - KEEP_ROTATED_LOGS] {
            if let Err(e) = std::fs::remove_file(file) {
                eprintln!("Failed to remove old log file {:?}: {}", file, e);
            }
        }
    }

    Ok(())
}

pub struct Logger {
    log_file: PathBuf,
    disable_log: bool,
    enable_print_log: bool,
    level: Arc<Mutex<Level>>,
}

impl Logger {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let data_dir = get_create_corpus_dir()?;
        let log_file = data_dir.join("log.txt");

        let disable_log = env_flag("DISABLE_LOG");

        if !disable_log {
            if let Err(e) = rotate_log_files(&log_file) {
                eprintln!("Failed to rotate log files: {}", e);
            }
        }

        let level = std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|v| Level::from_name(&v))
            .unwrap_or(Level::Info);

        Ok(Logger {
            log_file,
            disable_log,
            enable_print_log: env_flag("ENABLE_PRINT_LOG"),
            level: Arc::new(Mutex::new(level)),
        })
    }

    fn disabled() -> Self {
        Logger {
            log_file: PathBuf::new(),
            disable_log: true,
            enable_print_log: false,
            level: Arc::new(Mutex::new(Level::Info)),
        }
    }

    pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber)?;

        Ok(())
    }

    fn write_to_file(&self, message: &str) -> Result<(), Box<dyn std::error::Error>> {
        if self.disable_log {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3fZ");
        file.write_all(format!("[{}] {}\n", timestamp, message).as_bytes())?;

        Ok(())
    }

    fn enabled(&self, level: Level) -> bool {
        self.get_level() >= level
    }

    pub fn log(&self, level: Level, msg: &str) {
        if level == Level::Silent || !self.enabled(level) {
            return;
        }

        if self.enable_print_log {
            match level {
                Level::Error => tracing::error!("{}", msg),
                Level::Warn => tracing::warn!("{}", msg),
                Level::Info => tracing::info!("{}", msg),
                Level::Debug => tracing::debug!("{}", msg),
                Level::Silent => {}
            }
        }

        if let Err(e) = self.write_to_file(&format!("{}: {}", level.as_str(), msg)) {
            eprintln!("Failed to write to log file: {}", e);
        }
    }

    /// Returns Level::Info if the lock is poisoned.
    pub fn get_level(&self) -> Level {
        self.level.lock().map(|l| *l).unwrap_or(Level::Info)
    }

    pub fn set_level(&self, new_level: Level) {
        if let Ok(mut level) = self.level.lock() {
            *level = new_level;
        }
    }
}

pub static LOGGER: OnceLock<Logger> = OnceLock::new();
static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

fn with_logger<F, R>(f: F) -> R
where
    F: FnOnce(&Logger) -> R,
{
    TRACING_INITIALIZED.get_or_init(|| {
        if let Err(e) = Logger::init_tracing() {
            eprintln!("Failed to initialize tracing: {}", e);
        }
    });

    let logger = LOGGER.get_or_init(|| match Logger::new() {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to create logger: {}", e);
            Logger::disabled()
        }
    });

    f(logger)
}

pub fn info(msg: &str) {
    with_logger(|logger| logger.log(Level::Info, msg));
}

pub fn warn(msg: &str) {
    with_logger(|logger| logger.log(Level::Warn, msg));
}

pub fn error(msg: &str) {
    with_logger(|logger| logger.log(Level::Error, msg));
}

pub fn debug(msg: &str) {
    with_logger(|logger| logger.log(Level::Debug, msg));
}

pub fn get_log_level() -> Level {
    with_logger(|logger| logger.get_level())
}

pub fn set_log_level(level: Level) {
    with_logger(|logger| logger.set_level(level));
}

/// Set the log level from a string (case insensitive). Returns false for an
/// unknown level name.
pub fn set_log_level_str(level_str: &str) -> bool {
    match Level::from_name(level_str) {
        Some(level) => {
            set_log_level(level);
            true
        }
        None => false,
    }
}

/// 00:02:13
pub fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
