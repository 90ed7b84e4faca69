//! Asynchronous logging system for the tubefetch application
//!
//! This module provides a non-blocking logging system that writes log
//! messages to a file without impacting the UI thread. The logger is also
//! installed as the `log` crate's global backend so `log::` macros used
//! anywhere in the crate end up in the same file.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::mpsc;
use std::sync::Mutex;

/// Asynchronous logger that writes to file without blocking the main thread
pub struct AsyncLogger {
    sender: mpsc::Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<()>>,
}

/// Types of log messages that can be sent to the logger
#[derive(Clone)]
pub enum LogMessage {
    Info(String),
    Warn(String),
    Error(String),
    Debug(String),
    Shutdown,
}

impl AsyncLogger {
    /// Create a new async logger that writes to the platform log file
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let (tx, rx) = mpsc::channel();

        let log_path = {
            #[cfg(windows)]
            {
                let exe_path = std::env::current_exe()?;
                let exe_dir = exe_path
                    .parent()
                    .ok_or("Failed to get executable directory")?;
                exe_dir.join("tubefetch_log.txt")
            }

            #[cfg(not(windows))]
            {
                // XDG cache directory, with a home-directory fallback
                if let Ok(xdg_dirs) = xdg::BaseDirectories::new() {
                    let cache_dir = xdg_dirs.get_cache_home();
                    let app_dir = cache_dir.join("tubefetch");
                    std::fs::create_dir_all(&app_dir)?;
                    app_dir.join("tubefetch.log")
                } else {
                    let home_dir = dirs::home_dir().ok_or("Failed to get home directory")?;
                    let app_dir = home_dir.join(".tubefetch");
                    std::fs::create_dir_all(&app_dir)?;
                    app_dir.join("tubefetch.log")
                }
            }
        };

        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let handle = std::thread::spawn(move || {
            let mut file = std::io::BufWriter::new(log_file);
            let mut buffer = VecDeque::new();

            // Block for the first message, then drain whatever else is
            // queued so entries are written in batches.
            while let Ok(first) = rx.recv() {
                buffer.push_back(first);
                while let Ok(next) = rx.try_recv() {
                    buffer.push_back(next);
                }

                let mut shutdown = false;
                for msg in buffer.drain(..) {
                    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
                    let entry = match msg {
                        LogMessage::Info(msg) => format!("[INFO  {}] {}", timestamp, msg),
                        LogMessage::Warn(msg) => format!("[WARN  {}] {}", timestamp, msg),
                        LogMessage::Error(msg) => format!("[ERROR {}] {}", timestamp, msg),
                        LogMessage::Debug(msg) => format!("[DEBUG {}] {}", timestamp, msg),
                        LogMessage::Shutdown => {
                            shutdown = true;
                            break;
                        }
                    };
                    let _ = writeln!(file, "{}", entry);
                }
                let _ = file.flush();

                if shutdown {
                    return;
                }
            }
        });

        Ok(AsyncLogger {
            sender: tx,
            handle: Some(handle),
        })
    }

    /// Send a log message to the async logger
    pub fn log(&self, level: &str, message: &str) {
        let msg = match level {
            "INFO" => LogMessage::Info(message.to_string()),
            "WARN" => LogMessage::Warn(message.to_string()),
            "ERROR" => LogMessage::Error(message.to_string()),
            "DEBUG" | "TRACE" => LogMessage::Debug(message.to_string()),
            _ => LogMessage::Info(message.to_string()),
        };

        // Non-blocking send; a closed channel just drops the message
        let _ = self.sender.send(msg);
    }

    /// Gracefully shutdown the logger
    pub fn shutdown(self) {
        let _ = self.sender.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle {
            let _ = handle.join();
        }
    }
}

// Global logger instance
pub(crate) static LOGGER: Mutex<Option<AsyncLogger>> = Mutex::new(None);

/// Bridge routing the `log` crate's macros into the async logger
struct FacadeBridge;

impl log::Log for FacadeBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Debug
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            log_message(record.level().as_str(), &record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static FACADE_BRIDGE: FacadeBridge = FacadeBridge;

/// Initialize the global logging system
pub fn setup_logging() -> Result<(), Box<dyn std::error::Error>> {
    let logger = AsyncLogger::new()?;
    {
        let mut guard = LOGGER
            .lock()
            .map_err(|e| format!("Failed to lock logger: {}", e))?;
        *guard = Some(logger);
    }
    if log::set_logger(&FACADE_BRIDGE).is_ok() {
        log::set_max_level(log::LevelFilter::Debug);
    }
    Ok(())
}

/// Send a message to the global logger
pub fn log_message(level: &str, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = &*guard {
            logger.log(level, message);
        }
    }
}

// Custom log macros
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::logging::log_message("INFO", &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::logging::log_message("WARN", &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::logging::log_message("ERROR", &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::logging::log_message("DEBUG", &format!($($arg)*));
    };
}
