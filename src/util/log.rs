use crate::util::NavBug;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock};

/// How many entries are kept in memory. Older entries are dropped first.
const MAX_ENTRIES: usize = 1000;

static LOG: OnceLock<Mutex<Log>> = OnceLock::new();

pub struct Log {
    entries: VecDeque<LogEntry>,
    log_file: Option<fs::File>,
    min_level: LogLevel,
}

pub struct LogEntry {
    level: LogLevel,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Default for LogLevel {
    fn default() -> LogLevel {
        LogLevel::Warn
    }
}

impl Log {
    fn new() -> Log {
        Log {
            entries: VecDeque::new(),
            log_file: None,
            min_level: LogLevel::default(),
        }
    }

    #[doc(hidden)]
    pub fn with_log<R>(callback: impl FnOnce(&mut Log) -> R) -> R {
        let log_mutex: &'static Mutex<Log> = LOG.get_or_init(|| Mutex::new(Log::new()));
        let mut log_guard: MutexGuard<Log> = log_mutex.lock().bug();
        callback(&mut log_guard)
    }

    /// Set the minimum level of entries to record, and optionally a file to append them to.
    pub fn configure(min_level: LogLevel, log_path: Option<&Path>) -> io::Result<()> {
        let log_file = match log_path {
            Some(path) => Some(
                fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)?,
            ),
            None => None,
        };
        Log::with_log(|log| {
            log.min_level = min_level;
            log.log_file = log_file;
        });
        Ok(())
    }

    #[doc(hidden)]
    pub fn push(&mut self, entry: LogEntry) {
        use std::io::Write;

        if entry.level < self.min_level {
            return;
        }
        if let Some(log_file) = &mut self.log_file {
            let _ = writeln!(log_file, "{}", entry);
        }
        if self.entries.len() == MAX_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn to_string() -> String {
        Log::with_log(|log| log.to_string())
    }
}

impl LogEntry {
    pub fn new(level: LogLevel, message: String) -> LogEntry {
        LogEntry { level, message }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let level = format!("[{}]", self.level);
        let msg = &self.message;
        write!(f, "{level:<7} {msg}")
    }
}

impl fmt::Display for Log {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}

#[macro_export]
macro_rules! log {
    ($level:ident, $message:literal) => {
        $crate::log!($level, $message,)
    };
    ($level:ident, $message:literal, $( $arg:expr ),*) => {
        {
            let level = $crate::LogLevel::$level;
            let message = format!($message, $( $arg ),*);
            let entry = $crate::LogEntry::new(level, message);
            $crate::Log::with_log(|log| log.push(entry));
        }
    };
}

#[test]
fn test_log_macro_records_entry() {
    crate::log!(Error, "cache holds {} trees", 7);
    assert!(Log::to_string().contains("[Error] cache holds 7 trees"));
}

#[test]
fn test_log_entry_format() {
    let entry = LogEntry::new(LogLevel::Debug, "parsed 3 nodes".to_owned());
    assert_eq!(entry.to_string(), "[Debug] parsed 3 nodes");
    assert!(LogLevel::Trace < LogLevel::Warn);
}
