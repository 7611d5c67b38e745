mod bug;
mod log;

pub use bug::{bug, bug_assert, format_bug, NavBug};
pub use log::{Log, LogEntry, LogLevel};
