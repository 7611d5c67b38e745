use std::fmt;

pub use crate::{bug, bug_assert};

/// Versions of `.unwrap()` and `.expect()` for states that can only be reached through a bug in
/// this crate. Errors are formatted with Display instead of Debug.
pub trait NavBug<T>: Sized {
    /// Like `.unwrap()`, but with a better error message.
    fn bug(self) -> T;
    /// Like `.expect()`, but with a better error message.
    fn bug_msg(self, msg: &str) -> T;
}

impl<T> NavBug<T> for Option<T> {
    #[track_caller]
    fn bug(self) -> T {
        match self {
            Some(val) => val,
            None => bug!("Tried to unwrap a `None` value"),
        }
    }

    #[track_caller]
    fn bug_msg(self, msg: &str) -> T {
        match self {
            Some(val) => val,
            None => bug!("{}", msg),
        }
    }
}

impl<T, E: fmt::Display> NavBug<T> for Result<T, E> {
    #[track_caller]
    fn bug(self) -> T {
        match self {
            Ok(ok) => ok,
            Err(err) => bug!("{}", err),
        }
    }

    #[track_caller]
    fn bug_msg(self, msg: &str) -> T {
        match self {
            Ok(ok) => ok,
            Err(err) => bug!("{}\n{}", msg, err),
        }
    }
}

#[doc(hidden)]
pub fn format_bug(location: String, message: String) -> String {
    let mut output = "\n*** Bug in structnav.".to_owned();
    output.push_str("\n*** Location:");
    output.push_str("\n***   ");
    output.push_str(&location);
    output.push_str("\n*** Error message:");
    for line in message.lines() {
        output.push_str("\n***   ");
        output.push_str(line);
    }
    output.push('\n');
    output
}

#[doc(hidden)]
#[macro_export]
/// Like `panic!()`, but with a better error message. Inside a `#[track_caller]` function, the
/// reported location is that function's caller.
macro_rules! bug {
    ($message:literal) => {
        $crate::bug!($message,)
    };
    ($message:literal, $( $arg:expr ),*) => {
        panic!("{}",
            $crate::util::format_bug(
                ::std::panic::Location::caller().to_string(),
                format!($message, $( $arg ),*)
            )
        )
    };
}

#[doc(hidden)]
#[macro_export]
/// Like `assert!()`, but with a better error message.
macro_rules! bug_assert {
    ($condition:expr, $message:literal) => {
        $crate::bug_assert!($condition, $message,)
    };
    ($condition:expr, $message:literal, $( $arg:expr ),*) => {
        if !$condition {
            $crate::bug!($message, $( $arg ),*)
        }
    };
}

#[cfg(test)]
mod tests {
    use super::NavBug;

    #[test]
    fn test_bug_passes_values_through() {
        assert_eq!(Some(3).bug(), 3);
        assert_eq!(Ok::<_, String>("ok").bug_msg("unreachable"), "ok");
    }

    #[test]
    fn test_bug_reports_caller_location() {
        let line = line!() + 1;
        let result = std::panic::catch_unwind(|| None::<u8>.bug());
        let message = match result.unwrap_err().downcast::<String>() {
            Ok(message) => *message,
            Err(_) => panic!("bug! should panic with a String"),
        };
        assert!(
            message.contains(&format!("bug.rs:{}:", line)),
            "Wrong location in: {}",
            message
        );
    }

    #[test]
    #[should_panic(expected = "Bug in structnav")]
    fn test_bug_on_none_panics() {
        let missing: Option<u8> = None;
        missing.bug_msg("node vanished");
    }
}
