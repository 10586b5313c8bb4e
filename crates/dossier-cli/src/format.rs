/// Shared output helpers: color detection, JSON emission and styled labels.
use std::io::{IsTerminal as _, Write};

use serde::Serialize;

use crate::error::CliError;

const ANSI_GREEN: &str = "\x1b[32m";
const ANSI_RED: &str = "\x1b[31m";
const ANSI_RESET: &str = "\x1b[0m";

/// Returns `true` if ANSI color codes should be emitted on stdout.
///
/// Disabled by `--no-color`, by a `NO_COLOR` environment variable, or when
/// stdout is not a terminal.
pub fn colors_enabled(no_color_flag: bool) -> bool {
    if no_color_flag || std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stdout().is_terminal()
}

/// Renders a granted/denied label.
pub fn verdict(granted: bool, colors: bool) -> String {
    let (text, color) = if granted {
        ("granted", ANSI_GREEN)
    } else {
        ("denied", ANSI_RED)
    };
    if colors {
        format!("{color}{text}{ANSI_RESET}")
    } else {
        text.to_owned()
    }
}

/// Writes `value` as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *w, value).map_err(std::io::Error::other)?;
    writeln!(w)
}

/// Maps a failed stdout write to a [`CliError`].
pub fn stdout_error(e: &std::io::Error) -> CliError {
    CliError::IoError {
        source: "stdout".to_owned(),
        detail: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn verdict_without_color_is_plain() {
        assert_eq!(verdict(true, false), "granted");
        assert_eq!(verdict(false, false), "denied");
        assert!(verdict(true, true).contains("\x1b[32m"));
    }

    #[test]
    fn no_color_flag_wins() {
        assert!(!colors_enabled(true));
    }

    #[test]
    fn json_ends_with_newline() {
        let mut buf = Vec::new();
        write_json(&mut buf, &serde_json::json!({"a": 1})).expect("write");
        let s = String::from_utf8(buf).expect("utf8");
        assert!(s.ends_with("}\n"), "{s}");
    }
}
