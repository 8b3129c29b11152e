use std::io::{self, Write};

use crate::InterpreterError;

/// Pretty-print an [`InterpreterError`] with caret positioning.
/// If `program` is `Some("bf")`, messages are prefixed with "bf: ...".
pub fn print_interpreter_error(program: Option<&str>, code: &str, err: &InterpreterError) {
    eprint!("{}", render_interpreter_error(program, code, err));
    let _ = io::stderr().flush();
}

/// Render the message printed by [`print_interpreter_error`].
pub fn render_interpreter_error(program: Option<&str>, code: &str, err: &InterpreterError) -> String {
    let prefix_program = |msg: &str| {
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg.to_string()
        }
    };

    match err {
        InterpreterError::InvalidProgram { ip, kind } => {
            let msg = prefix_program(&format!("Invalid program: unmatched bracket {kind}"));
            error_with_context(&msg, code, *ip)
        }
        InterpreterError::Io { ip, source } => {
            let msg = prefix_program(&format!("I/O error: {source}"));
            error_with_context(&msg, code, *ip)
        }
        InterpreterError::StepLimitExceeded { .. } | InterpreterError::Canceled => {
            format!("{}\n", prefix_program(&err.to_string()))
        }
    }
}

/// Format a concise error with instruction index and a caret context window,
/// working with UTF-8 by slicing using char indices.
fn error_with_context(prefix: &str, code: &str, pos: usize) -> String {
    // Show a short window around the position for context
    const WINDOW_CHARS: usize = 32;

    let total_chars = code.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    // Newlines in the window would break the caret alignment.
    let slice: String = code
        .chars()
        .skip(start_char)
        .take(end_char.saturating_sub(start_char))
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    let caret_offset_chars = pos.saturating_sub(start_char);
    let underline = format!("{}^", " ".repeat(caret_offset_chars));

    format!("{prefix} at instruction {pos}\n  {slice}\n  {underline}\n")
}
