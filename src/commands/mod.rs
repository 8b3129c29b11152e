pub mod check;
pub mod run;

use std::fs;
use std::io::{self, Write};

/// Where the program text comes from: `--file PATH` or concatenated
/// positional parts. Both at once, or neither, is a usage error (`Err(2)`);
/// an unreadable file is `Err(1)`.
pub fn load_code(program: &str, file: Option<String>, code: Vec<String>) -> Result<String, i32> {
    if file.is_none() && code.is_empty() {
        return Err(2);
    }

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        return Err(2);
    }

    match file {
        Some(path) => fs::read_to_string(&path).map_err(|e| {
            eprintln!("{program}: failed to read code file as UTF-8: {e}");
            let _ = io::stderr().flush();
            1
        }),
        None => Ok(code.join("")),
    }
}
