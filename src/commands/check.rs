use std::io::{self, Write};

use clap::Args;
use tape_bf::brackets::check_brackets;
use tape_bf::cli_util::print_interpreter_error;

use super::load_code;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct CheckArgs {
    /// Read the program from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Concatenated program parts
    #[arg(value_name = "code", trailing_var_arg = true)]
    pub code: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: CheckArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let CheckArgs { file, code, .. } = args;
    let code_str = match load_code(program, file, code) {
        Ok(s) => s,
        Err(2) => usage_and_exit(program, 2),
        Err(status) => return status,
    };

    let chars: Vec<char> = code_str.chars().collect();
    match check_brackets(&chars) {
        Ok(()) => {
            println!("ok");
            let _ = io::stdout().flush();
            0
        }
        Err(err) => {
            print_interpreter_error(Some(program), &code_str, &err);
            1
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} check "<code>"
  {0} check --file <PATH>

Options:
  --file,  -f <PATH>  Read the program from PATH instead of positional "<code>"
  --help,  -h         Show this help

Description:
  Checks that every '[' has a matching ']' without running anything.
  Prints "ok" and exits 0 when the program is well formed, exits 1 otherwise.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
