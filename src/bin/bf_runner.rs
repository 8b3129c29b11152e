use std::env;

use tape_bf::cli_util::print_interpreter_error;
use tape_bf::Interpreter;

fn print_usage_and_exit(program: &str) -> ! {
    eprintln!(
        "Usage:\n  {0} \"<code>\"   # Run a program provided as CLI arguments (they will be concatenated)\n\nNotes:\n- Input (`,`) reads a single byte from stdin; on EOF the current cell is set to 0.\n- Characters outside of ><+-.,[] are comments.\n",
        program
    );
    std::process::exit(2);
}

fn main() {
    tape_bf::logging::init_logging();

    // Collect all CLI args after the program name
    let args: Vec<String> = env::args().skip(1).collect();
    let program = env::args().next().unwrap_or_else(|| "bf_runner".to_string());

    if args.is_empty() || args[0] == "--help" || args[0] == "-h" {
        print_usage_and_exit(&program);
    }

    // Concatenate all args without spaces to form the program
    let code = args.join("");

    let mut bf = Interpreter::new();
    if let Err(err) = bf.run(&code) {
        print_interpreter_error(Some(&program), &code, &err);
        std::process::exit(1);
    }
}
