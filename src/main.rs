mod commands;

use std::env;
use std::io::{self, Write};

use clap::{Parser, Subcommand};

use commands::check::CheckArgs;
use commands::run::RunArgs;

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run   [OPTIONS] "<code>"       # Run a program (args are concatenated)
  {0} run   [OPTIONS] --file <PATH>  # Run a program loaded from file
  {0} check "<code>"                 # Check brackets without running
  {0} check --file <PATH>            # Check a program loaded from file

Run "{0} <subcommand> --help" for more info.
Set RUST_LOG (e.g. RUST_LOG=tape_bf=debug) for diagnostics on stderr.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(name = "bf", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(RunArgs),
    Check(CheckArgs),
}

fn main() {
    tape_bf::logging::init_logging();

    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bf"));

    let cli = Cli::parse();

    let Some(command) = cli.command.filter(|_| !cli.help) else {
        print_top_usage_and_exit(&program, if cli.help { 0 } else { 2 });
    };

    let code = match command {
        Command::Run(args) => commands::run::run(&program, args),
        Command::Check(args) => commands::check::run(&program, args),
    };

    std::process::exit(code);
}
