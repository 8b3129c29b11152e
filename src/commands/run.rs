use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use clap::Args;
use tape_bf::brackets::check_brackets;
use tape_bf::cli_util::print_interpreter_error;
use tape_bf::config::{FlagSettings, Settings};
use tape_bf::interpreter::read_stdin_byte;
use tape_bf::terminal::{self, wants_raw_mode, CTRL_C};
use tape_bf::{EofBehavior, Interpreter, InterpreterError, StepControl};
use tracing::{debug, warn};

use super::load_code;

/// How often the waiting thread looks at the interrupt flag.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Print a step-by-step table of operations instead of executing
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Read the program from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Concatenated program parts
    #[arg(value_name = "code", trailing_var_arg = true)]
    pub code: Vec<String>,

    /// Wall-clock timeout in milliseconds (fallback BF_TIMEOUT_MS; default none)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum interpreter steps before abort (fallback BF_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<u64>,

    /// What ',' does at end of input: zero or unchanged (fallback BF_EOF; default zero)
    #[arg(long = "eof", value_name = "POLICY")]
    pub eof: Option<EofBehavior>,

    /// Keep the terminal line buffered instead of reading single keystrokes
    #[arg(long = "no-raw")]
    pub no_raw: bool,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

/// Why the waiting thread stopped waiting.
enum Outcome {
    Finished(Result<(), InterpreterError>),
    TimedOut,
    Interrupted,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        debug,
        file,
        code,
        timeout_ms,
        max_steps,
        eof,
        no_raw,
        ..
    } = args;

    let code_str = match load_code(program, file, code) {
        Ok(s) => s,
        Err(2) => usage_and_exit(program, 2),
        Err(status) => return status,
    };

    // Resolve limits: flags -> env -> config file -> defaults
    let flags = FlagSettings { timeout_ms, max_steps, eof, no_raw };
    let settings = match Settings::load(&flags) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("{program}: {msg}");
            let _ = io::stderr().flush();
            return 2;
        }
    };
    debug!(?settings, "settings resolved");

    // A malformed program must not touch the terminal or consume input.
    let chars: Vec<char> = code_str.chars().collect();
    if let Err(err) = check_brackets(&chars) {
        print_interpreter_error(Some(program), &code_str, &err);
        return 1;
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        if let Err(e) = ctrlc::set_handler(move || interrupted.store(true, Ordering::Relaxed)) {
            warn!(error = %e, "failed to set ctrl+c handler");
        }
    }

    // Released when this function returns, whichever way the run ends.
    let raw_guard = if !debug && wants_raw_mode(&code_str, settings.raw) {
        terminal::try_acquire()
    } else {
        None
    };

    // Execute on a worker thread with cooperative cancellation
    let (tx, rx) = mpsc::channel::<Result<(), InterpreterError>>();
    let program_owned = code_str.clone();
    let cancel_clone = cancel.clone();
    let interrupted_clone = interrupted.clone();
    let raw = raw_guard.is_some();
    let eof_policy = settings.eof;
    let step_limit = settings.max_steps.map(|n| usize::try_from(n).unwrap_or(usize::MAX));

    thread::spawn(move || {
        let mut bf = Interpreter::new().with_eof_behavior(eof_policy);
        if raw {
            // Consoles without signal keys deliver Ctrl+C as a plain byte.
            bf.set_input_provider(move || match read_stdin_byte()? {
                Some(CTRL_C) => {
                    interrupted_clone.store(true, Ordering::Relaxed);
                    Ok(None)
                }
                other => Ok(other),
            });
        }
        let ctrl = StepControl::new(step_limit, cancel_clone);
        let res = if debug {
            bf.run_debug_with_control(&program_owned, ctrl)
        } else {
            bf.run_with_control(&program_owned, ctrl)
        };
        let _ = tx.send(res);
    });

    let deadline = settings.timeout_ms.map(|ms| Instant::now() + Duration::from_millis(ms));
    let outcome = wait_for(&rx, deadline, &interrupted);
    if !matches!(outcome, Outcome::Finished(_)) {
        cancel.store(true, Ordering::Relaxed);
    }
    drop(raw_guard);

    let exit_code = match outcome {
        Outcome::Finished(Ok(())) => 0,
        // The worker only sees the cancel flag when an interrupt arrived as input.
        Outcome::Finished(Err(InterpreterError::Canceled)) | Outcome::Interrupted => {
            eprintln!("Execution aborted: interrupted");
            let _ = io::stderr().flush();
            130
        }
        Outcome::Finished(Err(other)) => {
            print_interpreter_error(Some(program), &code_str, &other);
            1
        }
        Outcome::TimedOut => {
            let ms = settings.timeout_ms.unwrap_or_default();
            eprintln!("Execution aborted: wall-clock timeout exceeded ({ms} ms)");
            let _ = io::stderr().flush();
            1
        }
    };

    // For readability on a terminal, ensure output ends with a newline
    if io::stdout().is_terminal() {
        println!();
    }
    let _ = io::stdout().flush();
    exit_code
}

fn wait_for(
    rx: &mpsc::Receiver<Result<(), InterpreterError>>,
    deadline: Option<Instant>,
    interrupted: &AtomicBool,
) -> Outcome {
    loop {
        if interrupted.load(Ordering::Relaxed) {
            return Outcome::Interrupted;
        }
        let wait = match deadline {
            Some(d) => {
                let now = Instant::now();
                if now >= d {
                    return Outcome::TimedOut;
                }
                (d - now).min(POLL_INTERVAL)
            }
            None => POLL_INTERVAL,
        };
        match rx.recv_timeout(wait) {
            Ok(res) => return Outcome::Finished(res),
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Outcome::Finished(Err(InterpreterError::Canceled));
            }
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] "<code>"
  {0} run [OPTIONS] --file <PATH>

Options:
  --file,  -f <PATH>  Read the program from PATH instead of positional "<code>"
  --debug, -d         Print a step-by-step table of operations instead of executing
  --timeout <MS>      Abort after MS milliseconds (env BF_TIMEOUT_MS)
  --max-steps <N>     Abort after N instructions (env BF_MAX_STEPS)
  --eof <POLICY>      ',' at end of input: zero | unchanged (env BF_EOF)
  --no-raw            Keep the terminal line buffered (env BF_RAW=0)
  --help,  -h         Show this help

Notes:
- Input (`,`) reads a single byte from stdin; on EOF the cell is set to 0 by default.
- Characters outside of ><+-.,[] are comments.
- Settings may also come from [run] in $XDG_CONFIG_HOME/bf-tape.toml.

Examples:
- Load a program from a file:
    {0} run --file ./program.bf
- Read bytes from a file as stdin (`,` will consume file input):
    {0} run ",[.,]" < input.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
