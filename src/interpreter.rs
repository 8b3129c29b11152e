//! The execution engine: a program counter over the source text, a cursor
//! into the [`Tape`], and a dispatch loop over the eight instructions.

use std::io::{self, Read, Write};
use std::str::FromStr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tracing::{debug, trace};

use crate::brackets::{check_brackets, scan_backward, scan_forward, UnmatchedBracketKind};
use crate::tape::Tape;

/// Errors that can occur while interpreting a program.
#[derive(Debug, thiserror::Error)]
pub enum InterpreterError {
    /// Brackets are unbalanced. Reported before any instruction runs.
    #[error("Invalid program: unmatched bracket {kind} at instruction {ip}")]
    InvalidProgram { ip: usize, kind: UnmatchedBracketKind },

    /// The host stdin/stdout channel failed.
    #[error("I/O error at instruction {ip}: {source}")]
    Io { ip: usize, #[source] source: io::Error },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    /// Execution aborted due to cooperative cancellation (e.g., timeout)
    #[error("Execution aborted: cancelled")]
    Canceled,
}

/// What `,` does to the current cell once input is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EofBehavior {
    /// Write 0 into the current cell.
    #[default]
    Zero,
    /// Leave the current cell as it was.
    Unchanged,
}

impl FromStr for EofBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" | "0" => Ok(EofBehavior::Zero),
            "unchanged" | "keep" => Ok(EofBehavior::Unchanged),
            other => Err(format!("invalid EOF policy '{other}', must be 'zero' or 'unchanged'")),
        }
    }
}

/// Controls for cooperative cancellation and step limiting.
#[derive(Clone)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }
}

type OutputSink = Box<dyn FnMut(u8) + Send>;
type InputProvider = Box<dyn FnMut() -> io::Result<Option<u8>> + Send>;

/// A tape interpreter.
///
/// The interpreter exclusively owns its [`Tape`]. Running several programs
/// on the same interpreter keeps the tape between runs; the program counter
/// always restarts at 0.
pub struct Interpreter {
    tape: Tape,
    eof: EofBehavior,
    // Optional hooks; stdout/stdin are used when unset.
    output_sink: Option<OutputSink>,
    input_provider: Option<InputProvider>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Create an interpreter with a fresh tape.
    pub fn new() -> Self {
        Self {
            tape: Tape::new(),
            eof: EofBehavior::default(),
            output_sink: None,
            input_provider: None,
        }
    }

    /// Choose what `,` does once input is exhausted.
    pub fn with_eof_behavior(mut self, eof: EofBehavior) -> Self {
        self.eof = eof;
        self
    }

    /// Provide an output sink. When set, `.` sends the current cell to this
    /// sink instead of stdout. Both receive the same raw byte.
    pub fn set_output_sink<F>(&mut self, sink: F)
    where
        F: FnMut(u8) + Send + 'static,
    {
        self.output_sink = Some(Box::new(sink));
    }

    /// Provide an input provider. When set, `,` reads from this provider
    /// instead of stdin. Returning `Ok(None)` signals end of input; an error
    /// aborts the run with [`InterpreterError::Io`], as a failed stdin read does.
    ///
    /// The provider may block; `,` consumes exactly one unit before the next
    /// instruction executes.
    pub fn set_input_provider<F>(&mut self, provider: F)
    where
        F: FnMut() -> io::Result<Option<u8>> + Send + 'static,
    {
        self.input_provider = Some(Box::new(provider));
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Execute `program` to completion.
    ///
    /// Brackets are validated first; a malformed program returns
    /// [`InterpreterError::InvalidProgram`] without producing output or
    /// consuming input.
    pub fn run(&mut self, program: &str) -> Result<(), InterpreterError> {
        self.execute(program, false, None)
    }

    /// Debug-run the program, printing a step-by-step table of operations
    /// instead of producing I/O side effects. The tape advances exactly as it
    /// would during a real run, but:
    /// - `.` does not print the character; the action is logged instead
    /// - `,` does not read input; end of input is simulated
    pub fn run_debug(&mut self, program: &str) -> Result<(), InterpreterError> {
        self.execute(program, true, None)
    }

    /// Execute with cooperative cancellation and optional step limit.
    pub fn run_with_control(
        &mut self,
        program: &str,
        step_control: StepControl,
    ) -> Result<(), InterpreterError> {
        self.execute(program, false, Some(&step_control))
    }

    /// Debug-run with cooperative cancellation and optional step limit.
    pub fn run_debug_with_control(
        &mut self,
        program: &str,
        step_control: StepControl,
    ) -> Result<(), InterpreterError> {
        self.execute(program, true, Some(&step_control))
    }

    fn execute(
        &mut self,
        program: &str,
        debug_mode: bool,
        step_control: Option<&StepControl>,
    ) -> Result<(), InterpreterError> {
        let chars: Vec<char> = program.chars().collect();
        let code_len = chars.len();

        if let Err(err) = check_brackets(&chars) {
            debug!(%err, "program rejected");
            return Err(err);
        }
        debug!(len = code_len, debug_mode, "run starting");

        if debug_mode {
            println!("STEP | IP  | PTR | CELL | INSTR | ACTION");
            println!("-----+-----+-----+------+-------+------------------------------------------------");
        }

        let mut pc: usize = 0;
        let mut step: usize = 0;

        while pc < code_len {
            if let Some(ctrl) = step_control {
                if ctrl.cancel_flag.load(Ordering::Relaxed) {
                    debug!(step, "run cancelled");
                    return Err(InterpreterError::Canceled);
                }
                if let Some(max) = ctrl.max_steps {
                    if step >= max {
                        return Err(InterpreterError::StepLimitExceeded { limit: max });
                    }
                }
            }

            let instr = chars[pc];
            let (ptr_before, cell_before) = (self.tape.position(), self.tape.read());
            let mut action: Option<String> = if debug_mode { Some(String::new()) } else { None };

            match instr {
                '>' => {
                    self.tape.move_right();
                    if let Some(a) = action.as_mut() { *a = format!("Moved pointer head to cell {}", self.tape.position()); }
                }
                '<' => {
                    self.tape.move_left();
                    if let Some(a) = action.as_mut() { *a = format!("Moved pointer head to cell {}", self.tape.position()); }
                }
                '+' => {
                    self.tape.increment();
                    if let Some(a) = action.as_mut() { *a = format!("Increment cell[{}] from {} to {}", ptr_before, cell_before, self.tape.read()); }
                }
                '-' => {
                    self.tape.decrement();
                    if let Some(a) = action.as_mut() { *a = format!("Decrement cell[{}] from {} to {}", ptr_before, cell_before, self.tape.read()); }
                }
                '.' => {
                    let value = self.tape.read();
                    if let Some(a) = action.as_mut() {
                        *a = format!("Output byte {} (suppressed in debug)", value);
                    } else if let Some(sink) = self.output_sink.as_mut() {
                        (sink)(value);
                    } else {
                        write_stdout(value).map_err(|source| InterpreterError::Io { ip: pc, source })?;
                    }
                }
                ',' => {
                    let input = if debug_mode {
                        None
                    } else if let Some(provider) = self.input_provider.as_mut() {
                        (provider)().map_err(|source| InterpreterError::Io { ip: pc, source })?
                    } else {
                        read_stdin_byte().map_err(|source| InterpreterError::Io { ip: pc, source })?
                    };
                    match (input, self.eof) {
                        (Some(b), _) => self.tape.write(b),
                        (None, EofBehavior::Zero) => self.tape.write(0),
                        (None, EofBehavior::Unchanged) => {}
                    }
                    if let Some(a) = action.as_mut() {
                        *a = format!("Read byte -> simulated EOF (cell is {})", self.tape.read());
                    }
                }
                '[' => {
                    if self.tape.read() == 0 {
                        let close = scan_forward(&chars, pc).ok_or(InterpreterError::InvalidProgram {
                            ip: pc,
                            kind: UnmatchedBracketKind::Open,
                        })?;
                        trace!(from = pc, to = close, "skip loop");
                        if let Some(a) = action.as_mut() { *a = format!("Cell is 0; jump forward to matching ']' at IP {}", close); }
                        // Land on the matching ']' so the advance below moves just past it.
                        pc = close;
                    } else if let Some(a) = action.as_mut() {
                        *a = "Enter loop (cell != 0)".to_string();
                    }
                }
                ']' => {
                    if self.tape.read() != 0 {
                        let open = scan_backward(&chars, pc).ok_or(InterpreterError::InvalidProgram {
                            ip: pc,
                            kind: UnmatchedBracketKind::Close,
                        })?;
                        trace!(from = pc, to = open, "repeat loop");
                        if let Some(a) = action.as_mut() { *a = format!("Cell != 0; jump back to matching '[' at IP {}", open); }
                        pc = open;
                    } else if let Some(a) = action.as_mut() {
                        *a = "Exit loop (cell is 0)".to_string();
                    }
                }
                // Anything else is a comment.
                _ => {
                    if let Some(a) = action.as_mut() { *a = "Skip non-instruction".to_string(); }
                }
            }

            if debug_mode {
                println!(
                    "{:<4} | {:<3} | {:<3} | {:<4} |  {}    | {}",
                    step,
                    pc,
                    ptr_before,
                    cell_before,
                    printable(instr),
                    action.unwrap_or_default()
                );
            }

            step += 1;
            pc += 1;
        }

        debug!(steps = step, cells = self.tape.materialized_len(), "run complete");
        Ok(())
    }
}

/// Write the cell as one raw byte and flush so output shows up immediately on
/// an interactive terminal. Values below 128 are their ASCII character; a
/// multi-byte UTF-8 sequence is printed by emitting each of its bytes.
fn write_stdout(value: u8) -> io::Result<()> {
    let mut out = io::stdout().lock();
    out.write_all(&[value])?;
    out.flush()
}

/// Read exactly one byte from stdin, retrying interrupted reads.
/// `Ok(None)` on end of input.
pub fn read_stdin_byte() -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match io::stdin().read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Render control characters in the debug table without breaking its layout.
fn printable(c: char) -> char {
    if c.is_control() { '·' } else { c }
}
