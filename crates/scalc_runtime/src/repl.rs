//! The main REPL implementation.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use scalc_foundation::{Error, ErrorKind, Result};
use scalc_language::{Outcome, Vm, compile, disassemble_compact};
use tracing::debug;

use crate::editor::{LineEditor, ReadResult, RustylineEditor, is_complete};
use crate::serialize;
use crate::session::{Register, Session};

/// What one line of input produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    /// An expression was evaluated.
    Value(Outcome),
    /// A command produced text to show.
    Output(String),
    /// A command succeeded with nothing to show.
    Silent,
    /// The user asked to leave.
    Quit,
}

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,

    /// Session state (registers, previous result, configuration).
    session: Session,

    /// The bytecode VM for evaluation.
    vm: Vm,

    /// Whether to show the welcome banner.
    show_banner: bool,

    /// Primary prompt.
    prompt: String,

    /// Continuation prompt (for multi-line input).
    continuation_prompt: String,
}

impl Repl<RustylineEditor> {
    /// Creates a new REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new() -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(editor))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a new REPL with the given editor.
    pub fn with_editor(editor: E) -> Self {
        Self {
            editor,
            session: Session::new(),
            vm: Vm::new(),
            show_banner: true,
            prompt: "calc> ".to_string(),
            continuation_prompt: "  ... ".to_string(),
        }
    }

    /// Sets the session for this REPL.
    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Disables the welcome banner.
    #[must_use]
    pub const fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Sets the primary prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Returns a reference to the session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns a mutable reference to the session.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Returns the VM, for its statistics.
    #[must_use]
    pub const fn vm(&self) -> &Vm {
        &self.vm
    }

    /// Runs the REPL loop.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails fatally.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }

        loop {
            match self.read_eval_print() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    self.print_error(&e);
                }
            }
        }

        println!("\nGoodbye!");
        Ok(())
    }

    /// Executes one read-eval-print iteration.
    ///
    /// Returns `Ok(true)` to continue, `Ok(false)` to exit.
    fn read_eval_print(&mut self) -> Result<bool> {
        let Some(input) = self.read_input()? else {
            return Ok(false); // EOF
        };

        if input.trim().is_empty() {
            return Ok(true);
        }

        self.editor.add_history(&input);

        match self.execute(&input) {
            Ok(Response::Quit) => return Ok(false),
            Ok(response) => self.print_response(&response),
            Err(e) => self.print_error(&e),
        }

        Ok(true)
    }

    /// Reads a potentially multi-line input.
    fn read_input(&mut self) -> Result<Option<String>> {
        let mut input = String::new();
        let mut first_line = true;

        loop {
            let result = if first_line {
                self.editor.read_line(&self.prompt)?
            } else {
                self.editor.read_continuation(&self.continuation_prompt)?
            };

            match result {
                ReadResult::Line(line) => {
                    if first_line {
                        input = line;
                    } else {
                        input.push_str(&line);
                    }

                    if is_complete(&input) {
                        return Ok(Some(input));
                    }

                    first_line = false;
                }
                ReadResult::Interrupted => {
                    if !first_line {
                        println!("\nInput cancelled.");
                    }
                    return Ok(Some(String::new()));
                }
                ReadResult::Eof => {
                    if first_line {
                        return Ok(None);
                    }
                    return Err(Error::new(ErrorKind::Internal(
                        "unexpected EOF in multi-line input".to_string(),
                    )));
                }
            }
        }
    }

    /// Handles one line of input: a `:` command or an expression.
    ///
    /// # Errors
    ///
    /// Returns an error if the command is malformed or the expression fails
    /// to compile or evaluate.
    pub fn execute(&mut self, input: &str) -> Result<Response> {
        let trimmed = input.trim();
        if trimmed.starts_with(':') {
            self.command(trimmed)
        } else {
            self.eval(trimmed).map(Response::Value)
        }
    }

    /// Compiles and evaluates an expression against the session registers.
    ///
    /// A successful result becomes the session's previous result.
    ///
    /// # Errors
    ///
    /// Returns an error if compilation or evaluation fails.
    pub fn eval(&mut self, input: &str) -> Result<Outcome> {
        let code = compile(input)?;
        self.vm.set_config(self.session.config().clone());
        let outcome = self.vm.evaluate(&code, &mut self.session)?;
        self.session.record(&outcome);
        Ok(outcome)
    }

    /// Dispatches a `:` command.
    fn command(&mut self, line: &str) -> Result<Response> {
        let (name, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(n, r)| (n, r.trim()));
        debug!(target: "scalc::repl", command = name, "command");

        match name {
            ":help" | ":h" => Ok(Response::Output(HELP.to_string())),
            ":quit" | ":q" | ":exit" => Ok(Response::Quit),
            ":regs" => Ok(Response::Output(self.registers_listing())),
            ":dis" => {
                let code = compile(require(rest, ":dis <expr>")?)?;
                Ok(Response::Output(disassemble_compact(&code)))
            }
            ":set" => {
                let (reg, value) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| usage(":set <reg> <value>"))?;
                let register = Register::parse(reg)
                    .ok_or_else(|| invalid(format!("unknown register '{reg}'")))?;
                self.session.assign(register, unquote(value.trim()));
                Ok(Response::Output(self.session.show(register)))
            }
            ":loopmax" => {
                let arg = require(rest, ":loopmax <n>")?;
                let limit = arg
                    .parse()
                    .map_err(|_| invalid(format!("invalid loop limit '{arg}'")))?;
                self.session.config_mut().loop_max = limit;
                Ok(Response::Silent)
            }
            ":save" => {
                let path = self.session.resolve_path(require(rest, ":save <file>")?);
                serialize::save_to_file(&self.session, &path)?;
                Ok(Response::Output(format!("saved {}", path.display())))
            }
            ":load" => {
                let path = self.session.resolve_path(require(rest, ":load <file>")?);
                let loaded = serialize::load_from_file(&path)?;
                self.session.restore(loaded);
                Ok(Response::Output(format!("loaded {}", path.display())))
            }
            other => Err(invalid(format!(
                "unknown command '{other}' (try :help)"
            ))),
        }
    }

    /// Renders every register that is not zero or empty.
    fn registers_listing(&self) -> String {
        let numbers = self
            .session
            .numbers()
            .iter()
            .enumerate()
            .filter(|(_, n)| **n != 0.0)
            .map(|(i, _)| Register::Numeric(i));
        let strings = self
            .session
            .strings()
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_empty())
            .map(|(i, _)| Register::Text(i));

        let mut lines: Vec<String> = numbers
            .chain(strings)
            .map(|r| self.session.show(r))
            .collect();
        let (val, sval) = self.session.previous();
        lines.push(format!("VAL = {val}, SVAL = \"{sval}\""));
        lines.join("\n")
    }

    /// Runs every line of a file (for CLI batch mode), returning the
    /// responses in order. Blank lines and lines starting with `#` are
    /// skipped; the first failing line stops the run.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line fails.
    pub fn eval_file(&mut self, path: &Path) -> Result<Vec<Response>> {
        let source = fs::read_to_string(path).map_err(|e| {
            Error::new(ErrorKind::IoError(format!(
                "failed to read {}: {e}",
                path.display()
            )))
        })?;

        if let Some(parent) = path.parent() {
            self.session.set_load_path(parent.to_path_buf());
        }

        let mut responses = Vec::new();
        for (number, line) in source.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let response = self.execute(line).map_err(|e| {
                Error::new(ErrorKind::Internal(format!(
                    "{}:{}: {e}",
                    path.display(),
                    number + 1
                )))
            })?;
            if response == Response::Quit {
                break;
            }
            responses.push(response);
        }
        Ok(responses)
    }

    /// Prints a response to stdout.
    #[allow(clippy::unused_self)]
    fn print_response(&self, response: &Response) {
        match response {
            Response::Value(out) => println!("\x1b[1m{}\x1b[0m", render(out)),
            Response::Output(text) => println!("{text}"),
            Response::Silent | Response::Quit => {}
        }
    }

    /// Prints an error to stderr.
    #[allow(clippy::unused_self)]
    fn print_error(&self, error: &Error) {
        eprintln!("\x1b[31mError: {error}\x1b[0m");
        if let Some(context) = &error.context {
            eprint!("{context}");
            eprintln!();
        }
    }

    /// Prints the welcome banner.
    #[allow(clippy::unused_self)]
    fn print_banner(&self) {
        println!("\x1b[1;36msCalc\x1b[0m expression calculator v{}", env!("CARGO_PKG_VERSION"));
        println!("Type expressions to evaluate, :help for commands. Use Ctrl+D to exit.\n");

        let _ = io::stdout().flush();
    }
}

/// Renders an outcome: the number, and the text when it says something else.
#[must_use]
pub fn render(out: &Outcome) -> String {
    let number = out.number.to_string();
    if out.text == number.as_str() {
        number
    } else {
        format!("{number}  \"{}\"", out.text)
    }
}

const HELP: &str = "\
Expressions use registers A..P (numeric) and AA..LL (string); VAL and SVAL
hold the previous result.

  :set <reg> <value>   Assign a register
  :regs                Show non-empty registers
  :dis <expr>          Disassemble an expression
  :loopmax <n>         Set the UNTIL iteration budget
  :save <file>         Save the session
  :load <file>         Load a saved session
  :help                Show this help
  :quit                Exit";

fn require<'a>(arg: &'a str, usage_text: &str) -> Result<&'a str> {
    if arg.is_empty() {
        Err(usage(usage_text))
    } else {
        Ok(arg)
    }
}

fn usage(text: &str) -> Error {
    invalid(format!("usage: {text}"))
}

fn invalid(message: String) -> Error {
    Error::new(ErrorKind::Internal(message))
}

/// Strips one pair of matching quotes.
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(&a), Some(&b)) if bytes.len() >= 2 && a == b && (a == b'\'' || a == b'"') => {
            &value[1..value.len() - 1]
        }
        _ => value,
    }
}
