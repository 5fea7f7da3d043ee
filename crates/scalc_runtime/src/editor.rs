//! Line editor abstraction for the REPL.
//!
//! This module provides a trait-based abstraction over line editing libraries,
//! allowing the REPL to use rustyline while remaining swappable.

use std::borrow::Cow;

use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::HistoryHinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Completer, Config, Context, Editor, Helper, Hinter, Validator as RLValidator};
use scalc_foundation::{Error, ErrorKind, Result};
use scalc_language::token::{OPERANDS, OPERATORS};

/// Result of reading a line from the editor.
#[derive(Debug)]
pub enum ReadResult {
    /// A line was successfully read.
    Line(String),
    /// User pressed Ctrl+C.
    Interrupted,
    /// User pressed Ctrl+D (EOF).
    Eof,
}

/// Abstraction over line editing functionality.
///
/// This trait allows swapping out the underlying line editor implementation
/// (e.g., from rustyline to reedline) without changing the REPL code.
pub trait LineEditor {
    /// Read a line with the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the terminal fails.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Read a continuation line (for multi-line input).
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the terminal fails.
    fn read_continuation(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Add a line to history.
    fn add_history(&mut self, line: &str);

    /// Set available completions for keywords.
    fn set_keywords(&mut self, keywords: Vec<String>);
}

/// REPL commands offered by completion.
pub const COMMANDS: &[&str] = &[
    ":help", ":set", ":regs", ":dis", ":save", ":load", ":loopmax", ":quit",
];

/// Returns the completion vocabulary: every named function, constant, and
/// register of the expression language, followed by the REPL commands.
#[must_use]
pub fn default_keywords() -> Vec<String> {
    let mut keywords: Vec<String> = OPERANDS
        .iter()
        .chain(OPERATORS)
        .map(|e| e.name)
        .filter(|name| name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '$'))
        .map(String::from)
        .collect();
    keywords.sort_unstable();
    keywords.dedup();
    keywords.extend(COMMANDS.iter().map(|c| (*c).to_string()));
    keywords
}

/// Returns true once every bracket is closed and every quote terminated.
///
/// Quoted text is raw: a backslash has no special meaning until an escape
/// builtin translates it, so `'C:\'` is a complete string.
#[must_use]
pub fn is_complete(input: &str) -> bool {
    let mut depth = 0i32;
    let mut quote = None;

    for c in input.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(' | '[' | '{') => depth += 1,
            (None, ')' | ']' | '}') => depth -= 1,
            (None, _) => {}
        }
    }

    depth <= 0 && quote.is_none()
}

/// Helper for rustyline that provides completion, hints, and validation.
#[derive(Helper, Completer, Hinter, RLValidator)]
struct ScalcHelper {
    #[rustyline(Completer)]
    completer: ScalcCompleter,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
    #[rustyline(Validator)]
    validator: BracketValidator,
}

impl Highlighter for ScalcHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Cow::Owned(format!("\x1b[1;32m{prompt}\x1b[0m"))
        } else {
            Cow::Borrowed(prompt)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[2m{hint}\x1b[0m"))
    }
}

/// Completer for function names, registers, commands, and file paths.
struct ScalcCompleter {
    file_completer: FilenameCompleter,
    keywords: Vec<String>,
}

impl ScalcCompleter {
    fn new() -> Self {
        Self {
            file_completer: FilenameCompleter::new(),
            keywords: default_keywords(),
        }
    }
}

impl Completer for ScalcCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // `:save` and `:load` take a path
        if line.starts_with(":save ") || line.starts_with(":load ") {
            return self.file_completer.complete(line, pos, ctx);
        }

        let start = line[..pos]
            .rfind(|c: char| !(c.is_ascii_alphanumeric() || c == '$' || c == ':'))
            .map_or(0, |i| i + 1);

        let word = line[start..pos].to_ascii_uppercase();
        let candidates: Vec<Pair> = self
            .keywords
            .iter()
            .filter(|kw| kw.to_ascii_uppercase().starts_with(&word))
            .map(|kw| Pair {
                display: kw.clone(),
                replacement: kw.clone(),
            })
            .collect();

        Ok((start, candidates))
    }
}

/// Validator for bracket and quote matching (enables multi-line input).
#[derive(Default)]
struct BracketValidator;

impl Validator for BracketValidator {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        if is_complete(ctx.input()) {
            Ok(ValidationResult::Valid(None))
        } else {
            Ok(ValidationResult::Incomplete)
        }
    }
}

/// Line editor implementation using rustyline.
pub struct RustylineEditor {
    editor: Editor<ScalcHelper, DefaultHistory>,
}

impl RustylineEditor {
    /// Creates a new rustyline-based editor.
    ///
    /// # Errors
    ///
    /// Returns an error if rustyline initialization fails.
    pub fn new() -> Result<Self> {
        let config = Config::builder()
            .auto_add_history(false)
            .max_history_size(1000)
            .map_err(|e| Error::new(ErrorKind::Internal(e.to_string())))?
            .build();

        let helper = ScalcHelper {
            completer: ScalcCompleter::new(),
            hinter: HistoryHinter::new(),
            validator: BracketValidator,
        };

        let mut editor = Editor::with_config(config)
            .map_err(|e| Error::new(ErrorKind::Internal(e.to_string())))?;
        editor.set_helper(Some(helper));

        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(Error::new(ErrorKind::Internal(e.to_string()))),
        }
    }

    fn read_continuation(&mut self, prompt: &str) -> Result<ReadResult> {
        self.read_line(prompt)
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }

    fn set_keywords(&mut self, keywords: Vec<String>) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.completer.keywords = keywords;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_cover_functions_and_commands() {
        let keywords = default_keywords();
        for expected in ["SQRT", "MAX", "PRINTF", "UNTIL", ":dis", ":quit"] {
            assert!(keywords.iter().any(|k| k == expected), "missing {expected}");
        }
        assert!(!keywords.iter().any(|k| k == "+"));
    }

    #[test]
    fn brackets_and_quotes_complete() {
        assert!(is_complete("A+B"));
        assert!(is_complete("MAX(A,(B))"));
        assert!(is_complete("AA[1,2]{'x','y'}"));
        assert!(is_complete("'(' + \")\""));
        assert!(is_complete(r"'C:\'"));
        assert!(is_complete(r"'a\n'+'b'"));
    }

    #[test]
    fn open_constructs_are_incomplete() {
        assert!(!is_complete("MAX(A,"));
        assert!(!is_complete("AA[1"));
        assert!(!is_complete("'unterminated"));
        assert!(!is_complete("\"open ("));
        assert!(!is_complete(r"'it\'s'"));
    }
}
