//! Integration tests for the REPL
//!
//! Drives the REPL through a scripted line editor.

use scalc_foundation::Result;
use scalc_runtime::{LineEditor, ReadResult, Repl, Response};

/// Line editor that replays a fixed script.
struct Scripted {
    lines: std::vec::IntoIter<String>,
    history: Vec<String>,
}

impl Scripted {
    fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines
                .iter()
                .map(|l| (*l).to_string())
                .collect::<Vec<_>>()
                .into_iter(),
            history: Vec::new(),
        }
    }
}

impl LineEditor for Scripted {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadResult> {
        Ok(self.lines.next().map_or(ReadResult::Eof, ReadResult::Line))
    }

    fn read_continuation(&mut self, prompt: &str) -> Result<ReadResult> {
        self.read_line(prompt)
    }

    fn add_history(&mut self, line: &str) {
        self.history.push(line.to_string());
    }

    fn set_keywords(&mut self, _keywords: Vec<String>) {}
}

fn repl() -> Repl<Scripted> {
    Repl::with_editor(Scripted::new(&[])).without_banner()
}

#[test]
fn session_flows_between_lines() {
    let mut repl = repl();
    repl.execute(":set AA 'volts'").unwrap();
    repl.execute("A:=3;A").unwrap();
    let Response::Value(out) = repl.execute("STR(A*2)+' '+AA").unwrap() else {
        panic!("expected a value");
    };
    assert_eq!(out.text, "6 volts");
    let Response::Value(out) = repl.execute("LEN(SVAL)").unwrap() else {
        panic!("expected a value");
    };
    assert_eq!(out.number, 7.0);
}

#[test]
fn failed_evaluation_keeps_previous_result() {
    let mut repl = repl();
    repl.eval("5").unwrap();
    assert!(repl.eval("1/0").is_err());
    assert_eq!(repl.eval("VAL").unwrap().number, 5.0);
}

#[test]
fn help_lists_commands() {
    let mut repl = repl();
    let Response::Output(help) = repl.execute(":help").unwrap() else {
        panic!("expected output");
    };
    for command in [":set", ":regs", ":dis", ":save", ":load", ":loopmax", ":quit"] {
        assert!(help.contains(command), "{command}");
    }
}

#[test]
fn run_survives_errors_and_stops_at_eof() {
    let editor = Scripted::new(&["1+", "B:=4;B", ":bogus", "B*B"]);
    let mut repl = Repl::with_editor(editor).without_banner();
    repl.run().unwrap();
    assert_eq!(repl.session().numbers()[1], 4.0);
    assert_eq!(repl.session().previous().0, 16.0);
}

#[test]
fn stats_count_evaluations() {
    let mut repl = repl();
    repl.eval("1").unwrap();
    repl.eval("2").unwrap();
    assert_eq!(repl.vm().stats().evaluations, 2);
}

#[test]
fn backslash_in_quotes_needs_no_continuation() {
    let editor = Scripted::new(&[r"AA:='C:\';LEN(AA)", "LEN(AA)+1"]);
    let mut repl = Repl::with_editor(editor).without_banner();
    repl.run().unwrap();
    assert_eq!(repl.session().strings()[0], r"C:\");
    assert_eq!(repl.session().previous().0, 4.0);
}
