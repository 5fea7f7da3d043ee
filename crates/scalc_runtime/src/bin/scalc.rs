//! sCalc CLI entry point.

use scalc_foundation::EvalConfig;
use scalc_language::{Vm, compile};
use scalc_runtime::{Repl, Response, Session, render};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    files: Vec<PathBuf>,
    expressions: Vec<String>,
    disassemble: Vec<String>,
    batch_mode: bool,
    show_help: bool,
    show_version: bool,
    trace: bool,
    loop_max: Option<u32>,
    seed: Option<u64>,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();
    let mut args = args.into_iter().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-b" | "--batch" => config.batch_mode = true,
            "--trace" => config.trace = true,
            "-e" | "--eval" => {
                let expr = args.next().ok_or("-e requires an expression")?;
                config.expressions.push(expr);
            }
            "-d" | "--disassemble" => {
                let expr = args.next().ok_or("-d requires an expression")?;
                config.disassemble.push(expr);
            }
            "--loop-max" => {
                let value = args.next().ok_or("--loop-max requires a value")?;
                config.loop_max = Some(
                    value
                        .parse()
                        .map_err(|_| format!("invalid --loop-max value: {value}"))?,
                );
            }
            "--seed" => {
                let value = args.next().ok_or("--seed requires a value")?;
                config.seed = Some(
                    value
                        .parse()
                        .map_err(|_| format!("invalid --seed value: {value}"))?,
                );
            }
            other if other.starts_with('-') => {
                return Err(format!("unknown option: {other}").into());
            }
            path => config.files.push(PathBuf::from(path)),
        }
    }

    Ok(config)
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args(args)?;

    if config.show_help {
        print_help();
        return Ok(());
    }

    if config.show_version {
        println!("scalc {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_max_level(if config.trace { Level::TRACE } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let mut eval_config = EvalConfig::new().with_trace(config.trace);
    if let Some(loop_max) = config.loop_max {
        eval_config = eval_config.with_loop_max(loop_max);
    }
    if let Some(seed) = config.seed {
        eval_config = eval_config.with_seed(seed);
    }

    for expr in &config.disassemble {
        print!("{}", compile(expr)?);
    }

    let one_shot = !config.expressions.is_empty() || !config.disassemble.is_empty();
    if one_shot && config.files.is_empty() {
        // Plain evaluation, no line editor.
        let mut vm = Vm::with_config(eval_config.clone());
        let mut session = Session::with_config(eval_config);
        for expr in &config.expressions {
            let out = vm.evaluate(&compile(expr)?, &mut session)?;
            session.record(&out);
            println!("{}", render(&out));
        }
        return Ok(());
    }

    let mut repl = Repl::new()?.with_session(Session::with_config(eval_config));

    for file in &config.files {
        for response in repl.eval_file(file)? {
            print_response(&response);
        }
    }

    for expr in &config.expressions {
        print_response(&repl.execute(expr)?);
    }

    if config.batch_mode || one_shot {
        return Ok(());
    }

    if !config.files.is_empty() {
        repl = repl.without_banner();
    }

    repl.run()?;
    Ok(())
}

fn print_response(response: &Response) {
    match response {
        Response::Value(out) => println!("{}", render(out)),
        Response::Output(text) => println!("{text}"),
        Response::Silent | Response::Quit => {}
    }
}

fn print_help() {
    println!(
        "\x1b[1mscalc\x1b[0m - String-capable expression calculator

\x1b[1mUSAGE:\x1b[0m
    scalc [OPTIONS] [FILES...]

\x1b[1mARGUMENTS:\x1b[0m
    [FILES...]    Script files to run before starting the REPL, one expression
                  or :command per line

\x1b[1mOPTIONS:\x1b[0m
    -h, --help           Print help information
    -V, --version        Print version information
    -e, --eval EXPR      Evaluate EXPR and print the result
    -d, --disassemble EXPR
                         Print the bytecode listing of EXPR
    -b, --batch          Run files and exit (no REPL)
    --loop-max N         UNTIL iteration budget per evaluation
    --seed N             Seed for RNDM and NRNDM
    --trace              Log every executed instruction to stderr

\x1b[1mEXAMPLES:\x1b[0m
    scalc                           Start interactive REPL
    scalc -e \"SQRT(2)*10\"           Evaluate one expression
    scalc -d \"A>B?A:B\"              Show the compiled bytecode
    scalc -b setup.calc             Run setup.calc and exit

\x1b[1mREPL COMMANDS:\x1b[0m
    :set <reg> <value>   Assign a register (A..P, AA..LL)
    :regs                Show non-empty registers
    :dis <expr>          Disassemble an expression
    :loopmax <n>         Set the UNTIL iteration budget
    :save <file>         Save the session
    :load <file>         Load a saved session
    :quit                Exit REPL
    Ctrl+D               Exit REPL
    Ctrl+C               Cancel current input"
    );
}
