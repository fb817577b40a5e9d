//! CLI entry point for the scpi-host demo instrument.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use scpi_core::{ParserConfig, TraceEvent, TraceSink, DEFAULT_TIMEOUT_MS};
use scpi_host::error::HostError;
use scpi_host::instrument::{demo_parser, load_script, replay_traced, terminator_from_name};
use scpi_host::port::{DemoPort, ScriptClock};
#[cfg(test)]
use tempfile as _;
use thiserror as _;

const USAGE_TEXT: &str = "\
Usage: scpi-host <command> [options]

Commands:
  run <input> [-t <term>] [--timeout-ms <ms>] [--trace]  Replay a byte script through the demo instrument
  inspect [--json]                                       Print the demo command table

Options:
  -t, --terminator <term>  Message terminator: cr, lf or crlf (default: lf)
      --timeout-ms <ms>    Idle timeout for partial messages (default: 10)
      --trace              Print dispatch events to stderr
      --json               Print the command table as JSON (inspect only)
  -h, --help               Show this help message

Examples:
  scpi-host run session.txt
  scpi-host run session.txt -t crlf --trace
  scpi-host inspect --json
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run(RunArgs),
    Inspect(InspectArgs),
}

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    input: PathBuf,
    terminator: String,
    timeout_ms: u32,
    trace: bool,
}

#[derive(Debug, PartialEq, Eq)]
struct InspectArgs {
    json: bool,
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;
    let command = match first.to_string_lossy().as_ref() {
        "-h" | "--help" => return Ok(ParseResult::Help),
        "run" => Command::Run(parse_run_args(args)?),
        "inspect" => Command::Inspect(parse_inspect_args(args)?),
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(ParseResult::Command(command))
}

/// Pulls the value that follows `option`.
fn option_value(
    args: &mut impl Iterator<Item = OsString>,
    option: &str,
) -> Result<String, String> {
    args.next()
        .map(|value| value.to_string_lossy().into_owned())
        .ok_or_else(|| format!("missing value for {option}"))
}

fn parse_run_args(mut args: impl Iterator<Item = OsString>) -> Result<RunArgs, String> {
    let mut run = RunArgs {
        input: PathBuf::new(),
        terminator: "lf".to_string(),
        timeout_ms: DEFAULT_TIMEOUT_MS,
        trace: false,
    };
    let mut input = None;

    while let Some(arg) = args.next() {
        match arg.to_string_lossy().as_ref() {
            "-h" | "--help" => return Err(USAGE_TEXT.to_string()),
            "--trace" => run.trace = true,
            option @ ("-t" | "--terminator") => run.terminator = option_value(&mut args, option)?,
            option @ "--timeout-ms" => {
                let value = option_value(&mut args, option)?;
                run.timeout_ms = value
                    .parse()
                    .map_err(|_| format!("invalid timeout: {value}"))?;
            }
            flag if flag.starts_with('-') => return Err(format!("unknown option: {flag}")),
            _ if input.is_some() => return Err("multiple input paths provided".to_string()),
            _ => input = Some(PathBuf::from(&arg)),
        }
    }

    run.input = input.ok_or_else(|| "missing input path".to_string())?;
    Ok(run)
}

fn parse_inspect_args(args: impl Iterator<Item = OsString>) -> Result<InspectArgs, String> {
    let mut inspect = InspectArgs { json: false };
    for arg in args {
        match arg.to_string_lossy().as_ref() {
            "-h" | "--help" => return Err(USAGE_TEXT.to_string()),
            "--json" => inspect.json = true,
            other => return Err(format!("unexpected argument: {other}")),
        }
    }
    Ok(inspect)
}

/// Prints each trace event on its own stderr line.
struct StderrTrace;

impl TraceSink for StderrTrace {
    fn on_event(&mut self, event: TraceEvent) {
        eprintln!("trace: {event:?}");
    }
}

fn config_for(args: &RunArgs) -> Result<ParserConfig<u8>, HostError> {
    let terminator = terminator_from_name(&args.terminator)?;
    Ok(ParserConfig::default()
        .with_terminator(terminator)?
        .with_timeout_ms(args.timeout_ms))
}

fn run_script(args: &RunArgs) -> Result<(), HostError> {
    let mut parser = demo_parser(config_for(args)?)?;
    let script = load_script(&args.input)?;

    let mut port = DemoPort::new();
    port.feed(&script);
    let clock = ScriptClock::default();
    if args.trace {
        replay_traced(&mut parser, &mut port, &clock, &mut StderrTrace);
    } else {
        replay_traced(&mut parser, &mut port, &clock, &mut scpi_core::NoTrace);
    }

    print!("{}", port.output());
    Ok(())
}

fn run_inspect(args: &InspectArgs) -> Result<(), HostError> {
    let parser = demo_parser(ParserConfig::default())?;
    let report = parser.debug_report();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}

fn report(result: Result<(), HostError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error}");
            1
        }
    }
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(Command::Run(args))) => report(run_script(&args)),
        Ok(ParseResult::Command(Command::Inspect(args))) => report(run_inspect(&args)),
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}
