//! Demo instrument: command table, handlers and script replay.

use std::path::Path;

use scpi_core::{
    ByteStream, Keywords, NoTrace, Parameters, ParserConfig, ScpiParser, Terminator, TraceSink,
};

use crate::error::HostError;
use crate::port::{DemoPort, ScriptClock, CHANNEL_COUNT};

/// Parser type driving the demo instrument.
pub type DemoParser = ScpiParser<DemoPort>;

/// Reply to `*IDN?`.
pub const IDENTITY: &str = "SCPI-HOST,DEMO,0,0.1.0";

/// Maps a terminator name used on the command line to its bytes.
///
/// # Errors
///
/// Returns [`HostError::UnknownTerminator`] for anything but `cr`, `lf` and
/// `crlf`.
pub fn terminator_from_name(name: &str) -> Result<&'static [u8], HostError> {
    match name.to_ascii_lowercase().as_str() {
        "cr" => Ok(Terminator::CR),
        "lf" => Ok(Terminator::LF),
        "crlf" => Ok(Terminator::CRLF),
        _ => Err(HostError::UnknownTerminator(name.to_string())),
    }
}

/// Builds the demo parser with every command registered.
///
/// # Errors
///
/// Returns [`HostError::Config`] when `config` does not fit the parser.
pub fn demo_parser(config: ParserConfig<u8>) -> Result<DemoParser, HostError> {
    let mut parser = DemoParser::with_config(config)?;
    parser.register("*IDN?", identify);
    parser.register("*RST", reset);
    parser.register("SYSTem:LED", set_led);
    parser.register("SYSTem:LED?", get_led);
    parser.set_tree_base("CHANnel#");
    parser.register("VOLTage", set_voltage);
    parser.register("VOLTage?", get_voltage);
    parser.set_tree_base("");
    parser.set_error_handler(report_error);
    Ok(parser)
}

/// Feeds every queued byte of `port` through `parser`, then lets the clock
/// run past the timeout so a dangling partial message is reported.
pub fn replay(parser: &mut DemoParser, port: &mut DemoPort, clock: &ScriptClock) {
    replay_traced(parser, port, clock, &mut NoTrace);
}

/// [`replay`] reporting to `trace`.
pub fn replay_traced(
    parser: &mut DemoParser,
    port: &mut DemoPort,
    clock: &ScriptClock,
    trace: &mut dyn TraceSink,
) {
    while port.available() {
        parser.process_input_traced(port, clock, trace);
    }
    clock.advance(parser.config().timeout_ms.saturating_add(1));
    parser.process_input_traced(port, clock, trace);
}

/// Reads a byte script from disk.
///
/// # Errors
///
/// Returns [`HostError::Read`] when the file cannot be read.
pub fn load_script(path: &Path) -> Result<Vec<u8>, HostError> {
    std::fs::read(path).map_err(|source| HostError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Channel selected by the trailing digits of the first keyword, 1-based.
/// No digits selects channel 1.
fn channel_index(keywords: &Keywords<'_>) -> Option<usize> {
    let keyword = keywords.first()?;
    let digits = keyword
        .iter()
        .rev()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    let suffix = &keyword[keyword.len() - digits..];
    let channel: usize = if suffix.is_empty() {
        1
    } else {
        std::str::from_utf8(suffix).ok()?.parse().ok()?
    };
    channel.checked_sub(1).filter(|&index| index < CHANNEL_COUNT)
}

fn identify(_: &Keywords<'_>, _: &Parameters<'_>, port: &mut DemoPort) {
    port.respond(IDENTITY);
}

fn reset(_: &Keywords<'_>, _: &Parameters<'_>, port: &mut DemoPort) {
    port.reset_instrument();
}

fn set_led(_: &Keywords<'_>, parameters: &Parameters<'_>, port: &mut DemoPort) {
    let state = parameters.first().map(|value| text(value).trim().to_ascii_uppercase());
    match state.as_deref() {
        Some("1" | "ON") => port.led = true,
        Some("0" | "OFF") => port.led = false,
        _ => port.respond("ERR: expected 0, 1, ON or OFF"),
    }
}

fn get_led(_: &Keywords<'_>, _: &Parameters<'_>, port: &mut DemoPort) {
    port.respond(if port.led { "1" } else { "0" });
}

fn set_voltage(keywords: &Keywords<'_>, parameters: &Parameters<'_>, port: &mut DemoPort) {
    let Some(channel) = channel_index(keywords) else {
        port.respond("ERR: channel out of range");
        return;
    };
    match parameters.first().and_then(|value| text(value).trim().parse::<f32>().ok()) {
        Some(volts) if volts.is_finite() => port.voltages[channel] = volts,
        _ => port.respond("ERR: invalid voltage"),
    }
}

fn get_voltage(keywords: &Keywords<'_>, _: &Parameters<'_>, port: &mut DemoPort) {
    match channel_index(keywords) {
        Some(channel) => {
            let line = format!("{:.3}", port.voltages[channel]);
            port.respond(&line);
        }
        None => port.respond("ERR: channel out of range"),
    }
}

fn report_error(keywords: &Keywords<'_>, parameters: &Parameters<'_>, port: &mut DemoPort) {
    if keywords.is_empty() && parameters.is_empty() {
        port.respond("ERR: input discarded");
        return;
    }
    let command: Vec<String> = keywords.iter().map(text).collect();
    port.respond(&format!("ERR: unknown command {}", command.join(":")));
}
