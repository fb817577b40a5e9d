//! End-to-end dispatch scenarios through the byte-stream front end.

#![allow(clippy::pedantic, clippy::nursery)]

use std::cell::Cell;
use std::collections::VecDeque;

use heapless as _;
use proptest as _;
use rstest as _;
use scpi_core::{
    ByteStream, CodeStatus, ErrorCode, Keywords, Parameters, ScpiParser, TraceEvent,
    DEFAULT_BUFFER_LENGTH,
};
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

/// Test port: queued input bytes plus a record of every handler call.
#[derive(Debug, Default)]
struct Bench {
    input: VecDeque<u8>,
    calls: Vec<Call>,
    seen_ports: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Call {
    handler: &'static str,
    keywords: Vec<String>,
    parameters: Vec<String>,
}

impl Bench {
    fn feed(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }

    fn record(&mut self, handler: &'static str, keywords: &Keywords<'_>, parameters: &Parameters<'_>) {
        let address = std::ptr::from_ref::<Self>(self) as usize;
        self.seen_ports.push(address);
        self.calls.push(Call {
            handler,
            keywords: keywords
                .iter()
                .map(|k| String::from_utf8_lossy(k).into_owned())
                .collect(),
            parameters: parameters
                .iter()
                .map(|p| String::from_utf8_lossy(p).into_owned())
                .collect(),
        });
    }

    fn handlers(&self) -> Vec<&'static str> {
        self.calls.iter().map(|call| call.handler).collect()
    }
}

impl ByteStream for Bench {
    fn available(&mut self) -> bool {
        !self.input.is_empty()
    }

    fn read_byte(&mut self) -> u8 {
        self.input.pop_front().unwrap_or_default()
    }
}

type Parser = ScpiParser<Bench>;

fn identify(k: &Keywords<'_>, p: &Parameters<'_>, bench: &mut Bench) {
    bench.record("identify", k, p);
}

fn set_led(k: &Keywords<'_>, p: &Parameters<'_>, bench: &mut Bench) {
    bench.record("set_led", k, p);
}

fn set_voltage(k: &Keywords<'_>, p: &Parameters<'_>, bench: &mut Bench) {
    bench.record("set_voltage", k, p);
}

fn get_voltage(k: &Keywords<'_>, p: &Parameters<'_>, bench: &mut Bench) {
    bench.record("get_voltage", k, p);
}

fn reset(k: &Keywords<'_>, p: &Parameters<'_>, bench: &mut Bench) {
    bench.record("reset", k, p);
}

fn measure(k: &Keywords<'_>, p: &Parameters<'_>, bench: &mut Bench) {
    bench.record("measure", k, p);
}

fn on_error(k: &Keywords<'_>, p: &Parameters<'_>, bench: &mut Bench) {
    bench.record("error", k, p);
}

fn parser() -> Parser {
    let mut parser = Parser::new();
    parser.set_error_handler(on_error);
    parser
}

fn pump(parser: &mut Parser, bench: &mut Bench, now_ms: u32) {
    while bench.available() {
        parser.process_input(bench, &|| now_ms);
    }
    parser.process_input(bench, &|| now_ms);
}

#[test]
fn s1_identify_query_dispatches_without_parameters() {
    let mut parser = parser();
    parser.register("*IDN?", identify);
    let mut bench = Bench::default();
    bench.feed(b"*IDN?\r");

    pump(&mut parser, &mut bench, 0);

    assert_eq!(bench.handlers(), vec!["identify"]);
    assert!(bench.calls[0].parameters.is_empty());
    assert_eq!(parser.last_error(), ErrorCode::NoError);
}

#[test]
fn s2_short_lowercase_command_receives_parameter() {
    let mut parser = parser();
    parser.register("SYSTem:LED", set_led);
    let mut bench = Bench::default();
    bench.feed(b"syst:led 1\r");

    pump(&mut parser, &mut bench, 0);

    assert_eq!(bench.handlers(), vec!["set_led"]);
    assert_eq!(bench.calls[0].parameters, vec!["1"]);
    assert_eq!(parser.last_error(), ErrorCode::NoError);
}

#[test]
fn s3_numeric_suffix_keyword_keeps_the_digits() {
    let mut parser = parser();
    parser.register("CHANnel#:VOLTage", set_voltage);
    let mut bench = Bench::default();
    bench.feed(b"CHAN3:VOLT 2.5\r");

    pump(&mut parser, &mut bench, 0);

    assert_eq!(bench.handlers(), vec!["set_voltage"]);
    assert_eq!(bench.calls[0].keywords[0], "CHAN3");
    assert_eq!(bench.calls[0].parameters, vec!["2.5"]);
}

#[test]
fn suffix_token_strips_digits_for_later_tokens() {
    let mut parser = parser();
    parser.register("CHANnel#", reset);
    parser.register("MEAS1", measure);
    let mut bench = Bench::default();

    parser.execute(b"MEAS1;MEAS7;meas;MEASX", &mut bench);

    assert_eq!(
        bench.handlers(),
        vec!["measure", "measure", "measure", "error"]
    );
    assert_eq!(bench.calls[1].keywords, vec!["MEAS7"]);
    assert_eq!(bench.calls[3].keywords, vec!["MEASX"]);
}

#[test]
fn s4_unknown_command_reaches_error_handler() {
    let mut parser = parser();
    parser.register("*IDN?", identify);
    let mut bench = Bench::default();
    bench.feed(b"FOO\r");

    pump(&mut parser, &mut bench, 0);

    assert_eq!(bench.handlers(), vec!["error"]);
    assert_eq!(bench.calls[0].keywords, vec!["FOO"]);
    assert_eq!(parser.last_error(), ErrorCode::UnknownCommand);
}

#[test]
fn s5_overflow_fires_on_the_buffer_length_byte() {
    let mut parser = parser();
    let mut bench = Bench::default();

    for byte in 1..=DEFAULT_BUFFER_LENGTH + 1 {
        bench.feed(b"A");
        parser.process_input(&mut bench, &|| 0_u32);
        if byte < DEFAULT_BUFFER_LENGTH {
            assert!(bench.calls.is_empty(), "no error before byte {byte}");
            assert_eq!(parser.assembler_cursor(), byte);
        } else if byte == DEFAULT_BUFFER_LENGTH {
            assert_eq!(bench.handlers(), vec!["error"]);
            assert!(bench.calls[0].keywords.is_empty());
            assert!(bench.calls[0].parameters.is_empty());
            assert_eq!(parser.last_error(), ErrorCode::BufferOverflow);
            assert_eq!(parser.assembler_cursor(), 0);
        }
    }
    assert_eq!(parser.assembler_cursor(), 1);
}

#[test]
fn s5_overflow_in_one_burst_leaves_the_rest_queued() {
    let mut parser = parser();
    let mut bench = Bench::default();
    bench.feed(&[b'A'; DEFAULT_BUFFER_LENGTH + 1]);

    parser.process_input(&mut bench, &|| 0_u32);

    assert_eq!(bench.handlers(), vec!["error"]);
    assert_eq!(parser.last_error(), ErrorCode::BufferOverflow);
    assert_eq!(parser.assembler_cursor(), 0);
    assert_eq!(bench.input.len(), 1);
}

#[test]
fn s6_stale_partial_message_times_out_and_next_byte_starts_fresh() {
    let now = Cell::new(0_u32);
    let clock = || now.get();
    let mut parser = parser();
    parser.register("*IDN?", identify);
    let mut bench = Bench::default();

    bench.feed(b"*I");
    parser.process_input(&mut bench, &clock);
    assert!(bench.calls.is_empty());

    now.set(15);
    parser.process_input(&mut bench, &clock);
    assert_eq!(bench.handlers(), vec!["error"]);
    assert_eq!(parser.last_error(), ErrorCode::Timeout);
    assert_eq!(parser.assembler_cursor(), 0);

    bench.feed(b"*IDN?\r");
    parser.process_input(&mut bench, &clock);
    assert_eq!(bench.handlers(), vec!["error", "identify"]);
    assert_eq!(bench.calls[1].keywords, vec!["*IDN?"]);
    assert_eq!(parser.last_error(), ErrorCode::NoError);
}

#[test]
fn sub_commands_run_left_to_right() {
    let mut parser = parser();
    parser.register("*RST", reset);
    parser.register("*IDN?", identify);
    parser.register("SYSTem:LED", set_led);
    let mut bench = Bench::default();
    bench.feed(b"SYST:LED 0;*IDN?;*RST\r");

    pump(&mut parser, &mut bench, 0);

    assert_eq!(bench.handlers(), vec!["set_led", "identify", "reset"]);
}

#[test]
fn unknown_sub_command_does_not_stop_the_message() {
    let mut parser = parser();
    parser.register("*RST", reset);
    let mut bench = Bench::default();
    bench.feed(b"*RST;BOGUS 1,2;*RST\r");

    pump(&mut parser, &mut bench, 0);

    assert_eq!(bench.handlers(), vec!["reset", "error", "reset"]);
    assert_eq!(bench.calls[1].parameters, vec!["1", "2"]);
    assert_eq!(parser.last_error(), ErrorCode::UnknownCommand);
}

#[test]
fn tree_base_registrations_dispatch_from_full_paths() {
    let mut parser = parser();
    parser.set_tree_base("CHANnel#");
    parser.register("VOLTage", set_voltage);
    parser.register("VOLTage?", get_voltage);
    parser.set_tree_base("");
    parser.register("*IDN?", identify);
    let mut bench = Bench::default();
    bench.feed(b"chan2:volt 1.5;CHANNEL2:VOLTAGE?;*idn?\r");

    pump(&mut parser, &mut bench, 0);

    assert_eq!(bench.handlers(), vec!["set_voltage", "get_voltage", "identify"]);
    assert_eq!(bench.calls[0].keywords, vec!["chan2", "volt"]);
}

#[test]
fn handlers_receive_the_port_passed_to_process_input() {
    let mut parser = parser();
    parser.register("*IDN?", identify);
    parser.register("*RST", reset);
    let mut bench = Bench::default();
    bench.feed(b"*IDN?;*RST\r");

    pump(&mut parser, &mut bench, 0);

    let address = std::ptr::from_ref(&bench) as usize;
    assert_eq!(bench.seen_ports, vec![address, address]);
}

#[test]
fn handlers_receive_the_port_passed_to_execute() {
    let mut parser = parser();
    parser.register("*RST", reset);
    let mut bench = Bench::default();

    parser.execute(b"*RST", &mut bench);

    let address = std::ptr::from_ref(&bench) as usize;
    assert_eq!(bench.seen_ports, vec![address]);
}

#[test]
fn token_overflow_keeps_earlier_commands_working() {
    let mut parser: ScpiParser<Bench, u8, 6, 3, 20, 64> = ScpiParser::new();
    parser.set_error_handler(on_error);
    parser.register("*RST", reset);
    parser.register("SYSTem:LED", set_led);
    parser.register("CHANnel#:VOLTage", set_voltage);
    assert!(parser.setup_errors().token_overflow);

    let report = parser.debug_report();
    assert_eq!(report.commands[2].status, CodeStatus::Invalid);

    let mut bench = Bench::default();
    parser.execute(b"*RST;SYST:LED 1", &mut bench);
    assert_eq!(bench.handlers(), vec!["reset", "set_led"]);
}

#[test]
fn command_overflow_keeps_earlier_commands_working() {
    let mut parser: ScpiParser<Bench, u8, 6, 15, 2, 64> = ScpiParser::new();
    parser.register("*RST", reset);
    parser.register("*IDN?", identify);
    parser.register("SYSTem:LED", set_led);
    assert!(parser.setup_errors().command_overflow);
    assert_eq!(parser.registry().len(), 2);

    let mut bench = Bench::default();
    parser.execute(b"*IDN?;*RST", &mut bench);
    assert_eq!(bench.handlers(), vec!["identify", "reset"]);
}

#[test]
fn too_many_parameters_are_truncated() {
    let mut parser: ScpiParser<Bench, u8, 2, 15, 20, 64> = ScpiParser::new();
    parser.register("DATA", set_voltage_narrow);
    let mut bench = Bench::default();
    parser.execute(b"DATA 1,2,3", &mut bench);
    assert_eq!(bench.calls[0].parameters, vec!["1", "2"]);
}

fn set_voltage_narrow(k: &Keywords<'_, 2>, p: &Parameters<'_, 2>, bench: &mut Bench) {
    let keywords: Keywords<'_> = k.iter().fold(Keywords::new(), |mut all, keyword| {
        all.push(keyword);
        all
    });
    let parameters: Parameters<'_> = p.iter().fold(Parameters::new(), |mut all, parameter| {
        all.push(parameter);
        all
    });
    bench.record("data", &keywords, &parameters);
}

#[test]
fn traced_processing_reports_each_stage() {
    let mut parser = parser();
    parser.register("*RST", reset);
    let mut bench = Bench::default();
    bench.feed(b"*RST;FOO\r");
    let mut trace: Vec<TraceEvent> = Vec::new();

    parser.process_input_traced(&mut bench, &|| 0_u32, &mut trace);

    assert_eq!(trace.len(), 3);
    assert_eq!(trace[0], TraceEvent::MessageAssembled { length: 8 });
    assert!(matches!(trace[1], TraceEvent::CommandDispatched { entry: 0, .. }));
    assert_eq!(
        trace[2],
        TraceEvent::ErrorRaised {
            error: ErrorCode::UnknownCommand
        }
    );
}

#[test]
fn query_and_set_forms_dispatch_independently() {
    let mut parser = parser();
    parser.register("SYSTem:LED", set_led);
    parser.register("SYSTem:LED?", identify);
    let mut bench = Bench::default();
    parser.execute(b"SYST:LED?;SYSTEM:LED 1", &mut bench);
    assert_eq!(bench.handlers(), vec!["identify", "set_led"]);
}
