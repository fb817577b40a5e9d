#![no_main]

use std::collections::VecDeque;

use libfuzzer_sys::fuzz_target;
use scpi_core::{Keywords, Parameters, ScpiParser};

fn echo(keywords: &Keywords<'_>, parameters: &Parameters<'_>, port: &mut VecDeque<u8>) {
    let _ = keywords.get_str(0);
    let _ = parameters.last();
    port.clear();
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let mut parser = ScpiParser::<VecDeque<u8>>::new();
    parser.register("*IDN?", echo);
    parser.register("SYSTem:LED", echo);
    parser.set_tree_base("CHANnel#");
    parser.register("VOLTage?", echo);
    parser.set_error_handler(echo);

    // First byte drives the clock step between polls.
    let step = u32::from(data[0]);
    let mut now = 0_u32;
    for chunk in data[1..].chunks(7) {
        let mut port: VecDeque<u8> = chunk.iter().copied().collect();
        parser.process_input(&mut port, &|| now);
        now = now.wrapping_add(step);
    }

    parser.execute(&data[1..], &mut VecDeque::new());
    let _ = parser.debug_report().to_string();
});
