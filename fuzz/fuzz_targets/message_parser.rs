//! Fuzz target for IRC line parsing and dispatch
//!
//! Feeds arbitrary lines to the parser and every line that parses to the
//! dispatcher, ensuring neither panics.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_client::{CaseMapping, Dispatcher, ParsedMessage};
use std::str;

fuzz_target!(|data: &[u8]| {
    // Only fuzz valid UTF-8 strings to focus on protocol-level issues
    if let Ok(input) = str::from_utf8(data) {
        let mut dispatcher = Dispatcher::new("me", CaseMapping::Rfc1459);
        for line in input.split('\n') {
            if let Ok(msg) = ParsedMessage::parse(line) {
                let _ = dispatcher.feed(&msg);
            }
        }
    }
});
