//! Integration tests for line parsing and formatting
//!
//! These tests verify that lines can be parsed and then formatted back to
//! lines that parse to the same command and parameters.

use slirc_client::encode::format;
use slirc_client::{MessageParseError, OutboundCommand, ParsedMessage};

fn assert_round_trip(original: &str) {
    let message: ParsedMessage = original.parse().expect("Failed to parse message");
    let serialized = format(&message.command, &message.params);

    let reparsed: ParsedMessage = serialized.parse().expect("Failed to reparse message");
    assert_eq!(message.command, reparsed.command, "line: {original}");
    assert_eq!(message.params, reparsed.params, "line: {original}");
}

#[test]
fn test_message_round_trip_simple() {
    assert_round_trip("PING :irc.example.com");
}

#[test]
fn test_message_round_trip_with_prefix() {
    let original = ":nick!user@host PRIVMSG #channel :Hello, world!";
    assert_round_trip(original);

    let message: ParsedMessage = original.parse().unwrap();
    assert_eq!(message.prefix.as_deref(), Some("nick!user@host"));
    assert_eq!(message.source_nick(), "nick");
    assert_eq!(message.raw, original);
}

#[test]
fn test_message_round_trip_numeric_response() {
    assert_round_trip(":server 001 nickname :Welcome to the IRC Network");
    assert_round_trip(":s 353 me = #x :@alice +bob carol");
    assert_round_trip(":s 366 me #x :End of /NAMES list");
}

#[test]
fn test_message_round_trip_edge_params() {
    assert_round_trip("PRIVMSG #channel :");
    assert_round_trip("PRIVMSG #channel ::-)");
    assert_round_trip("PRIVMSG #channel :  leading and trailing  ");
    assert_round_trip("TOPIC #c time:12:00");
    assert_round_trip("CMD 1 2 3 4 5 6 7 8 9 10 11 12 13 14 fifteen and more");
}

#[test]
fn test_crlf_is_stripped() {
    let message = ParsedMessage::parse(":nick!u@h PRIVMSG #test :Hello world\r\n").unwrap();
    assert_eq!(message.command, "PRIVMSG");
    assert_eq!(message.params, vec!["#test", "Hello world"]);
    assert_eq!(message.raw, ":nick!u@h PRIVMSG #test :Hello world");
}

#[test]
fn test_parse_errors() {
    assert_eq!(ParsedMessage::parse(""), Err(MessageParseError::EmptyMessage));
    assert_eq!(ParsedMessage::parse("\r\n"), Err(MessageParseError::EmptyMessage));
    assert!(matches!(
        ParsedMessage::parse(":prefix-only"),
        Err(MessageParseError::InvalidPrefix(p)) if p == "prefix-only"
    ));
    assert_eq!(
        ParsedMessage::parse(":s !!! arg"),
        Err(MessageParseError::InvalidCommand)
    );
}

#[test]
fn test_outbound_lines() {
    assert_eq!(OutboundCommand::join("test").to_string(), "JOIN #test");
    assert_eq!(OutboundCommand::join("&local").to_string(), "JOIN &local");
    assert_eq!(
        OutboundCommand::part("#test", Some("bye")).to_string(),
        "PART #test :bye"
    );
    assert_eq!(OutboundCommand::nick("newnick").to_string(), "NICK newnick");
    assert_eq!(OutboundCommand::list().to_string(), "LIST");
    assert_eq!(
        OutboundCommand::pong(&["irc.example.com"]).to_string(),
        "PONG :irc.example.com"
    );
}

#[test]
fn test_outbound_validation() {
    assert!(OutboundCommand::privmsg("#c", "fine").validate().is_ok());
    assert!(OutboundCommand::privmsg("#c", "line\r\nQUIT").validate().is_err());
    assert!(OutboundCommand::privmsg("two words", "x").validate().is_err());
    assert!(OutboundCommand::new("", ["x"]).validate().is_err());
}
