//! Nom-based IRC line parser.
//!
//! The prefix and command are recognised with nom combinators; parameters
//! are scanned by hand because the trailing parameter swallows the rest of
//! the line verbatim.

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, space0},
    combinator::{cut, opt},
    error::{context, VerboseError, VerboseErrorKind},
    sequence::{preceded, terminated},
    IResult,
};

use crate::error::MessageParseError;

type ParseResult<I, O> = IResult<I, O, VerboseError<I>>;

/// Maximum number of parameters in one message (RFC 1459).
pub const MAX_PARAMS: usize = 15;

/// Parse message prefix: the part after `:`, which must be followed by a space.
fn parse_prefix(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing message prefix",
        terminated(
            preceded(char(':'), take_while1(|c| c != ' ')),
            context("expecting space after prefix", cut(char(' '))),
        ),
    )(input)
}

/// Parse the command name (a word or a three-digit numeric).
fn parse_command(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing IRC command",
        take_while1(|c: char| c.is_ascii_alphanumeric()),
    )(input)
}

/// Split the parameter section into middle params and the trailing param.
fn split_params(mut rest: &str) -> Vec<&str> {
    let mut params = Vec::new();

    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }

        if params.len() == MAX_PARAMS - 1 || rest.starts_with(':') {
            // Everything that remains is the final parameter.
            params.push(rest.strip_prefix(':').unwrap_or(rest));
            break;
        }

        let end = rest.find(' ').unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    params
}

/// Borrowed components of one IRC line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParts<'a> {
    /// Prefix without the leading `:`, if present.
    pub prefix: Option<&'a str>,
    /// The command word or numeric.
    pub command: &'a str,
    /// Parameters, the trailing one with its colon removed.
    pub params: Vec<&'a str>,
}

/// Parse a complete IRC line into its components.
///
/// IRC message format:
/// ```text
/// [:prefix] <command> [params...] [:trailing]
/// ```
pub fn parse_line(input: &str) -> ParseResult<&str, RawParts<'_>> {
    let (input, _) = space0::<_, VerboseError<&str>>(input)?;
    let (input, prefix) = context("parsing optional prefix", opt(parse_prefix))(input)?;
    let (input, _) = space0::<_, VerboseError<&str>>(input)?;
    let (input, command) = context("parsing required command", parse_command)(input)?;

    // The command must end at a space or the end of the line.
    if !(input.is_empty() || input.starts_with(' ')) {
        return Err(nom::Err::Error(VerboseError {
            errors: vec![(input, VerboseErrorKind::Context("parsing IRC command"))],
        }));
    }

    let params = split_params(input);
    Ok(("", RawParts { prefix, command, params }))
}

impl<'a> RawParts<'a> {
    /// Parse a line with its terminator already stripped.
    pub fn parse(input: &'a str) -> Result<Self, MessageParseError> {
        if input.trim_start_matches(' ').is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        match parse_line(input) {
            Ok((_, parts)) => Ok(parts),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(describe(input, &e)),
            Err(nom::Err::Incomplete(_)) => Err(MessageParseError::ParseContext {
                position: input.len(),
                context: "incomplete input".to_string(),
            }),
        }
    }
}

/// Turn a nom error trace into the most specific [`MessageParseError`].
fn describe(input: &str, e: &VerboseError<&str>) -> MessageParseError {
    let mut position = input.len();
    let mut innermost = None;

    for (error_input, kind) in &e.errors {
        position = position.min(input.len() - error_input.len());
        if let VerboseErrorKind::Context(ctx) = kind {
            innermost.get_or_insert(*ctx);
        }
    }

    match innermost {
        Some("parsing message prefix") | Some("expecting space after prefix") => {
            let prefix = input
                .trim_start_matches(' ')
                .trim_start_matches(':')
                .split(' ')
                .next()
                .unwrap_or_default();
            MessageParseError::InvalidPrefix(prefix.to_string())
        }
        Some("parsing IRC command") | Some("parsing required command") => {
            MessageParseError::InvalidCommand
        }
        Some(ctx) => MessageParseError::ParseContext {
            position,
            context: ctx.to_string(),
        },
        None => MessageParseError::ParseContext {
            position,
            context: "unrecognised input".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_command() {
        let msg = RawParts::parse("PING").unwrap();
        assert_eq!(msg.command, "PING");
        assert!(msg.prefix.is_none());
        assert!(msg.params.is_empty());
    }

    #[test]
    fn test_parse_with_prefix() {
        let msg = RawParts::parse(":nick!user@host PRIVMSG #channel :Hello world").unwrap();
        assert_eq!(msg.prefix, Some("nick!user@host"));
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.params, vec!["#channel", "Hello world"]);
    }

    #[test]
    fn test_parse_multiple_params() {
        let msg = RawParts::parse("USER guest 0 * :Real Name").unwrap();
        assert_eq!(msg.params, vec!["guest", "0", "*", "Real Name"]);
    }

    #[test]
    fn test_parse_trailing_keeps_colons_and_spaces() {
        let msg = RawParts::parse("PRIVMSG #c :a :b  c ").unwrap();
        assert_eq!(msg.params, vec!["#c", "a :b  c "]);
    }

    #[test]
    fn test_parse_empty_trailing() {
        let msg = RawParts::parse("PRIVMSG #channel :").unwrap();
        assert_eq!(msg.params, vec!["#channel", ""]);
    }

    #[test]
    fn test_parse_collapses_space_runs() {
        let msg = RawParts::parse("MODE  #c   +o   nick").unwrap();
        assert_eq!(msg.params, vec!["#c", "+o", "nick"]);
    }

    #[test]
    fn test_parse_fifteenth_param_takes_rest() {
        let line = "CMD 1 2 3 4 5 6 7 8 9 10 11 12 13 14 fifteen and more";
        let msg = RawParts::parse(line).unwrap();
        assert_eq!(msg.params.len(), MAX_PARAMS);
        assert_eq!(msg.params[14], "fifteen and more");
    }

    #[test]
    fn test_prefix_without_space_is_rejected() {
        assert_eq!(
            RawParts::parse(":irc.example.com"),
            Err(MessageParseError::InvalidPrefix("irc.example.com".to_string()))
        );
    }

    #[test]
    fn test_bad_command_is_rejected() {
        assert_eq!(
            RawParts::parse(":nick PRIV$MSG #c"),
            Err(MessageParseError::InvalidCommand)
        );
        assert_eq!(RawParts::parse(":nick  "), Err(MessageParseError::InvalidCommand));
    }

    #[test]
    fn test_empty_is_rejected() {
        assert_eq!(RawParts::parse(""), Err(MessageParseError::EmptyMessage));
        assert_eq!(RawParts::parse("   "), Err(MessageParseError::EmptyMessage));
    }
}
