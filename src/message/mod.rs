//! Inbound IRC message parsing.

mod nom_parser;
mod types;

pub use self::nom_parser::{RawParts, MAX_PARAMS};
pub use self::types::ParsedMessage;
