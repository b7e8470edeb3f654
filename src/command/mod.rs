//! Outbound IRC commands and user slash commands.

mod slash;
mod types;

pub use self::slash::{SlashCommand, HELP_TEXT};
pub use self::types::OutboundCommand;
