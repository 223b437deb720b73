use std::sync::Arc;

use herald_common::event::MessageEvent;

use super::error::{ParseError, PreParseError};
use crate::command::registry::CommandRegistry;
use crate::command::Command;

pub struct ParseResult {
    pub command: Arc<Command>,
    /// The name or alias the caller typed.
    pub invoked_name: String,
    /// Trimmed argument text, with any subcommand literal already stripped.
    pub args: String,
    pub calling_prefix: String,
}

/// Parse a message event into a command.
///
/// This takes all steps necessary to split a message into critical command
/// components; if at any point the parse fails the message produces no
/// action. The steps are:
///
/// **Step 1**: Drop messages authored by bots or webhooks.
///
/// **Step 2**: Check that the message starts with one of the configured
/// prefixes, tried in configured order (not longest-first). No prefix means
/// the message is simply not a command.
///
/// **Step 3**: The first whitespace-delimited token after the prefix is the
/// command name; look it up by name or alias. A miss carries the token out
/// so the caller can run the suggestion flow.
///
/// **Step 4**: If the remaining text starts with the literal name of one of
/// the command's immediate subcommands (at a word boundary), descend into it
/// and strip the literal. At most one level is walked per dispatch.
///
/// Metadata (usability, cooldowns) is deliberately *not* checked here; that
/// happens on the routing path where replies can be produced.
pub fn parse_message_into_command(
    registry: &CommandRegistry,
    prefixes: &[String],
    event: &MessageEvent,
) -> Result<ParseResult, ParseError> {
    if event.author_is_bot {
        return Err(PreParseError::UserIsBot(event.author_id.get()).into());
    }

    let prefix = prefixes
        .iter()
        .find(|prefix| event.content.starts_with(prefix.as_str()))
        .ok_or(PreParseError::MessageNotPrefixed)?;

    let without_prefix = event.content[prefix.len()..].trim();

    let invoked_name = without_prefix
        .split_ascii_whitespace()
        .next()
        .ok_or(PreParseError::EmptyCommand)?;

    let mut args = without_prefix[invoked_name.len()..].trim();

    let mut command = registry
        .find_command_by_name(invoked_name)
        .ok_or_else(|| ParseError::CommandNotFound(invoked_name.to_owned()))?;

    let mut descend = None;
    for subcommand in &command.subcommands {
        let name = subcommand.metadata.name.as_str();
        if args == name {
            descend = Some((subcommand.clone(), ""));
            break;
        }
        // only strip at a word boundary so e.g. `tag createx` does not hit
        // the `create` subcommand
        if args.len() > name.len()
            && args.starts_with(name)
            && args[name.len()..].starts_with(char::is_whitespace)
        {
            descend = Some((subcommand.clone(), args[name.len()..].trim()));
            break;
        }
    }
    if let Some((subcommand, rest)) = descend {
        command = subcommand;
        args = rest;
    }

    Ok(ParseResult {
        command,
        invoked_name: invoked_name.to_owned(),
        args: args.to_owned(),
        calling_prefix: prefix.clone(),
    })
}
