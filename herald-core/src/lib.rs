//! Herald's core: command resolution and dispatch.
//!
//! An embedding bot builds its commands with [`command::CommandBuilder`],
//! registers them in a [`command::registry::CommandRegistry`], and feeds
//! inbound [`herald_common::event::MessageEvent`]s to a
//! [`dispatch::Router`]. The router parses the prefix and command name,
//! walks subcommands, applies filters, usability and cooldown gating,
//! matches the argument text against each overload's compiled pattern, and
//! hands the first match to the execution isolator. Handlers run off the
//! event-delivery task; their failures are logged, acknowledged to the user
//! and forwarded to registered exception listeners.

pub mod command;
pub mod dispatch;
