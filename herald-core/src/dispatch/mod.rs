//! The command router.
//!
//! One instance owns everything a dispatch needs — the frozen command
//! registry, the cooldown tables, the configured prefixes and owners, the
//! reply sink and the registered filters/exception listeners — and exposes a
//! single entry point, [`Router::handle_message`]. The stages (parse,
//! resolve, filter, usability, cooldown, pattern match) run synchronously on
//! the event-delivery task and never touch the network; only the final
//! hand-off to [`executor`] crosses onto worker tasks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use herald_common::config::HeraldConfig;
use herald_common::event::{MessageEvent, ReplySink};
use herald_common::messages::DefaultMessages;
use tracing::debug;

use crate::command::cooldowns::CooldownManager;
use crate::command::errors::{ErrorSeverity, GetErrorSeverity};
use crate::command::pattern::OverloadMatch;
use crate::command::registry::CommandRegistry;
use crate::command::usability::{UnusableReason, Usability};
use crate::command::{
    suggestions, CommandCtxt, CommandData, CommandMetadata, CooldownScope, ExecutionTimings,
};

use self::error::ParseError;
pub use self::executor::ExceptionListener;

pub mod error;
pub mod executor;
pub mod parser;

/// What a dispatch context exposes to registered filters.
pub struct FilterContext<'a> {
    pub event: &'a MessageEvent,
    pub metadata: &'a CommandMetadata,
    pub args: &'a str,
}

/// An environment-restriction predicate. Returning `false` aborts the
/// dispatch silently; filters are not a user-feedback mechanism.
pub type CommandFilter = Arc<dyn Fn(&FilterContext<'_>) -> bool + Send + Sync>;

/// Where a message ended up. Mostly useful for tests and telemetry; every
/// user-visible effect (replies) has already happened by the time this is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not a command (bot author, no prefix, nothing after the prefix).
    Ignored,
    /// Unknown command name; carries whatever was suggested to the caller.
    NotFound { suggestions: Vec<String> },
    /// A registered filter vetoed the dispatch.
    FilteredOut,
    /// Blocked by a usability reason (the reported one).
    Blocked(UnusableReason),
    /// An active cooldown, with the remaining delay.
    RateLimited(Duration),
    /// An overload matched but a resolver failed fatally.
    DecodeFailed,
    /// Handed to the execution isolator.
    Dispatched,
}

pub struct Router {
    registry: Arc<CommandRegistry>,
    cooldowns: CooldownManager,
    prefixes: Vec<String>,
    owners: Vec<u64>,
    messages: DefaultMessages,
    reply: Arc<dyn ReplySink>,
    filters: Vec<CommandFilter>,
    exception_listeners: Vec<ExceptionListener>,
}

impl Router {
    /// The cooldown manager is passed in rather than constructed here so
    /// tests (and embedders running several routers) control its lifetime.
    pub fn new(
        registry: Arc<CommandRegistry>,
        cooldowns: CooldownManager,
        config: &HeraldConfig,
        reply: Arc<dyn ReplySink>,
    ) -> Self {
        Self {
            registry,
            cooldowns,
            prefixes: config.prefixes.order.clone(),
            owners: config.dev.owners.clone(),
            messages: config.messages.clone(),
            reply,
            filters: vec![],
            exception_listeners: vec![],
        }
    }

    /// Registers an environment filter. Registration happens during
    /// startup, before the router is shared with the event source.
    pub fn filter<F>(&mut self, filter: F)
    where
        F: Fn(&FilterContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.filters.push(Arc::new(filter));
    }

    /// Registers a listener notified of every handler failure.
    pub fn exception_listener<F>(&mut self, listener: F)
    where
        F: Fn(&str, &anyhow::Error) + Send + Sync + 'static,
    {
        self.exception_listeners.push(Arc::new(listener));
    }

    fn is_owner(&self, event: &MessageEvent) -> bool {
        self.owners.contains(&event.author_id.get())
    }

    /// Routes one inbound message end to end. Never blocks on handler
    /// execution and never propagates a handler failure.
    pub async fn handle_message(&self, event: MessageEvent) -> DispatchOutcome {
        let processing_time_start = Instant::now();
        let event = Arc::new(event);

        let parse_start = Instant::now();
        let parsed = match parser::parse_message_into_command(&self.registry, &self.prefixes, &event)
        {
            Ok(parsed) => parsed,
            Err(ParseError::CommandNotFound(name)) => {
                let is_owner = self.is_owner(&event);
                return self.on_command_not_found(&event, &name, is_owner).await;
            },
            Err(error) => {
                match error.get_severity() {
                    ErrorSeverity::Low => debug!("ignoring message: {error}"),
                    ErrorSeverity::High => herald_common::err!("{error}"),
                }
                return DispatchOutcome::Ignored;
            },
        };
        let parse_total = parse_start.elapsed();

        let command = parsed.command.clone();
        let metadata = &command.metadata;
        let is_owner = self.is_owner(&event);

        let filter_context = FilterContext {
            event: &event,
            metadata,
            args: &parsed.args,
        };
        if self.filters.iter().any(|filter| !filter(&filter_context)) {
            debug!("dispatch of '{}' vetoed by a filter", metadata.name);
            return DispatchOutcome::FilteredOut;
        }

        if !is_owner {
            let usability = Usability::of(
                metadata,
                event.author_permissions,
                event.bot_permissions,
                false,
            );

            match usability.primary_reason() {
                // a hidden command must look exactly like a missing one
                Some(UnusableReason::Hidden) => {
                    return self
                        .on_command_not_found(&event, &parsed.invoked_name, false)
                        .await;
                },
                Some(UnusableReason::OwnerOnly) => {
                    let _ = self
                        .reply
                        .send_text(event.channel_id, &self.messages.owner_only)
                        .await;
                    return DispatchOutcome::Blocked(UnusableReason::OwnerOnly);
                },
                Some(UnusableReason::UserPermissions) => {
                    let _ = self
                        .reply
                        .send_text(event.channel_id, &self.messages.user_permissions)
                        .await;
                    return DispatchOutcome::Blocked(UnusableReason::UserPermissions);
                },
                Some(UnusableReason::BotPermissions) => {
                    let missing = metadata.bot_permissions.difference(event.bot_permissions);
                    let _ = self
                        .reply
                        .send_text(
                            event.channel_id,
                            &self.messages.missing_bot_permissions(missing),
                        )
                        .await;
                    return DispatchOutcome::Blocked(UnusableReason::BotPermissions);
                },
                None => {},
            }

            if !metadata.cooldown.is_zero() {
                let (key, template) = match metadata.cooldown_scope {
                    CooldownScope::User => {
                        (event.author_id.get(), &self.messages.user_cooldown)
                    },
                    CooldownScope::Channel => {
                        (event.channel_id.get(), &self.messages.channel_cooldown)
                    },
                    // in DMs there is no guild; fall back to the channel key
                    CooldownScope::Guild => (
                        event.guild_id.map_or_else(|| event.channel_id.get(), |id| id.get()),
                        &self.messages.guild_cooldown,
                    ),
                };

                if let Err(remaining) =
                    self.cooldowns
                        .try_acquire(metadata.cooldown_scope, key, metadata.cooldown)
                {
                    let _ = self
                        .reply
                        .send_text(event.channel_id, &self.messages.cooldown(template, remaining))
                        .await;
                    return DispatchOutcome::RateLimited(remaining);
                }
            }
        }

        let data = Arc::new(CommandData {
            event: event.clone(),
            raw_args: parsed.args.clone(),
            calling_prefix: parsed.calling_prefix,
            invoked_name: parsed.invoked_name,
            execution_timings: ExecutionTimings {
                parse_total,
                processing_time_start,
            },
            reply: self.reply.clone(),
        });
        let ctxt = CommandCtxt::new(data);

        for overload in &command.overloads {
            match overload.try_match(&event, &parsed.args) {
                OverloadMatch::Matched(values) => {
                    let invocation = (overload.handler)(ctxt.clone(), values);
                    executor::submit(
                        ctxt,
                        invocation,
                        self.messages.execution_failed.clone(),
                        self.exception_listeners.clone(),
                    );
                    return DispatchOutcome::Dispatched;
                },
                OverloadMatch::NoMatch => {},
                OverloadMatch::Fatal(error) => {
                    let _ = self
                        .reply
                        .send_text(event.channel_id, &format!(":warning: `{error}`"))
                        .await;
                    return DispatchOutcome::DecodeFailed;
                },
            }
        }

        // no overload applied: free-form invocation with the raw args
        let invocation = (command.fallback)(ctxt.clone(), Vec::new());
        executor::submit(
            ctxt,
            invocation,
            self.messages.execution_failed.clone(),
            self.exception_listeners.clone(),
        );
        DispatchOutcome::Dispatched
    }

    /// The "did you mean" flow. Candidates are limited to commands the
    /// caller could actually use, so hidden commands never leak.
    async fn on_command_not_found(
        &self,
        event: &MessageEvent,
        name: &str,
        is_owner: bool,
    ) -> DispatchOutcome {
        let candidates = self.registry.commands().filter(|command| {
            Usability::of(
                &command.metadata,
                event.author_permissions,
                event.bot_permissions,
                is_owner,
            )
            .is_usable()
        });

        let suggestions = suggestions::suggest(
            name,
            candidates.map(|command| command.metadata.name.as_str()),
        );

        if !suggestions.is_empty() {
            let _ = self
                .reply
                .send_text(event.channel_id, &self.messages.not_found(&suggestions))
                .await;
        }

        DispatchOutcome::NotFound { suggestions }
    }
}
