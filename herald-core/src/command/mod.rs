//! The command system.
//!
//! The key things that make up the command system are:
//!
//! - [`Command`]: an immutable description of one command — metadata,
//!   subcommands, compiled overloads and a free-form fallback handler.
//!   Commands are assembled by the embedding bot through [`CommandBuilder`]
//!   and frozen in a [`registry::CommandRegistry`]; everything that can be
//!   rejected (unknown resolver keys, arity mismatches, unmatchable overload
//!   patterns) is rejected while building, before any traffic is served.
//!
//! - Handlers: type-erased async closures over `(CommandCtxt, Vec<ArgValue>)`.
//!   There is no reflection at dispatch time; an overload's handler is bound
//!   when the command is built and its arity is part of that contract.
//!
//! - [`resolvers`]: the pluggable converters from captured argument text to
//!   typed [`resolvers::ArgValue`]s, and the process-wide registry mapping
//!   resolver keys to them.
//!
//! Routing itself (prefix parsing, filters, usability, cooldowns, pattern
//! matching, execution isolation) lives in [`crate::dispatch`].

use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::BoxFuture;
use herald_common::event::{MessageEvent, ReplySink};
use twilight_model::guild::Permissions;

use self::errors::RegistrationError;
use self::pattern::{Overload, ParameterSlot, SlotSpec};
use self::resolvers::{ArgValue, ResolverRegistry};

pub mod cooldowns;
pub mod errors;
pub mod pattern;
pub mod registry;
pub mod resolvers;
pub mod suggestions;
pub mod usability;

/// The granularity a command's cooldown applies at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownScope {
    User,
    Channel,
    Guild,
}

impl Display for CooldownScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::User => "user",
                Self::Channel => "channel",
                Self::Guild => "guild",
            }
        )
    }
}

#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    /// `Duration::ZERO` disables the cooldown entirely.
    pub cooldown: Duration,
    pub cooldown_scope: CooldownScope,
    /// Hidden commands behave as nonexistent for non-owners, including in
    /// suggestions.
    pub hidden: bool,
    pub owner_only: bool,
    /// Permissions the caller must hold at the originating location.
    pub user_permissions: Permissions,
    /// Permissions the bot itself needs there.
    pub bot_permissions: Permissions,
    pub usage: String,
    pub examples: Vec<String>,
}

/// A registered command. Immutable once built; the router only ever reads.
pub struct Command {
    pub metadata: CommandMetadata,
    /// Immediate children only; the router walks at most one level per
    /// dispatch.
    pub subcommands: Vec<Arc<Command>>,
    /// Tried in declaration order; first full match wins.
    pub overloads: Vec<Overload>,
    /// Free-form invocation used when no overload matches (or none exist).
    pub fallback: HandlerFn,
}

/// A set of timings used to diagnose slow areas of message processing.
#[derive(Debug, Clone)]
pub struct ExecutionTimings {
    /// Total time spent on the parsing phase.
    pub parse_total: Duration,
    /// Instant full message processing started.
    pub processing_time_start: Instant,
}

/// Data shared by everything belonging to one invocation.
pub struct CommandData {
    pub event: Arc<MessageEvent>,
    /// Argument text after prefix, command name and any subcommand literal
    /// were stripped.
    pub raw_args: String,
    pub calling_prefix: String,
    /// The name or alias the caller actually typed.
    pub invoked_name: String,
    pub execution_timings: ExecutionTimings,
    pub reply: Arc<dyn ReplySink>,
}

/// Handle passed to command handlers.
#[derive(Clone)]
pub struct CommandCtxt {
    pub data: Arc<CommandData>,
}

impl CommandCtxt {
    pub fn new(data: Arc<CommandData>) -> Self {
        Self { data }
    }

    pub fn args(&self) -> &str {
        &self.data.raw_args
    }

    pub async fn reply(&self, content: &str) -> anyhow::Result<()> {
        self.data
            .reply
            .send_text(self.data.event.channel_id, content)
            .await
    }

    pub(crate) async fn react_failure(&self) -> anyhow::Result<()> {
        self.data
            .reply
            .react_failure(self.data.event.channel_id, self.data.event.id)
            .await
    }
}

/// A command handler, bound at registration time: an async closure over the
/// invocation context and the decoded argument list.
pub type HandlerFn =
    Arc<dyn Fn(CommandCtxt, Vec<ArgValue>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Wraps an async fn/closure into a [`HandlerFn`].
pub fn handler_fn<F, Fut>(function: F) -> HandlerFn
where
    F: Fn(CommandCtxt, Vec<ArgValue>) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |ctxt, args| Box::pin(function(ctxt, args)))
}

struct OverloadSpec {
    slots: Vec<SlotSpec>,
    arity: usize,
    handler: HandlerFn,
}

/// Builder utility structure to create a [`Command`] object.
///
/// `build` is the registration step: it resolves slot specs against the
/// resolver registry, compiles and self-tests every overload pattern, and
/// fails instead of producing a command that could misbehave at dispatch.
pub struct CommandBuilder {
    name: String,
    aliases: Vec<String>,
    description: String,
    cooldown: Duration,
    cooldown_scope: CooldownScope,
    hidden: bool,
    owner_only: bool,
    user_permissions: Permissions,
    bot_permissions: Permissions,
    usage: String,
    examples: Vec<String>,
    subcommands: Vec<Command>,
    overloads: Vec<OverloadSpec>,
    fallback: Option<HandlerFn>,
}

impl CommandBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            aliases: vec![],
            description: String::new(),
            cooldown: Duration::ZERO,
            cooldown_scope: CooldownScope::User,
            hidden: false,
            owner_only: false,
            user_permissions: Permissions::empty(),
            bot_permissions: Permissions::empty(),
            usage: String::new(),
            examples: vec![],
            subcommands: vec![],
            overloads: vec![],
            fallback: None,
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_owned());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    pub fn cooldown(mut self, cooldown: Duration, scope: CooldownScope) -> Self {
        self.cooldown = cooldown;
        self.cooldown_scope = scope;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn owner_only(mut self, owner_only: bool) -> Self {
        self.owner_only = owner_only;
        self
    }

    pub fn user_permissions(mut self, permissions: Permissions) -> Self {
        self.user_permissions = permissions;
        self
    }

    pub fn bot_permissions(mut self, permissions: Permissions) -> Self {
        self.bot_permissions = permissions;
        self
    }

    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_owned();
        self
    }

    pub fn example(mut self, example: &str) -> Self {
        self.examples.push(example.to_owned());
        self
    }

    pub fn subcommand(mut self, subcommand: Command) -> Self {
        self.subcommands.push(subcommand);
        self
    }

    /// Adds an overload. `arity` is the number of typed arguments the
    /// handler expects; it must equal the slot count.
    pub fn overload(mut self, slots: &[SlotSpec], arity: usize, handler: HandlerFn) -> Self {
        self.overloads.push(OverloadSpec {
            slots: slots.to_vec(),
            arity,
            handler,
        });
        self
    }

    pub fn fallback(mut self, handler: HandlerFn) -> Self {
        self.fallback = Some(handler);
        self
    }

    pub fn build(self, resolvers: &ResolverRegistry) -> Result<Command, RegistrationError> {
        let fallback = self
            .fallback
            .ok_or_else(|| RegistrationError::MissingFallback(self.name.clone()))?;

        let mut overloads = Vec::with_capacity(self.overloads.len());
        for spec in self.overloads {
            if spec.arity != spec.slots.len() {
                return Err(RegistrationError::ArityMismatch {
                    command: self.name,
                    declared: spec.arity,
                    slots: spec.slots.len(),
                });
            }

            let slots = spec
                .slots
                .iter()
                .map(|slot| {
                    Ok(ParameterSlot {
                        resolver: resolvers.get(&slot.resolver)?,
                        optional: slot.optional,
                    })
                })
                .collect::<Result<Vec<_>, RegistrationError>>()?;

            let compiled = pattern::compile(&self.name, &slots)?;

            overloads.push(Overload {
                slots,
                pattern: compiled,
                arity: spec.arity,
                handler: spec.handler,
            });
        }

        Ok(Command {
            metadata: CommandMetadata {
                name: self.name,
                aliases: self.aliases,
                description: self.description,
                cooldown: self.cooldown,
                cooldown_scope: self.cooldown_scope,
                hidden: self.hidden,
                owner_only: self.owner_only,
                user_permissions: self.user_permissions,
                bot_permissions: self.bot_permissions,
                usage: self.usage,
                examples: self.examples,
            },
            subcommands: self.subcommands.into_iter().map(Arc::new).collect(),
            overloads,
            fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::command::registry::CommandRegistry;

    use super::*;

    fn noop() -> HandlerFn {
        handler_fn(|_ctxt, _args| async { Ok(()) })
    }

    #[test]
    fn arity_must_match_slot_count() {
        let resolvers = ResolverRegistry::with_defaults();
        let result = CommandBuilder::new("ban")
            .overload(&[SlotSpec::required("user")], 2, noop())
            .fallback(noop())
            .build(&resolvers);

        assert!(matches!(
            result,
            Err(RegistrationError::ArityMismatch {
                declared: 2,
                slots: 1,
                ..
            })
        ));
    }

    #[test]
    fn fallback_is_mandatory() {
        let resolvers = ResolverRegistry::with_defaults();
        let result = CommandBuilder::new("ban").build(&resolvers);

        assert!(matches!(
            result,
            Err(RegistrationError::MissingFallback(name)) if name == "ban"
        ));
    }

    #[test]
    fn unknown_resolver_key_fails_build() {
        let resolvers = ResolverRegistry::with_defaults();
        let result = CommandBuilder::new("ban")
            .overload(&[SlotSpec::required("snowflake")], 1, noop())
            .fallback(noop())
            .build(&resolvers);

        assert!(matches!(
            result,
            Err(RegistrationError::UnknownResolver(key)) if key == "snowflake"
        ));
    }

    #[test]
    fn registry_rejects_alias_collisions() {
        let resolvers = ResolverRegistry::with_defaults();
        let mut registry = CommandRegistry::new();

        registry
            .register(
                CommandBuilder::new("ban")
                    .alias("b")
                    .fallback(noop())
                    .build(&resolvers)
                    .unwrap(),
            )
            .unwrap();

        let collision = CommandBuilder::new("bonk")
            .alias("b")
            .fallback(noop())
            .build(&resolvers)
            .unwrap();

        assert!(matches!(
            registry.register(collision),
            Err(RegistrationError::DuplicateCommand(key)) if key == "b"
        ));
    }

    #[test]
    fn command_paths_include_subcommands() {
        let resolvers = ResolverRegistry::with_defaults();
        let mut registry = CommandRegistry::new();

        let create = CommandBuilder::new("create")
            .fallback(noop())
            .build(&resolvers)
            .unwrap();
        let tag = CommandBuilder::new("tag")
            .subcommand(create)
            .fallback(noop())
            .build(&resolvers)
            .unwrap();
        registry.register(tag).unwrap();

        assert_eq!(registry.command_names(), vec!["tag"]);
        assert_eq!(
            registry.command_paths(),
            vec!["tag".to_owned(), "tag create".to_owned()]
        );
    }
}
