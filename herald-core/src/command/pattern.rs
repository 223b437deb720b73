//! Overload pattern compilation.
//!
//! Each overload of a command compiles to a single regex built from its
//! slots' resolver fragments, anchored at both ends so a match always
//! consumes the whole remaining argument text. Compilation ends with a
//! self-test: the pattern must match an example string assembled from its
//! own resolvers, otherwise the overload is rejected at registration time
//! and never reaches dispatch.

use std::sync::Arc;

use regex::Regex;

use herald_common::event::MessageEvent;

use super::errors::RegistrationError;
use super::resolvers::{ArgValue, DecodeOutcome, ParameterResolver};
use super::HandlerFn;

/// Declarative slot description, resolved against a [`super::resolvers::ResolverRegistry`]
/// when the owning command is built.
#[derive(Debug, Clone)]
pub struct SlotSpec {
    pub resolver: String,
    pub optional: bool,
}

impl SlotSpec {
    pub fn required(resolver: &str) -> Self {
        Self {
            resolver: resolver.to_owned(),
            optional: false,
        }
    }

    pub fn optional(resolver: &str) -> Self {
        Self {
            resolver: resolver.to_owned(),
            optional: true,
        }
    }
}

/// A slot bound to its resolver.
#[derive(Clone)]
pub struct ParameterSlot {
    pub resolver: Arc<ParameterResolver>,
    pub optional: bool,
}

/// One argument-shape variant of a command, matched by its own compiled
/// pattern. Capture groups align with slots in order; a slot consumes
/// `resolver.group_count` groups.
#[derive(Clone)]
pub struct Overload {
    pub slots: Vec<ParameterSlot>,
    pub pattern: Regex,
    /// Number of typed arguments the handler receives. Always equals
    /// `slots.len()`; the builder rejects any declaration where it would not.
    pub arity: usize,
    pub handler: HandlerFn,
}

/// Result of trying one overload against the argument text.
pub enum OverloadMatch {
    Matched(Vec<ArgValue>),
    /// The pattern did not match, or a resolver reported the matched text
    /// does not denote a usable value. Try the next overload.
    NoMatch,
    /// A resolver failed in a way that is a real error; dispatch aborts.
    Fatal(anyhow::Error),
}

impl Overload {
    pub fn try_match(&self, event: &MessageEvent, args: &str) -> OverloadMatch {
        let Some(captures) = self.pattern.captures(args) else {
            return OverloadMatch::NoMatch;
        };

        let mut values = Vec::with_capacity(self.slots.len());
        let mut group_index = 1;

        for slot in &self.slots {
            let mut groups = Vec::with_capacity(slot.resolver.group_count);
            for _ in 0..slot.resolver.group_count {
                groups.push(captures.get(group_index).map(|group| group.as_str()));
                group_index += 1;
            }

            if groups.iter().all(Option::is_none) {
                if slot.optional {
                    values.push(ArgValue::None);
                    continue;
                }
                return OverloadMatch::NoMatch;
            }

            match slot.resolver.decode(event, &groups) {
                DecodeOutcome::Decoded(value) => values.push(value),
                DecodeOutcome::Skip => return OverloadMatch::NoMatch,
                DecodeOutcome::Fatal(error) => return OverloadMatch::Fatal(error),
            }
        }

        OverloadMatch::Matched(values)
    }
}

/// Builds the single anchored pattern for an ordered slot list.
///
/// When more than one slot is quotable, every quotable slot switches to its
/// quote-aware fragment so adjacent free-text arguments stay separable.
/// Optional slots wrap their fragment (and leading separator) so the whole
/// piece can be elided.
pub(crate) fn compile(command: &str, slots: &[ParameterSlot]) -> Result<Regex, RegistrationError> {
    let use_preferred = slots
        .iter()
        .filter(|slot| slot.resolver.is_quotable())
        .count()
        > 1;

    let mut pattern = String::from("^");
    let mut example_parts = Vec::new();

    for (index, slot) in slots.iter().enumerate() {
        let preferred = use_preferred && slot.resolver.is_quotable();
        let fragment = slot.resolver.fragment(preferred);
        let separator = if index == 0 { "" } else { r"\s+" };

        if slot.optional {
            pattern.push_str("(?:");
            pattern.push_str(separator);
            pattern.push_str(fragment);
            pattern.push_str(")?");
        } else {
            pattern.push_str(separator);
            pattern.push_str(fragment);
            example_parts.push(slot.resolver.example(preferred));
        }
    }

    pattern.push('$');

    let compiled = Regex::new(&pattern).map_err(|_| RegistrationError::InvalidPattern {
        command: command.to_owned(),
        pattern: pattern.clone(),
    })?;

    let example = example_parts.join(" ");
    if !compiled.is_match(&example) {
        return Err(RegistrationError::UnmatchableOverload {
            command: command.to_owned(),
            pattern,
            example,
        });
    }

    Ok(compiled)
}
