//! Parameter resolvers: pluggable converters from captured argument text (or
//! the structured platform payload) to typed handler arguments.
//!
//! A resolver is a plain value object. Its regex fragment is what the
//! pattern compiler splices into an overload's pattern; its decode function
//! is called with the capture groups that fragment produced. Whether a
//! decode failure skips to the next overload or aborts the dispatch is part
//! of each resolver's contract, expressed through [`DecodeOutcome`] instead
//! of being inferred from error types.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bitflags::bitflags;
use herald_common::event::MessageEvent;
use herald_common::util::{parse_to_millis, regex};
use twilight_model::id::marker::{ChannelMarker, UserMarker};
use twilight_model::id::Id;

use super::errors::RegistrationError;

bitflags! {
    /// What a resolver can do. Dispatch code queries these explicitly.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ResolverCaps: u8 {
        /// Matches text through a regex fragment. All resolvers usable in
        /// overload slots carry this.
        const REGEX = 1 << 0;
        /// Has a quote-aware fragment, used when an overload contains more
        /// than one quotable slot so adjacent free text stays separable.
        const QUOTABLE = 1 << 1;
        /// Consults the structured platform payload while decoding.
        const PAYLOAD = 1 << 2;
    }
}

/// A typed, already-decoded handler argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Text(String),
    Int(i64),
    Float(f64),
    Time(Duration),
    User(Id<UserMarker>),
    Channel(Id<ChannelMarker>),
    Url(String),
    Emoji { name: String, id: u64 },
    /// An elided optional slot, or a tolerated missing remote value.
    None,
}

impl ArgValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<Id<UserMarker>> {
        match self {
            Self::User(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// The outcome of decoding one slot's capture groups.
#[derive(Debug)]
pub enum DecodeOutcome {
    Decoded(ArgValue),
    /// The text matched the fragment but does not denote a usable value
    /// (e.g. a numeric literal out of range). The overload does not apply;
    /// the router tries the next one.
    Skip,
    /// Decoding failed in a way that is a real error, not a mismatch. The
    /// dispatch is aborted and the error reported.
    Fatal(anyhow::Error),
}

pub type DecodeFn = Arc<dyn Fn(&MessageEvent, &[Option<&str>]) -> DecodeOutcome + Send + Sync>;

/// A registered parameter resolver. See the module docs; construction goes
/// through [`ParameterResolver::new`] plus the capability builders.
#[derive(Clone)]
pub struct ParameterResolver {
    pub key: String,
    pattern: String,
    quoted_pattern: Option<String>,
    example: String,
    /// How many capture groups [`Self::fragment`] produces. Slots consume
    /// this many groups from an overload match.
    pub group_count: usize,
    pub caps: ResolverCaps,
    decode: DecodeFn,
}

impl ParameterResolver {
    pub fn new(key: &str, pattern: &str, example: &str, group_count: usize, decode: DecodeFn) -> Self {
        Self {
            key: key.to_owned(),
            pattern: pattern.to_owned(),
            quoted_pattern: None,
            example: example.to_owned(),
            group_count,
            caps: ResolverCaps::REGEX,
            decode,
        }
    }

    /// Declares the quote-aware fragment variant.
    pub fn quotable(mut self, quoted_pattern: &str) -> Self {
        self.quoted_pattern = Some(quoted_pattern.to_owned());
        self.caps |= ResolverCaps::QUOTABLE;
        self
    }

    /// Marks the decode function as consulting the platform payload.
    pub fn payload_capable(mut self) -> Self {
        self.caps |= ResolverCaps::PAYLOAD;
        self
    }

    pub fn is_quotable(&self) -> bool {
        self.caps.contains(ResolverCaps::QUOTABLE)
    }

    /// The regex fragment to splice into an overload pattern. The preferred
    /// (quoted) variant only exists for quotable resolvers.
    pub fn fragment(&self, preferred: bool) -> &str {
        match (&self.quoted_pattern, preferred) {
            (Some(quoted), true) => quoted,
            _ => &self.pattern,
        }
    }

    /// The example value in the shape [`Self::fragment`] will match, used
    /// by the pattern compiler's registration-time self-test.
    pub fn example(&self, preferred: bool) -> String {
        if preferred && self.is_quotable() {
            format!("\"{}\"", self.example)
        } else {
            self.example.clone()
        }
    }

    pub fn decode(&self, event: &MessageEvent, groups: &[Option<&str>]) -> DecodeOutcome {
        (self.decode)(event, groups)
    }
}

/// Process-wide mapping from resolver key to resolver. Populated once at
/// startup, read-only afterwards (shared behind `Arc` during dispatch).
#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: HashMap<String, Arc<ParameterResolver>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty registry pre-populated with the built-in resolvers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for resolver in builtin_resolvers() {
            registry.resolvers.insert(resolver.key.clone(), Arc::new(resolver));
        }
        registry
    }

    pub fn register(&mut self, resolver: ParameterResolver) -> Result<(), RegistrationError> {
        if self.resolvers.contains_key(&resolver.key) {
            return Err(RegistrationError::DuplicateResolver(resolver.key));
        }

        self.resolvers.insert(resolver.key.clone(), Arc::new(resolver));
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Arc<ParameterResolver>, RegistrationError> {
        self.resolvers
            .get(key)
            .cloned()
            .ok_or_else(|| RegistrationError::UnknownResolver(key.to_owned()))
    }
}

fn first_group<'a>(groups: &[Option<&'a str>]) -> Option<&'a str> {
    groups.first().copied().flatten()
}

fn builtin_resolvers() -> Vec<ParameterResolver> {
    vec![
        ParameterResolver::new(
            "string",
            r"(.+)",
            "foobar",
            1,
            Arc::new(|_event, groups| match first_group(groups) {
                Some(text) => DecodeOutcome::Decoded(ArgValue::Text(text.to_owned())),
                None => DecodeOutcome::Skip,
            }),
        )
        .quotable(r#""(.+?)""#),
        ParameterResolver::new(
            "word",
            r"(\S+)",
            "foobar",
            1,
            Arc::new(|_event, groups| match first_group(groups) {
                Some(text) => DecodeOutcome::Decoded(ArgValue::Text(text.to_owned())),
                None => DecodeOutcome::Skip,
            }),
        ),
        ParameterResolver::new(
            "integer",
            r"(-?\d+)",
            "1234",
            1,
            Arc::new(|_event, groups| {
                match first_group(groups).and_then(|text| text.parse::<i64>().ok()) {
                    Some(value) => DecodeOutcome::Decoded(ArgValue::Int(value)),
                    None => DecodeOutcome::Skip,
                }
            }),
        ),
        ParameterResolver::new(
            "decimal",
            r"(-?\d+(?:\.\d+)?)",
            "1234.42",
            1,
            Arc::new(|_event, groups| {
                match first_group(groups).and_then(|text| text.parse::<f64>().ok()) {
                    Some(value) => DecodeOutcome::Decoded(ArgValue::Float(value)),
                    None => DecodeOutcome::Skip,
                }
            }),
        ),
        ParameterResolver::new(
            "time",
            r"((?:\d+[smhd])+)",
            "1h20m30s",
            1,
            Arc::new(|_event, groups| {
                let Some(text) = first_group(groups) else {
                    return DecodeOutcome::Skip;
                };
                match parse_to_millis(text) {
                    Ok(millis) => {
                        DecodeOutcome::Decoded(ArgValue::Time(Duration::from_millis(millis)))
                    },
                    Err(_) => DecodeOutcome::Skip,
                }
            }),
        ),
        ParameterResolver::new(
            "user",
            regex::USER_MENTION.as_str(),
            "<@1234>",
            1,
            Arc::new(|event, groups| {
                let Some(id) = first_group(groups)
                    .and_then(|text| text.parse::<u64>().ok())
                    .and_then(Id::new_checked)
                else {
                    return DecodeOutcome::Skip;
                };

                // The mention payload is the lookup source; a mention of a
                // user the platform did not ship with the message resolves
                // to a missing value, which is passed onward rather than
                // failing the overload.
                match event.mentioned_user(id) {
                    Some(user) => DecodeOutcome::Decoded(ArgValue::User(user.id)),
                    None => DecodeOutcome::Decoded(ArgValue::None),
                }
            }),
        )
        .payload_capable(),
        ParameterResolver::new(
            "channel",
            regex::CHANNEL_MENTION.as_str(),
            "<#1234>",
            1,
            Arc::new(|_event, groups| {
                match first_group(groups)
                    .and_then(|text| text.parse::<u64>().ok())
                    .and_then(Id::new_checked)
                {
                    Some(id) => DecodeOutcome::Decoded(ArgValue::Channel(id)),
                    None => DecodeOutcome::Skip,
                }
            }),
        ),
        ParameterResolver::new(
            "url",
            regex::URL.as_str(),
            "https://example.com/cat.png",
            1,
            Arc::new(|_event, groups| match first_group(groups) {
                Some(text) => DecodeOutcome::Decoded(ArgValue::Url(text.to_owned())),
                None => DecodeOutcome::Skip,
            }),
        ),
        ParameterResolver::new(
            "emoji",
            regex::CUSTOM_EMOJI.as_str(),
            "<:meow:543877301427699803>",
            2,
            Arc::new(|_event, groups| {
                let (Some(name), Some(id)) = (
                    groups.first().copied().flatten(),
                    groups.get(1).copied().flatten(),
                ) else {
                    return DecodeOutcome::Skip;
                };

                match id.parse::<u64>() {
                    Ok(id) => DecodeOutcome::Decoded(ArgValue::Emoji {
                        name: name.to_owned(),
                        id,
                    }),
                    Err(_) => DecodeOutcome::Skip,
                }
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use herald_common::event::MentionedUser;
    use twilight_model::guild::Permissions;

    use super::*;

    fn event_with_mentions(mentions: Vec<MentionedUser>) -> MessageEvent {
        MessageEvent {
            id: Id::new(1),
            content: String::new(),
            author_id: Id::new(2),
            author_is_bot: false,
            channel_id: Id::new(3),
            guild_id: None,
            author_permissions: Permissions::empty(),
            bot_permissions: Permissions::empty(),
            mentioned_users: mentions,
        }
    }

    #[test]
    fn duplicate_key_rejected() {
        let mut registry = ResolverRegistry::with_defaults();
        let duplicate = ParameterResolver::new(
            "integer",
            r"(\d+)",
            "1",
            1,
            Arc::new(|_, _| DecodeOutcome::Skip),
        );

        assert!(matches!(
            registry.register(duplicate),
            Err(RegistrationError::DuplicateResolver(key)) if key == "integer"
        ));
    }

    #[test]
    fn unknown_key_rejected() {
        let registry = ResolverRegistry::with_defaults();
        assert!(matches!(
            registry.get("snowflake"),
            Err(RegistrationError::UnknownResolver(key)) if key == "snowflake"
        ));
    }

    #[test]
    fn integer_out_of_range_skips() {
        let registry = ResolverRegistry::with_defaults();
        let resolver = registry.get("integer").unwrap();
        let event = event_with_mentions(vec![]);

        // matches the fragment but exceeds i64
        let outcome = resolver.decode(&event, &[Some("99999999999999999999")]);
        assert!(matches!(outcome, DecodeOutcome::Skip));
    }

    #[test]
    fn user_mention_resolves_from_payload() {
        let registry = ResolverRegistry::with_defaults();
        let resolver = registry.get("user").unwrap();
        let event = event_with_mentions(vec![MentionedUser {
            id: Id::new(123),
            name: "someone".to_owned(),
            bot: false,
        }]);

        let outcome = resolver.decode(&event, &[Some("123")]);
        assert!(
            matches!(outcome, DecodeOutcome::Decoded(ArgValue::User(id)) if id == Id::new(123))
        );
    }

    #[test]
    fn stale_user_mention_resolves_to_none() {
        let registry = ResolverRegistry::with_defaults();
        let resolver = registry.get("user").unwrap();
        let event = event_with_mentions(vec![]);

        let outcome = resolver.decode(&event, &[Some("123")]);
        assert!(matches!(outcome, DecodeOutcome::Decoded(ArgValue::None)));
    }

    #[test]
    fn emoji_consumes_two_groups() {
        let registry = ResolverRegistry::with_defaults();
        let resolver = registry.get("emoji").unwrap();
        assert_eq!(resolver.group_count, 2);

        let event = event_with_mentions(vec![]);
        let outcome = resolver.decode(&event, &[Some("meow"), Some("543877301427699803")]);
        assert!(matches!(
            outcome,
            DecodeOutcome::Decoded(ArgValue::Emoji { ref name, id })
                if name == "meow" && id == 543877301427699803
        ));
    }

    #[test]
    fn quotable_example_is_quoted() {
        let registry = ResolverRegistry::with_defaults();
        let string = registry.get("string").unwrap();

        assert_eq!(string.example(false), "foobar");
        assert_eq!(string.example(true), "\"foobar\"");
        assert_eq!(string.fragment(true), r#""(.+?)""#);
    }
}
