//! Usability evaluation: which constraints block a command for a given
//! caller and location.
//!
//! Evaluation is a pure function over the command metadata and the
//! permission sets delivered with the event, so it is safe to run both on
//! the dispatch path and repeatedly while filtering suggestion candidates.

use twilight_model::guild::Permissions;

use super::CommandMetadata;

/// A single reason a command is inaccessible. Listed in reporting priority
/// order: when several apply, only the highest is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusableReason {
    /// The command is hidden and the caller is not an owner. Reported as if
    /// the command did not exist.
    Hidden,
    OwnerOnly,
    UserPermissions,
    BotPermissions,
}

/// The full set of reasons blocking one (command, caller, location) triple.
/// Empty means usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usability {
    reasons: Vec<UnusableReason>,
}

impl Usability {
    /// Owners skip every check and always get an empty verdict.
    pub fn of(
        metadata: &CommandMetadata,
        caller_permissions: Permissions,
        bot_permissions: Permissions,
        is_owner: bool,
    ) -> Self {
        let mut reasons = Vec::new();

        if !is_owner {
            if metadata.hidden {
                reasons.push(UnusableReason::Hidden);
            }
            if metadata.owner_only {
                reasons.push(UnusableReason::OwnerOnly);
            }
            if !caller_permissions.contains(metadata.user_permissions) {
                reasons.push(UnusableReason::UserPermissions);
            }
            if !bot_permissions.contains(metadata.bot_permissions) {
                reasons.push(UnusableReason::BotPermissions);
            }
        }

        Self { reasons }
    }

    pub fn is_usable(&self) -> bool {
        self.reasons.is_empty()
    }

    pub fn contains(&self, reason: UnusableReason) -> bool {
        self.reasons.contains(&reason)
    }

    /// The single reason to report, by fixed priority.
    pub fn primary_reason(&self) -> Option<UnusableReason> {
        self.reasons.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::command::{CommandMetadata, CooldownScope};

    use super::*;

    fn metadata() -> CommandMetadata {
        CommandMetadata {
            name: "ban".to_owned(),
            aliases: vec![],
            description: String::new(),
            cooldown: Duration::ZERO,
            cooldown_scope: CooldownScope::User,
            hidden: false,
            owner_only: false,
            user_permissions: Permissions::BAN_MEMBERS,
            bot_permissions: Permissions::BAN_MEMBERS,
            usage: String::new(),
            examples: vec![],
        }
    }

    #[test]
    fn collects_every_applicable_reason() {
        let mut meta = metadata();
        meta.hidden = true;
        meta.owner_only = true;

        let usability = Usability::of(&meta, Permissions::empty(), Permissions::empty(), false);

        assert!(!usability.is_usable());
        assert!(usability.contains(UnusableReason::Hidden));
        assert!(usability.contains(UnusableReason::OwnerOnly));
        assert!(usability.contains(UnusableReason::UserPermissions));
        assert!(usability.contains(UnusableReason::BotPermissions));
        assert_eq!(usability.primary_reason(), Some(UnusableReason::Hidden));
    }

    #[test]
    fn owner_bypasses_everything() {
        let mut meta = metadata();
        meta.hidden = true;
        meta.owner_only = true;

        let usability = Usability::of(&meta, Permissions::empty(), Permissions::empty(), true);
        assert!(usability.is_usable());
    }

    #[test]
    fn permission_superset_is_usable() {
        let meta = metadata();
        let caller = Permissions::BAN_MEMBERS | Permissions::KICK_MEMBERS;

        let usability = Usability::of(&meta, caller, Permissions::BAN_MEMBERS, false);
        assert!(usability.is_usable());
    }

    #[test]
    fn evaluation_is_deterministic() {
        let meta = metadata();

        let first = Usability::of(&meta, Permissions::empty(), Permissions::BAN_MEMBERS, false);
        let second = Usability::of(&meta, Permissions::empty(), Permissions::BAN_MEMBERS, false);

        assert_eq!(first, second);
        assert_eq!(first.primary_reason(), Some(UnusableReason::UserPermissions));
    }
}
