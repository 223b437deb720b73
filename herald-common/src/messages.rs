//! User-facing reply templates.
//!
//! Every message the router sends on its own behalf (as opposed to command
//! handlers replying themselves) comes from here, so embedders can reword or
//! localize them by overriding fields in their config file. Templates use a
//! single `{}` placeholder.

use std::time::Duration;

use serde::Deserialize;
use twilight_model::guild::Permissions;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DefaultMessages {
    pub command_not_found: String,
    pub owner_only: String,
    pub user_permissions: String,
    pub bot_permissions: String,
    pub user_cooldown: String,
    pub channel_cooldown: String,
    pub guild_cooldown: String,
    pub execution_failed: String,
}

impl Default for DefaultMessages {
    fn default() -> Self {
        Self {
            command_not_found: "Unknown command, did you mean {} ?".to_owned(),
            owner_only: "Only the bot owners can use this command.".to_owned(),
            user_permissions: "You are not allowed to use this command.".to_owned(),
            bot_permissions: "The bot is missing these permissions: {}".to_owned(),
            user_cooldown: "You must wait **{} seconds** before using this command again."
                .to_owned(),
            channel_cooldown:
                "This command can be used again in this channel in **{} seconds**.".to_owned(),
            guild_cooldown: "This command can be used again in this server in **{} seconds**."
                .to_owned(),
            execution_failed: "An uncaught error occurred while running this command.".to_owned(),
        }
    }
}

impl DefaultMessages {
    pub fn not_found(&self, suggestions: &[String]) -> String {
        let formatted = suggestions
            .iter()
            .map(|name| format!("**{name}**"))
            .collect::<Vec<_>>()
            .join(", ");

        fill(&self.command_not_found, &formatted)
    }

    pub fn missing_bot_permissions(&self, missing: Permissions) -> String {
        let formatted = missing
            .iter_names()
            .map(|(name, _)| name)
            .collect::<Vec<_>>()
            .join(", ");

        fill(&self.bot_permissions, &formatted)
    }

    pub fn cooldown(&self, template: &str, remaining: Duration) -> String {
        fill(template, &format!("{:.2}", remaining.as_secs_f64()))
    }
}

fn fill(template: &str, value: &str) -> String {
    template.replacen("{}", value, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_substituted_once() {
        let messages = DefaultMessages::default();
        let text = messages.cooldown(&messages.user_cooldown, Duration::from_millis(8250));
        assert_eq!(
            text,
            "You must wait **8.25 seconds** before using this command again."
        );
    }

    #[test]
    fn suggestions_are_bolded_and_joined() {
        let messages = DefaultMessages::default();
        let text = messages.not_found(&["ban".to_owned(), "bean".to_owned()]);
        assert!(text.contains("**ban**, **bean**"));
    }

    #[test]
    fn missing_permissions_named() {
        let messages = DefaultMessages::default();
        let text =
            messages.missing_bot_permissions(Permissions::BAN_MEMBERS | Permissions::KICK_MEMBERS);
        assert!(text.contains("BAN_MEMBERS"));
        assert!(text.contains("KICK_MEMBERS"));
    }
}
