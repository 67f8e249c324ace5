//! Chat command routing
//!
//! Maps chat messages such as `!airhorn` to sound identifiers. Routing
//! returns a [`Command`] value instead of flagging a match on shared state,
//! so the caller decides what to do with each outcome.

use std::collections::BTreeMap;

/// Trigger word that lists the available sounds.
pub const HELP_TRIGGER: &str = "help";

/// Longest reply the chat service accepts in one message.
pub const MAX_MESSAGE_LEN: usize = 2000;

const TRIGGERS_PER_LINE: usize = 4;

const HELP_HEADING: &str = "I found the following sounds in the database:\n";

/// Outcome of routing one chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Play the container named `identifier`.
    Play { trigger: String, identifier: String },
    /// Reply with the list of sounds, split into chat-sized messages.
    Help { messages: Vec<String> },
    /// Prefixed text that matched nothing.
    Unknown { input: String, reply: String },
}

impl Command {
    /// Sound identifier to load, if this command plays something.
    pub fn sound(&self) -> Option<&str> {
        match self {
            Command::Play { identifier, .. } => Some(identifier),
            _ => None,
        }
    }

    /// Chat replies to send back, if any.
    pub fn replies(&self) -> Vec<String> {
        match self {
            Command::Play { .. } => Vec::new(),
            Command::Help { messages } => messages.clone(),
            Command::Unknown { reply, .. } => vec![reply.clone()],
        }
    }
}

/// Routes prefixed chat messages to sounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRouter {
    prefix: String,
    sounds: BTreeMap<String, String>,
}

impl CommandRouter {
    /// Build a router from `(trigger, identifier)` pairs. The prefix and the
    /// triggers are matched case-insensitively.
    pub fn new<I, K, V>(prefix: impl AsRef<str>, sounds: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let sounds = sounds
            .into_iter()
            .map(|(trigger, identifier)| (trigger.as_ref().to_lowercase(), identifier.into()))
            .collect();
        Self { prefix: prefix.as_ref().to_lowercase(), sounds }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Trigger words in sorted order.
    pub fn triggers(&self) -> impl Iterator<Item = &str> {
        self.sounds.keys().map(String::as_str)
    }

    pub fn identifier_for(&self, trigger: &str) -> Option<&str> {
        self.sounds.get(&trigger.to_lowercase()).map(String::as_str)
    }

    /// Route a chat message. `None` if it does not start with the prefix.
    pub fn route(&self, text: &str) -> Option<Command> {
        let text = text.trim();
        let lowered = text.to_lowercase();
        let trigger = lowered.strip_prefix(&self.prefix)?;

        if trigger == HELP_TRIGGER {
            return Some(Command::Help { messages: self.help_messages() });
        }

        Some(match self.sounds.get(trigger) {
            Some(identifier) => {
                Command::Play { trigger: trigger.to_string(), identifier: identifier.clone() }
            }
            None => Command::Unknown { input: text.to_string(), reply: self.unknown_reply() },
        })
    }

    /// Reply for an unrecognised command.
    pub fn unknown_reply(&self) -> String {
        format!(
            "Sound not found. Please type in {}{} for a list of available sounds",
            self.prefix, HELP_TRIGGER
        )
    }

    /// The sound list, split so that no message exceeds [`MAX_MESSAGE_LEN`].
    ///
    /// Lines hold up to four triggers. A line too long for one message is
    /// broken at trigger boundaries, and a single trigger too long for one
    /// message is broken across messages.
    pub fn help_messages(&self) -> Vec<String> {
        let triggers: Vec<String> = self.triggers().map(|t| format!("{}{}", self.prefix, t)).collect();

        let mut pieces = Vec::new();
        for chunk in triggers.chunks(TRIGGERS_PER_LINE) {
            let line = chunk.join(", ");
            if line.len() <= MAX_MESSAGE_LEN {
                pieces.push(line);
            } else {
                pieces.extend(chunk.iter().cloned());
            }
        }

        let mut messages = Vec::new();
        let mut current = String::from(HELP_HEADING);
        let mut has_content = false;
        for piece in &pieces {
            let mut rest = piece.as_str();
            loop {
                let separator = usize::from(!current.is_empty());
                if current.len() + separator + rest.len() <= MAX_MESSAGE_LEN {
                    if separator == 1 {
                        current.push('\n');
                    }
                    current.push_str(rest);
                    has_content = true;
                    break;
                }
                if has_content {
                    messages.push(std::mem::take(&mut current));
                    has_content = false;
                    continue;
                }

                // Only the heading (or nothing) so far: fill the message with
                // as much of this piece as fits.
                let room = MAX_MESSAGE_LEN.saturating_sub(current.len() + separator);
                let cut = floor_char_boundary(rest, room);
                if cut == 0 {
                    current.clear();
                    continue;
                }
                if separator == 1 {
                    current.push('\n');
                }
                current.push_str(&rest[..cut]);
                messages.push(std::mem::take(&mut current));
                rest = &rest[cut..];
            }
        }
        if has_content {
            messages.push(current);
        }
        messages
    }
}

/// Largest char boundary in `text` at or below `index`.
fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut cut = index.min(text.len());
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> CommandRouter {
        CommandRouter::new("!", [("airhorn", "airhorn"), ("moo", "cow_moo"), ("Cows", "cow_herd")])
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(router().route("hello there"), None);
        assert_eq!(router().route(""), None);
    }

    #[test]
    fn known_trigger_plays_mapped_identifier() {
        let command = router().route("!MOO").unwrap();
        assert_eq!(command.sound(), Some("cow_moo"));
        assert!(command.replies().is_empty());

        assert_eq!(router().route("  !cows \n").unwrap().sound(), Some("cow_herd"));
    }

    #[test]
    fn unknown_trigger_suggests_help() {
        let command = router().route("!nope").unwrap();
        assert_eq!(command.sound(), None);
        match &command {
            Command::Unknown { input, reply } => {
                assert_eq!(input, "!nope");
                assert!(reply.contains("!help"));
            }
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn help_lists_every_trigger_sorted() {
        let command = router().route("!help").unwrap();
        let replies = command.replies();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].ends_with("!airhorn, !cows, !moo"));
    }

    #[test]
    fn help_is_split_into_chat_sized_messages() {
        let sounds: Vec<(String, String)> =
            (0..400).map(|i| (format!("sound_number_{i:04}"), format!("id{i}"))).collect();
        let router = CommandRouter::new("!", sounds);

        let messages = router.help_messages();
        assert!(messages.len() > 1);
        assert!(messages.iter().all(|m| m.len() <= MAX_MESSAGE_LEN));

        let listed = messages.join("\n").matches("!sound_number_").count();
        assert_eq!(listed, 400);
    }

    #[test]
    fn custom_prefix() {
        let router = CommandRouter::new("sb ", [("ding", "ding")]);
        assert_eq!(router.route("sb ding").unwrap().sound(), Some("ding"));
        assert_eq!(router.route("!ding"), None);
        assert_eq!(router.identifier_for("DING"), Some("ding"));
    }

    #[test]
    fn prefix_matches_case_insensitively() {
        let router = CommandRouter::new("SB ", [("ding", "ding")]);
        assert_eq!(router.route("sb ding").unwrap().sound(), Some("ding"));
        assert_eq!(router.route("Sb DING").unwrap().sound(), Some("ding"));

        match router.route("SB nope").unwrap() {
            Command::Unknown { input, reply } => {
                assert_eq!(input, "SB nope");
                assert!(reply.contains("sb help"));
            }
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn oversized_trigger_is_split_across_messages() {
        let long = "x".repeat(2100);
        let router = CommandRouter::new("!", [(long.as_str(), "id")]);

        let messages = router.help_messages();
        assert!(messages.len() >= 2);
        assert!(messages.iter().all(|m| m.len() <= MAX_MESSAGE_LEN));
        assert!(messages[0].starts_with(HELP_HEADING));
        assert_ne!(messages[0].trim_end(), HELP_HEADING.trim_end());

        let listed: usize = messages.iter().map(|m| m.matches('x').count()).sum();
        assert_eq!(listed, 2100);
    }

    #[test]
    fn oversized_line_breaks_at_trigger_boundaries() {
        let triggers: Vec<String> = ["a", "b", "c", "d"].iter().map(|c| c.repeat(600)).collect();
        let router = CommandRouter::new("!", triggers.iter().map(|t| (t.as_str(), "id")));

        let messages = router.help_messages();
        assert!(messages.iter().all(|m| m.len() <= MAX_MESSAGE_LEN));
        for trigger in &triggers {
            let whole = format!("!{trigger}");
            assert!(messages.iter().any(|m| m.contains(&whole)), "trigger split mid-word");
        }
    }

    #[test]
    fn heading_is_never_sent_alone() {
        let long = "y".repeat(MAX_MESSAGE_LEN - 1);
        let router = CommandRouter::new("!", [(long.as_str(), "id"), ("moo", "cow_moo")]);

        let messages = router.help_messages();
        assert!(messages.iter().all(|m| m.len() <= MAX_MESSAGE_LEN));
        assert!(messages.iter().all(|m| m.trim_end() != HELP_HEADING.trim_end()));
        assert!(messages.iter().any(|m| m.contains("!moo")));
    }
}
