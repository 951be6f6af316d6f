//! Commands — inbound chat text turned into a verb and its arguments.
//!
//! Verbs resolve through an explicit registry: a fixed set of local
//! commands handled by the dispatcher itself, and everything else forwarded
//! to the state machine as a `command_<verb>` event name.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::Identity;

/// Kind of an inbound transport message. Only [`Chat`](Self::Chat) carries commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Chat,
    /// Presence updates, receipts, group chat, errors, …
    Other,
}

/// A message as delivered by a transport, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Raw sender identity, possibly `address/resource`.
    pub from: String,
    #[serde(default)]
    pub kind: MessageKind,
    pub body: Option<String>,
}

impl InboundMessage {
    /// Convenience constructor for a chat message with a body.
    #[must_use]
    pub fn chat(from: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            kind: MessageKind::Chat,
            body: Some(body.into()),
        }
    }
}

/// Why an inbound message produced no command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Ignored {
    #[error("not a chat message")]
    NotChat,

    #[error("message has no body")]
    EmptyBody,

    #[error("unparseable sender identity")]
    BadSender(#[source] ValidationError),
}

/// A tokenized command from a known sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMessage {
    /// Full sender identity, including any resource.
    pub sender: Identity,
    /// Lower-cased verb.
    pub command: String,
    /// Remaining whitespace-split tokens.
    pub args: Vec<String>,
}

impl CommandMessage {
    /// Interpret an inbound message.
    ///
    /// # Errors
    ///
    /// Returns [`Ignored`] when the message is not chat text, has no
    /// non-blank body, or its sender cannot be parsed. Such messages must be
    /// dropped without a reply.
    pub fn parse(message: &InboundMessage) -> Result<Self, Ignored> {
        if message.kind != MessageKind::Chat {
            return Err(Ignored::NotChat);
        }
        let body = message.body.as_deref().ok_or(Ignored::EmptyBody)?;
        let mut tokens = body.split_whitespace();
        let verb = tokens.next().ok_or(Ignored::EmptyBody)?;
        let sender = message.from.parse().map_err(Ignored::BadSender)?;

        Ok(Self {
            sender,
            command: verb.to_lowercase(),
            args: tokens.map(str::to_string).collect(),
        })
    }

    /// First argument, if any.
    #[must_use]
    pub fn first_arg(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// Commands handled by the dispatcher itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalCommand {
    Help,
    Subscribe,
    Unsubscribe,
    Snooze,
    Status,
}

impl LocalCommand {
    /// Whether the sender must already be subscribed.
    #[must_use]
    pub fn requires_subscription(self) -> bool {
        matches!(self, Self::Unsubscribe | Self::Snooze | Self::Status)
    }
}

/// Resolved handler for a verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Local(LocalCommand),
    /// Event name to hand to the state machine, e.g. `command_close_door`.
    Forwarded(String),
}

impl Command {
    /// Resolve a (lower-cased) verb.
    #[must_use]
    pub fn resolve(verb: &str) -> Self {
        match verb {
            "help" => Self::Local(LocalCommand::Help),
            "subscribe" => Self::Local(LocalCommand::Subscribe),
            "unsubscribe" => Self::Local(LocalCommand::Unsubscribe),
            "snooze" => Self::Local(LocalCommand::Snooze),
            "status" => Self::Local(LocalCommand::Status),
            other => Self::Forwarded(format!("command_{other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_split_verb_and_args() {
        let msg = CommandMessage::parse(&InboundMessage::chat("foo", "Test_Command with  args"))
            .unwrap();
        assert_eq!(msg.command, "test_command");
        assert_eq!(msg.args, vec!["with", "args"]);
        assert_eq!(msg.sender.to_string(), "foo");
    }

    #[test]
    fn should_produce_empty_args_when_only_verb() {
        let msg = CommandMessage::parse(&InboundMessage::chat("a@x/res", "  status\n")).unwrap();
        assert_eq!(msg.command, "status");
        assert!(msg.args.is_empty());
        assert_eq!(msg.first_arg(), None);
    }

    #[test]
    fn should_ignore_non_chat_messages() {
        let msg = InboundMessage {
            from: "a@x".to_string(),
            kind: MessageKind::Other,
            body: Some("help".to_string()),
        };
        assert_eq!(CommandMessage::parse(&msg), Err(Ignored::NotChat));
    }

    #[test]
    fn should_ignore_missing_or_blank_body() {
        let missing = InboundMessage {
            from: "a@x".to_string(),
            kind: MessageKind::Chat,
            body: None,
        };
        assert_eq!(CommandMessage::parse(&missing), Err(Ignored::EmptyBody));
        let blank = InboundMessage::chat("a@x", " \t ");
        assert_eq!(CommandMessage::parse(&blank), Err(Ignored::EmptyBody));
    }

    #[test]
    fn should_ignore_unparseable_sender() {
        let msg = InboundMessage::chat("a@x/", "help");
        assert_eq!(
            CommandMessage::parse(&msg),
            Err(Ignored::BadSender(ValidationError::EmptyResource))
        );
    }

    #[test]
    fn should_resolve_local_commands() {
        assert_eq!(Command::resolve("help"), Command::Local(LocalCommand::Help));
        assert_eq!(
            Command::resolve("snooze"),
            Command::Local(LocalCommand::Snooze)
        );
    }

    #[test]
    fn should_forward_unknown_verbs_with_command_prefix() {
        assert_eq!(
            Command::resolve("close_door"),
            Command::Forwarded("command_close_door".to_string())
        );
    }

    #[test]
    fn should_gate_only_unsubscribe_snooze_and_status() {
        assert!(!LocalCommand::Help.requires_subscription());
        assert!(!LocalCommand::Subscribe.requires_subscription());
        assert!(LocalCommand::Unsubscribe.requires_subscription());
        assert!(LocalCommand::Snooze.requires_subscription());
        assert!(LocalCommand::Status.requires_subscription());
    }

    #[test]
    fn should_default_kind_to_chat_when_deserializing() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"from": "a@x/res", "body": "help"}"#).unwrap();
        assert_eq!(msg.kind, MessageKind::Chat);
    }
}
