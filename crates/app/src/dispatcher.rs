//! Command dispatcher — turns inbound chat text into replies.
//!
//! Local commands (`help`, `subscribe`, `unsubscribe`, `snooze`, `status`)
//! are handled here; every other verb is forwarded to the state machine as a
//! `command_<verb>` event, but only for subscribers. All user-facing failures
//! are reply text. The only silent outcome is a dropped message.

use std::time::Duration;

use gdoormon_domain::alert::AlertState;
use gdoormon_domain::command::{Command, CommandMessage, Ignored, InboundMessage, LocalCommand};
use gdoormon_domain::identity::Identity;
use serde::Serialize;

use crate::subscribers::SubscriberRegistry;
use crate::timer::MAX_DELAY;

/// Usage text returned by `help`.
pub const HELP_TEXT: &str = "commands:\n\
    \x20 help                  show this text\n\
    \x20 subscribe <password>  receive door alerts\n\
    \x20 unsubscribe           stop receiving door alerts\n\
    \x20 status                show the door state\n\
    \x20 snooze [minutes]      delay the pending timeout\n\
    \x20 close_door            close the door now";

const NOT_SUBSCRIBED: &str = "not subscribed; send subscribe <password>";
const SUBSCRIBE_USAGE: &str = "usage: subscribe <password>";

/// What the dispatcher needs from the state machine.
pub trait AlertCommands {
    /// Current state, for `status`.
    fn state(&self) -> AlertState;

    /// Whether the event `name` is valid in the current state.
    fn can(&self, name: &str) -> bool;

    /// Apply a forwarded command event and describe the outcome.
    fn invoke(&mut self, name: &str, sender: &Identity, args: &[String]) -> String;

    /// Push back the pending timer. Empty when subscribers were notified.
    fn snooze_alert(&mut self, duration: Duration) -> String;
}

/// Text to send back to the full sender identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub to: Identity,
    pub body: String,
}

/// Routes parsed commands to local handlers or the state machine.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    registry: SubscriberRegistry,
    password: String,
    default_snooze: Duration,
}

impl CommandDispatcher {
    #[must_use]
    pub fn new(
        registry: SubscriberRegistry,
        password: impl Into<String>,
        default_snooze: Duration,
    ) -> Self {
        Self {
            registry,
            password: password.into(),
            default_snooze,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &SubscriberRegistry {
        &self.registry
    }

    /// Handle one inbound message. `None` means the message was dropped and
    /// no reply must be sent.
    pub fn on_message<M: AlertCommands>(
        &self,
        machine: &mut M,
        message: &InboundMessage,
    ) -> Option<Reply> {
        let command = match CommandMessage::parse(message) {
            Ok(command) => command,
            Err(err @ (Ignored::BadSender(_) | Ignored::NotChat)) => {
                tracing::warn!(from = %message.from, error = %err, "dropping message");
                return None;
            }
            Err(err) => {
                tracing::debug!(from = %message.from, reason = %err, "ignoring message");
                return None;
            }
        };
        tracing::info!(sender = %command.sender, verb = %command.command, "command received");

        let body = self.dispatch(machine, &command);
        Some(Reply {
            to: command.sender,
            body,
        })
    }

    fn dispatch<M: AlertCommands>(&self, machine: &mut M, command: &CommandMessage) -> String {
        let bare = command.sender.bare();
        match Command::resolve(&command.command) {
            Command::Local(local) if local.requires_subscription() && !self.registry.contains(bare) => {
                format!("{bare} is not subscribed")
            }
            Command::Local(LocalCommand::Help) => HELP_TEXT.to_string(),
            Command::Local(LocalCommand::Subscribe) => self.subscribe(command),
            Command::Local(LocalCommand::Unsubscribe) => {
                self.registry.remove(bare);
                format!("{bare} unsubscribed")
            }
            Command::Local(LocalCommand::Snooze) => match self.snooze_duration(command) {
                Ok(duration) => machine.snooze_alert(duration),
                Err(reply) => reply,
            },
            Command::Local(LocalCommand::Status) => machine.state().to_string(),
            Command::Forwarded(_) if !self.registry.contains(bare) => NOT_SUBSCRIBED.to_string(),
            Command::Forwarded(name) if machine.can(&name) => {
                machine.invoke(&name, &command.sender, &command.args)
            }
            Command::Forwarded(name) => {
                tracing::info!(command = %name, state = %machine.state(), "command rejected");
                "bad command".to_string()
            }
        }
    }

    fn subscribe(&self, command: &CommandMessage) -> String {
        let Some(password) = command.first_arg() else {
            return SUBSCRIBE_USAGE.to_string();
        };
        if password != self.password {
            tracing::warn!(sender = %command.sender, "subscribe with bad password");
            return "bad password".to_string();
        }
        let bare = command.sender.bare().clone();
        let reply = format!("{bare} subscribed");
        self.registry.add(bare);
        reply
    }

    fn snooze_duration(&self, command: &CommandMessage) -> Result<Duration, String> {
        let Some(token) = command.first_arg() else {
            return Ok(self.default_snooze);
        };
        token
            .parse::<f64>()
            .ok()
            .and_then(|minutes| Duration::try_from_secs_f64(minutes * 60.0).ok())
            .filter(|duration| *duration <= MAX_DELAY)
            .ok_or_else(|| format!("cannot parse \"{token}\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdoormon_domain::command::MessageKind;

    const PASSWORD: &str = "correctpass";

    #[derive(Default)]
    struct FakeMachine {
        state: AlertState,
        accepts: Vec<&'static str>,
        invoked: Vec<(String, String, Vec<String>)>,
        snoozed: Vec<Duration>,
    }

    impl AlertCommands for FakeMachine {
        fn state(&self) -> AlertState {
            self.state
        }

        fn can(&self, name: &str) -> bool {
            self.accepts.contains(&name)
        }

        fn invoke(&mut self, name: &str, sender: &Identity, args: &[String]) -> String {
            self.invoked
                .push((name.to_string(), sender.to_string(), args.to_vec()));
            self.state = AlertState::DoorClosing;
            "closing the door".to_string()
        }

        fn snooze_alert(&mut self, duration: Duration) -> String {
            self.snoozed.push(duration);
            String::new()
        }
    }

    fn make_dispatcher() -> CommandDispatcher {
        CommandDispatcher::new(
            SubscriberRegistry::new(),
            PASSWORD,
            Duration::from_secs(20 * 60),
        )
    }

    fn send(
        dispatcher: &CommandDispatcher,
        machine: &mut FakeMachine,
        from: &str,
        body: &str,
    ) -> Option<String> {
        dispatcher
            .on_message(machine, &InboundMessage::chat(from, body))
            .map(|reply| reply.body)
    }

    fn subscribed(from: &str) -> (CommandDispatcher, FakeMachine) {
        let dispatcher = make_dispatcher();
        let mut machine = FakeMachine::default();
        send(&dispatcher, &mut machine, from, &format!("subscribe {PASSWORD}"));
        (dispatcher, machine)
    }

    #[test]
    fn should_reject_bad_password_then_subscribe_bare_identity() {
        let dispatcher = make_dispatcher();
        let mut machine = FakeMachine::default();

        let reply = send(&dispatcher, &mut machine, "a@x/res", "subscribe wrongpass");
        assert_eq!(reply.as_deref(), Some("bad password"));
        assert!(dispatcher.registry().is_empty());

        let reply = send(&dispatcher, &mut machine, "a@x/res", "subscribe correctpass");
        assert_eq!(reply.as_deref(), Some("a@x subscribed"));
        assert!(dispatcher.registry().contains(&"a@x".parse().unwrap()));
        assert_eq!(dispatcher.registry().len(), 1);
    }

    #[test]
    fn should_reply_to_full_sender_identity() {
        let dispatcher = make_dispatcher();
        let mut machine = FakeMachine::default();
        let reply = dispatcher
            .on_message(&mut machine, &InboundMessage::chat("a@x/phone", "help"))
            .unwrap();
        assert_eq!(reply.to.to_string(), "a@x/phone");
        assert_eq!(reply.body, HELP_TEXT);
    }

    #[test]
    fn should_ask_for_password_when_subscribe_has_none() {
        let dispatcher = make_dispatcher();
        let mut machine = FakeMachine::default();
        let reply = send(&dispatcher, &mut machine, "a@x", "subscribe");
        assert_eq!(reply.as_deref(), Some("usage: subscribe <password>"));
        assert!(dispatcher.registry().is_empty());
    }

    #[test]
    fn should_refuse_forwarded_command_when_not_subscribed() {
        let dispatcher = make_dispatcher();
        let mut machine = FakeMachine {
            state: AlertState::Alerting,
            accepts: vec!["command_close_door"],
            ..FakeMachine::default()
        };
        let reply = send(&dispatcher, &mut machine, "a@x/res", "close_door");
        assert_eq!(
            reply.as_deref(),
            Some("not subscribed; send subscribe <password>")
        );
        assert!(machine.invoked.is_empty());
        assert_eq!(machine.state, AlertState::Alerting);
    }

    #[test]
    fn should_forward_command_with_sender_and_args_when_subscribed() {
        let (dispatcher, mut machine) = subscribed("a@x/laptop");
        machine.accepts = vec!["command_close_door"];

        let reply = send(&dispatcher, &mut machine, "a@x/phone", "Close_Door now please");
        assert_eq!(reply.as_deref(), Some("closing the door"));
        assert_eq!(
            machine.invoked,
            vec![(
                "command_close_door".to_string(),
                "a@x/phone".to_string(),
                vec!["now".to_string(), "please".to_string()],
            )]
        );
    }

    #[test]
    fn should_reply_bad_command_when_machine_refuses_event() {
        let (dispatcher, mut machine) = subscribed("a@x");
        let reply = send(&dispatcher, &mut machine, "a@x", "open_sesame");
        assert_eq!(reply.as_deref(), Some("bad command"));
        assert!(machine.invoked.is_empty());
    }

    #[test]
    fn should_gate_status_snooze_and_unsubscribe() {
        let dispatcher = make_dispatcher();
        let mut machine = FakeMachine::default();
        for body in ["status", "snooze", "unsubscribe"] {
            let reply = send(&dispatcher, &mut machine, "a@x/res", body);
            assert_eq!(reply.as_deref(), Some("a@x is not subscribed"), "{body}");
        }
        assert!(machine.snoozed.is_empty());
    }

    #[test]
    fn should_report_state_name_on_status() {
        let (dispatcher, mut machine) = subscribed("a@x");
        machine.state = AlertState::DoorOpen;
        let reply = send(&dispatcher, &mut machine, "a@x", "STATUS");
        assert_eq!(reply.as_deref(), Some("door_open"));
    }

    #[test]
    fn should_unsubscribe_and_then_refuse_again() {
        let (dispatcher, mut machine) = subscribed("a@x/one");
        let reply = send(&dispatcher, &mut machine, "a@x/two", "unsubscribe");
        assert_eq!(reply.as_deref(), Some("a@x unsubscribed"));
        assert!(dispatcher.registry().is_empty());

        let reply = send(&dispatcher, &mut machine, "a@x/two", "unsubscribe");
        assert_eq!(reply.as_deref(), Some("a@x is not subscribed"));
    }

    #[test]
    fn should_snooze_for_default_duration_without_argument() {
        let (dispatcher, mut machine) = subscribed("a@x");
        let reply = send(&dispatcher, &mut machine, "a@x", "snooze");
        assert_eq!(reply.as_deref(), Some(""));
        assert_eq!(machine.snoozed, vec![Duration::from_secs(1200)]);
    }

    #[test]
    fn should_snooze_for_fractional_minutes() {
        let (dispatcher, mut machine) = subscribed("a@x");
        send(&dispatcher, &mut machine, "a@x", "snooze 1.5");
        send(&dispatcher, &mut machine, "a@x", "snooze 0");
        assert_eq!(
            machine.snoozed,
            vec![Duration::from_secs(90), Duration::ZERO]
        );
    }

    #[test]
    fn should_refuse_unparseable_snooze_duration() {
        let (dispatcher, mut machine) = subscribed("a@x");
        for token in ["soon", "-5", "NaN", "inf"] {
            let reply = send(&dispatcher, &mut machine, "a@x", &format!("snooze {token}"));
            assert_eq!(reply, Some(format!("cannot parse \"{token}\"")));
        }
        assert!(machine.snoozed.is_empty());
    }

    #[test]
    fn should_refuse_snooze_longer_than_a_year() {
        let (dispatcher, mut machine) = subscribed("a@x");
        for token in ["200000000000000000", "525601", "1e300"] {
            let reply = send(&dispatcher, &mut machine, "a@x", &format!("snooze {token}"));
            assert_eq!(reply, Some(format!("cannot parse \"{token}\"")));
        }
        send(&dispatcher, &mut machine, "a@x", "snooze 525600");
        assert_eq!(machine.snoozed, vec![MAX_DELAY]);
    }

    #[test]
    fn should_drop_messages_that_are_not_commands() {
        let dispatcher = make_dispatcher();
        let mut machine = FakeMachine::default();

        let not_chat = InboundMessage {
            from: "a@x".to_string(),
            kind: MessageKind::Other,
            body: Some("help".to_string()),
        };
        assert!(dispatcher.on_message(&mut machine, &not_chat).is_none());
        assert!(send(&dispatcher, &mut machine, "a@x", "   ").is_none());
        assert!(send(&dispatcher, &mut machine, "a@x/", "subscribe correctpass").is_none());
        assert!(send(&dispatcher, &mut machine, "not an address", "help").is_none());
        assert!(dispatcher.registry().is_empty());
    }
}
