//! Controller — the single task that owns the state machine.
//!
//! Sensor events, chat commands and timer expiries all funnel through this
//! task's mailbox, so transitions never interleave. Callers talk to it
//! through a cloneable [`ControllerHandle`].

use std::fmt;
use std::future;

use gdoormon_domain::alert::{AlertEvent, AlertState};
use gdoormon_domain::command::InboundMessage;
use gdoormon_domain::error::GdoormonError;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::alert_machine::AlertStateMachine;
use crate::dispatcher::{CommandDispatcher, Reply};
use crate::ports::{Broadcaster, DoorActuator};

const MAILBOX_CAPACITY: usize = 64;

/// Point-in-time view of the controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    pub state: AlertState,
    /// Seconds until the pending timeout fires, if one is armed.
    pub timeout_in_secs: Option<f64>,
    pub subscribers: usize,
}

enum Input {
    Sensor(AlertEvent),
    Message {
        message: InboundMessage,
        reply: oneshot::Sender<Option<Reply>>,
    },
    Status(oneshot::Sender<Status>),
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(event) => f.debug_tuple("Sensor").field(event).finish(),
            Self::Message { message, .. } => f.debug_tuple("Message").field(message).finish(),
            Self::Status(_) => f.write_str("Status"),
        }
    }
}

/// Owns the state machine and dispatcher; see [`Controller::spawn`].
pub struct Controller<B, A> {
    machine: AlertStateMachine<B, A>,
    dispatcher: CommandDispatcher,
    inbox: mpsc::Receiver<Input>,
}

impl<B, A> Controller<B, A>
where
    B: Broadcaster + Send + 'static,
    A: DoorActuator + Send + 'static,
{
    /// Start the controller task. It stops once every handle is dropped.
    pub fn spawn(
        machine: AlertStateMachine<B, A>,
        dispatcher: CommandDispatcher,
    ) -> (ControllerHandle, JoinHandle<()>) {
        let (tx, inbox) = mpsc::channel(MAILBOX_CAPACITY);
        let controller = Self {
            machine,
            dispatcher,
            inbox,
        };
        let task = tokio::spawn(controller.run());
        (ControllerHandle { tx }, task)
    }

    async fn run(mut self) {
        tracing::info!(state = %self.machine.state(), "controller started");
        loop {
            let deadline = self.machine.next_deadline();
            tokio::select! {
                biased;
                () = sleep_until(deadline) => {
                    self.machine.fire_due();
                }
                input = self.inbox.recv() => {
                    let Some(input) = input else { break };
                    // Anything already due happened before this input.
                    self.machine.fire_due();
                    self.handle(input);
                }
            }
        }
        tracing::info!("controller stopped");
    }

    fn handle(&mut self, input: Input) {
        match input {
            Input::Sensor(event) => {
                self.machine.handle(event);
            }
            Input::Message { message, reply } => {
                let outcome = self.dispatcher.on_message(&mut self.machine, &message);
                let _ = reply.send(outcome);
            }
            Input::Status(reply) => {
                let _ = reply.send(Status {
                    state: self.machine.state(),
                    timeout_in_secs: self.machine.pending_remaining().map(|d| d.as_secs_f64()),
                    subscribers: self.dispatcher.registry().len(),
                });
            }
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}

/// Cloneable sender side of the controller mailbox.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    tx: mpsc::Sender<Input>,
}

impl ControllerHandle {
    /// # Errors
    ///
    /// Returns [`GdoormonError::Unavailable`] if the controller has stopped.
    pub async fn door_opened(&self) -> Result<(), GdoormonError> {
        self.send_event(AlertEvent::DoorOpened).await
    }

    /// # Errors
    ///
    /// Returns [`GdoormonError::Unavailable`] if the controller has stopped.
    pub async fn door_closed(&self) -> Result<(), GdoormonError> {
        self.send_event(AlertEvent::DoorClosed).await
    }

    /// # Errors
    ///
    /// Returns [`GdoormonError::Unavailable`] if the controller has stopped.
    pub async fn someone_home(&self) -> Result<(), GdoormonError> {
        self.send_event(AlertEvent::SomeoneHome).await
    }

    /// # Errors
    ///
    /// Returns [`GdoormonError::Unavailable`] if the controller has stopped.
    pub async fn everyone_left(&self) -> Result<(), GdoormonError> {
        self.send_event(AlertEvent::EveryoneLeft).await
    }

    /// Queue a sensor event. Does not wait for it to be applied.
    ///
    /// # Errors
    ///
    /// Returns [`GdoormonError::Unavailable`] if the controller has stopped.
    pub async fn send_event(&self, event: AlertEvent) -> Result<(), GdoormonError> {
        self.tx
            .send(Input::Sensor(event))
            .await
            .map_err(|_| GdoormonError::Unavailable)
    }

    /// Run an inbound chat message through the dispatcher and wait for the reply.
    ///
    /// # Errors
    ///
    /// Returns [`GdoormonError::Unavailable`] if the controller has stopped.
    pub async fn dispatch(&self, message: InboundMessage) -> Result<Option<Reply>, GdoormonError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Input::Message { message, reply })
            .await
            .map_err(|_| GdoormonError::Unavailable)?;
        rx.await.map_err(|_| GdoormonError::Unavailable)
    }

    /// # Errors
    ///
    /// Returns [`GdoormonError::Unavailable`] if the controller has stopped.
    pub async fn status(&self) -> Result<Status, GdoormonError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Input::Status(reply))
            .await
            .map_err(|_| GdoormonError::Unavailable)?;
        rx.await.map_err(|_| GdoormonError::Unavailable)
    }
}
