//! Broadcaster port — fan a notice out to every subscriber.

use gdoormon_domain::error::GdoormonError;

/// Sends a text notice to all current subscribers.
///
/// Implementations must hand the text off without blocking (queue it for a
/// transport task); the state machine calls this from its single execution
/// context and treats delivery as best-effort.
pub trait Broadcaster {
    /// Queue `text` for every subscriber.
    ///
    /// # Errors
    ///
    /// Returns an error if the notice could not be handed to the transport.
    fn send_all_subscribers(&self, text: &str) -> Result<(), GdoormonError>;
}

impl<T: Broadcaster + ?Sized> Broadcaster for std::sync::Arc<T> {
    fn send_all_subscribers(&self, text: &str) -> Result<(), GdoormonError> {
        (**self).send_all_subscribers(text)
    }
}
