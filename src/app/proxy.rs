//! Defines an abstraction over the event sending mechanism.

use super::events::PipelineEvent;
use tokio::sync::mpsc::UnboundedSender;

/// A trait that abstracts the sending of pipeline events.
/// This is "fire-and-forget" and doesn't return a result, simplifying its use.
pub trait EventProxy: Send + Sync + Clone + 'static {
    fn send_event(&self, event: PipelineEvent);
}

/// Implement the trait for a plain tokio channel, which is what the CLI uses.
impl EventProxy for UnboundedSender<PipelineEvent> {
    fn send_event(&self, event: PipelineEvent) {
        // A closed receiver means nobody is listening any more; the pipeline keeps going.
        if let Err(e) = self.send(event) {
            tracing::warn!("Failed to send pipeline event: {}", e);
        }
    }
}
