//! Mailbox loop hosting the state machine

use super::machine::{Effect, SourceEvent, SourceMachine};
use crate::error::Error;
use crate::http::FetchClient;
use crate::types::ScrollRecord;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// What the driver hands to the stream adapter, one per pull
#[derive(Debug)]
pub(crate) enum Delivery<T> {
    /// Records of one page, in order
    Page(Vec<ScrollRecord<T>>),
    /// Terminal failure
    Failed(Error),
    /// Terminal completion
    Completed,
}

/// Single-consumer event loop owning one [`SourceMachine`].
///
/// Pulls from the adapter and fetch completions both land in one mailbox,
/// so every state transition runs on this task and the machine needs no
/// locks. Dispatch effects spawn a fetch whose result is sent back into
/// the same mailbox.
pub(crate) struct SourceDriver<T> {
    machine: SourceMachine<T>,
    client: Arc<dyn FetchClient>,
    events_tx: mpsc::UnboundedSender<SourceEvent>,
    events_rx: mpsc::UnboundedReceiver<SourceEvent>,
    deliveries: mpsc::Sender<Delivery<T>>,
}

impl<T: Send + 'static> SourceDriver<T> {
    /// Create a driver and the sender the adapter pulls through
    pub(crate) fn new(
        machine: SourceMachine<T>,
        client: Arc<dyn FetchClient>,
        deliveries: mpsc::Sender<Delivery<T>>,
    ) -> (Self, mpsc::UnboundedSender<SourceEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let driver = Self {
            machine,
            client,
            events_tx: events_tx.clone(),
            events_rx,
            deliveries,
        };
        (driver, events_tx)
    }

    /// Run until a terminal delivery or until the adapter goes away
    pub(crate) async fn run(mut self) {
        loop {
            let event = tokio::select! {
                event = self.events_rx.recv() => match event {
                    Some(event) => event,
                    None => return,
                },
                // The stream was dropped; in-flight fetches resolve into a
                // closed mailbox and are discarded
                () = self.deliveries.closed() => {
                    debug!("Consumer dropped the stream, stopping the scroll");
                    return;
                }
            };

            for effect in self.machine.handle(event) {
                match effect {
                    Effect::Dispatch(request) => {
                        let client = Arc::clone(&self.client);
                        let events_tx = self.events_tx.clone();
                        tokio::spawn(async move {
                            let result = client.dispatch(request).await;
                            let _ = events_tx.send(SourceEvent::Fetch(result));
                        });
                    }
                    Effect::Emit(records) => {
                        if self.deliveries.send(Delivery::Page(records)).await.is_err() {
                            return;
                        }
                    }
                    Effect::Complete => {
                        let _ = self.deliveries.send(Delivery::Completed).await;
                        return;
                    }
                    Effect::Fail(error) => {
                        let _ = self.deliveries.send(Delivery::Failed(error)).await;
                        return;
                    }
                }
            }
        }
    }
}
