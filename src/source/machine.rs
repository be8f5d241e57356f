//! Pull/fetch coordination state machine

use crate::decode::PageDecoder;
use crate::error::{Error, Result};
use crate::request::{RequestBuilder, ScrollRequest};
use crate::types::{FetchOutcome, ScrollPage, ScrollRecord};
use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;

/// An external event entering the machine.
///
/// Fetch success and fetch failure arrive as two variants of one event so
/// the handler stays total over everything the outside world can send.
#[derive(Debug)]
pub(crate) enum SourceEvent {
    /// Downstream signals readiness for the next item
    Pull,
    /// A dispatched fetch completed, with body bytes or a transport error
    Fetch(Result<Bytes>),
}

/// What the machine wants done in response to an event, in order
#[derive(Debug)]
pub(crate) enum Effect<T> {
    /// Start a fetch
    Dispatch(ScrollRequest),
    /// Forward records downstream, in order
    Emit(Vec<ScrollRecord<T>>),
    /// Signal normal completion
    Complete,
    /// Signal terminal failure
    Fail(Error),
}

/// The pull/fetch coordination core.
///
/// Owns the pagination cursor, the in-flight-fetch flag, the pending-pull
/// flag, and an at-most-one-page prefetch buffer. Pure and synchronous:
/// events go in, effects come out, and all mutation happens inside
/// [`handle`](Self::handle) on the single task that owns the machine.
pub(crate) struct SourceMachine<T> {
    builder: RequestBuilder,
    decoder: Arc<dyn PageDecoder<T>>,
    /// Latest continuation cursor; `None` until the first page decodes
    cursor: Option<String>,
    /// At most one fetch is outstanding
    fetch_in_flight: bool,
    /// At most one downstream pull is unsatisfied
    pull_pending: bool,
    /// At most one page fetched ahead of demand
    buffered: Option<FetchOutcome<T>>,
    /// The aggregations payload is surfaced at most once
    aggregate_emitted: bool,
    /// Terminal latch; once set every further event is a no-op
    finished: bool,
}

impl<T> SourceMachine<T> {
    pub(crate) fn new(builder: RequestBuilder, decoder: Arc<dyn PageDecoder<T>>) -> Self {
        Self {
            builder,
            decoder,
            cursor: None,
            fetch_in_flight: false,
            pull_pending: false,
            buffered: None,
            aggregate_emitted: false,
            finished: false,
        }
    }

    /// Run one event through the machine
    pub(crate) fn handle(&mut self, event: SourceEvent) -> Vec<Effect<T>> {
        match event {
            SourceEvent::Pull => self.on_pull(),
            SourceEvent::Fetch(Ok(body)) => self.on_fetch_success(&body),
            SourceEvent::Fetch(Err(error)) => self.on_fetch_failure(error),
        }
    }

    fn on_pull(&mut self) -> Vec<Effect<T>> {
        if self.finished {
            return Vec::new();
        }

        if let Some(outcome) = self.buffered.take() {
            // Prefetched page: deliver it now and refill the buffer slot
            let mut effects = Vec::new();
            let proceed = self.process(outcome, &mut effects);
            if proceed && !self.fetch_in_flight {
                self.start_fetch(&mut effects);
            }
            return effects;
        }

        // A second pull while one is pending is a broken pull contract in
        // the adapter layer, not an external condition
        assert!(
            !self.pull_pending,
            "pull received while a previous pull is still pending"
        );
        self.pull_pending = true;

        let mut effects = Vec::new();
        if !self.fetch_in_flight {
            self.start_fetch(&mut effects);
        }
        effects
    }

    fn on_fetch_success(&mut self, body: &[u8]) -> Vec<Effect<T>> {
        if self.finished {
            debug!("Ignoring fetch completion after termination");
            return Vec::new();
        }
        self.fetch_in_flight = false;

        let outcome = match self.decoder.decode(body) {
            Ok(outcome) => outcome,
            Err(error) => return self.finish(Effect::Fail(error)),
        };

        if self.pull_pending {
            self.pull_pending = false;
            let mut effects = Vec::new();
            let proceed = self.process(outcome, &mut effects);
            if proceed {
                self.start_fetch(&mut effects);
            }
            effects
        } else {
            // No one is waiting yet: hold the page for the next pull and
            // do not fetch further (the prefetch bound is one page)
            debug!("Buffering page fetched ahead of demand");
            self.buffered = Some(outcome);
            Vec::new()
        }
    }

    fn on_fetch_failure(&mut self, error: Error) -> Vec<Effect<T>> {
        if self.finished {
            debug!("Ignoring fetch failure after termination: {error}");
            return Vec::new();
        }
        self.fetch_in_flight = false;
        self.finish(Effect::Fail(error))
    }

    /// Process one decoded outcome under demand.
    ///
    /// Returns whether the scroll continues; effects for downstream are
    /// appended in order, always before any dispatch the caller adds.
    fn process(&mut self, outcome: FetchOutcome<T>, effects: &mut Vec<Effect<T>>) -> bool {
        let page = match outcome {
            FetchOutcome::Error(reason) => {
                self.finished = true;
                effects.push(Effect::Fail(Error::service(reason)));
                return false;
            }
            FetchOutcome::Page(page) => page,
        };

        let ScrollPage {
            cursor,
            records,
            aggregate,
        } = page;

        if !records.is_empty() {
            self.cursor = Some(cursor);
            effects.push(Effect::Emit(records));
            return true;
        }

        match aggregate {
            None => {
                // Empty page: the scroll is exhausted
                self.finished = true;
                effects.push(Effect::Complete);
                false
            }
            Some(_) if self.aggregate_emitted => {
                // The aggregate is computed once per search; a repeat
                // carries nothing new, so the scroll ends here
                self.finished = true;
                effects.push(Effect::Complete);
                false
            }
            Some(aggregate) => {
                self.aggregate_emitted = true;
                let record = ScrollRecord::new(cursor.clone(), aggregate);
                self.cursor = Some(cursor);
                effects.push(Effect::Emit(vec![record]));
                true
            }
        }
    }

    fn start_fetch(&mut self, effects: &mut Vec<Effect<T>>) {
        match self.builder.build(self.cursor.as_deref()) {
            Ok(request) => {
                debug!("Dispatching fetch (cursor: {:?})", self.cursor);
                self.fetch_in_flight = true;
                effects.push(Effect::Dispatch(request));
            }
            Err(error) => {
                // A request that cannot be built fails the stream the same
                // way a failed fetch does
                self.finished = true;
                effects.push(Effect::Fail(error));
            }
        }
    }

    fn finish(&mut self, terminal: Effect<T>) -> Vec<Effect<T>> {
        self.finished = true;
        vec![terminal]
    }
}

#[cfg(test)]
impl<T> SourceMachine<T> {
    pub(crate) fn fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    pub(crate) fn pull_pending(&self) -> bool {
        self.pull_pending
    }

    pub(crate) fn has_buffered(&self) -> bool {
        self.buffered.is_some()
    }

    pub(crate) fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }
}
