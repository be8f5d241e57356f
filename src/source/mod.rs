//! Demand-driven scroll source
//!
//! # Overview
//!
//! The source turns the scroll protocol into a pull-based async stream.
//! Three pieces cooperate:
//!
//! - `SourceMachine`: pure state machine owning the cursor, the
//!   in-flight-fetch flag, the pending-pull flag, and the one-page
//!   prefetch buffer.
//! - `SourceDriver`: single-consumer mailbox loop; pulls and fetch
//!   completions are serialized through one channel, so no state is ever
//!   touched from two tasks.
//! - [`ScrollSource`]: the public entry point, adapting the driver into a
//!   plain `Stream` of records.
//!
//! One page is fetched ahead of demand at most, so network latency for the
//! next page overlaps the consumer's processing of the current one without
//! unbounded buffering.

mod driver;
mod machine;

use crate::config::SourceSettings;
use crate::decode::{JsonPageDecoder, PageDecoder};
use crate::error::Result;
use crate::http::FetchClient;
use crate::request::{RequestBuilder, SearchTarget};
use crate::types::ScrollRecord;
use async_stream::stream;
use driver::{Delivery, SourceDriver};
use futures::stream::Stream;
use machine::{SourceEvent, SourceMachine};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Stream of scroll records, pulled one at a time
pub type ScrollStream<T> = Pin<Box<dyn Stream<Item = Result<ScrollRecord<T>>> + Send>>;

/// A demand-driven source over one scroll context.
///
/// Construction is cheap and makes no request; the scroll starts when the
/// stream is first polled and ends on completion, failure, or drop.
///
/// ```no_run
/// use scrollstream::{HttpFetchClient, ScrollSource, SearchTarget, SourceSettings};
/// use futures::TryStreamExt;
/// use serde_json::{json, Value};
/// use std::sync::Arc;
///
/// # async fn run() -> scrollstream::Result<()> {
/// let client = Arc::new(HttpFetchClient::new("http://localhost:9200")?);
/// let source: ScrollSource<Value> = ScrollSource::new(
///     client,
///     SearchTarget::index("logs"),
///     SourceSettings::default(),
///     json!({"query": {"match_all": {}}}),
/// );
///
/// let mut stream = source.stream();
/// while let Some(record) = stream.try_next().await? {
///     println!("{}: {}", record.id, record.payload);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ScrollSource<T> {
    client: Arc<dyn FetchClient>,
    decoder: Arc<dyn PageDecoder<T>>,
    builder: RequestBuilder,
}

impl<T: DeserializeOwned + Send + 'static> ScrollSource<T> {
    /// Create a source decoding responses with [`JsonPageDecoder`]
    pub fn new(
        client: Arc<dyn FetchClient>,
        target: SearchTarget,
        settings: SourceSettings,
        search_params: Value,
    ) -> Self {
        Self {
            client,
            decoder: Arc::new(JsonPageDecoder::new()),
            builder: RequestBuilder::new(target, settings, search_params),
        }
    }
}

impl<T: Send + 'static> ScrollSource<T> {
    /// Swap in a custom page decoder
    #[must_use]
    pub fn with_decoder(mut self, decoder: Arc<dyn PageDecoder<T>>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Turn the source into a stream of records.
    ///
    /// Nothing runs until the first poll. Each page's records are yielded
    /// in service order; a terminal failure is yielded once as `Err` and
    /// ends the stream.
    pub fn stream(self) -> ScrollStream<T> {
        let Self {
            client,
            decoder,
            builder,
        } = self;

        Box::pin(stream! {
            let (delivery_tx, mut deliveries) = mpsc::channel(1);
            let machine = SourceMachine::new(builder, decoder);
            let (driver, events) = SourceDriver::new(machine, client, delivery_tx);
            tokio::spawn(driver.run());

            loop {
                // One pull per delivery keeps at most one pull pending
                if events.send(SourceEvent::Pull).is_err() {
                    // The driver already terminated, e.g. when a prefetch
                    // failed between pulls; take the terminal delivery it
                    // left behind
                    if let Some(Delivery::Failed(error)) = deliveries.recv().await {
                        yield Err(error);
                    }
                    break;
                }
                match deliveries.recv().await {
                    Some(Delivery::Page(records)) => {
                        for record in records {
                            yield Ok(record);
                        }
                    }
                    Some(Delivery::Failed(error)) => {
                        yield Err(error);
                        break;
                    }
                    Some(Delivery::Completed) | None => break,
                }
            }
        })
    }
}

impl<T> std::fmt::Debug for ScrollSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollSource")
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}
