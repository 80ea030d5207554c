use super::super::super::EmptyResult;
use super::Notification;
use super::ConsumerGroupDescriptor;
use super::{QueueEntry, QueueProvider, RawQueueEntry};
use async_trait::async_trait;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::any::type_name;
use std::time::Duration;
use tracing::{error, warn};

/// Entries are fetched one at a time so that order-sensitive processing is
/// never run concurrently within a single consumer instance.
const PREFETCH_LIMIT: usize = 1;
const DEFAULT_IDLE_TIMEOUT: Option<Duration> = None;

/// Entity which may consume and process [`Notifications`](Notification)
#[async_trait]
pub trait Consumer {
    /// Notification to consume
    type Notification: Notification;

    /// Processes an event notification and returns whether it succeeded or failed
    ///
    /// Implementations are expected to resolve business-level failures
    /// internally and return `Ok(())` for them; an `Err(_)` is reserved for
    /// infrastructure failures where the entry must be redelivered later.
    async fn consume(&self, notification: Self::Notification) -> EmptyResult;
}

/// Helper functions to aid the consumption of messages
#[async_trait]
pub trait ConsumerExt {
    /// Consumes notifications from a queue using the given provider,
    /// acknowledging each entry according to its outcome:
    ///
    /// - Successfully processed entries are acknowledged.
    /// - Entries whose payload can not be deserialized are acknowledged as
    ///   well; they would fail identically on every redelivery and must
    ///   not wedge the queue.
    /// - A processing failure terminates the session with the entry left
    ///   unacknowledged. It stays in the group's pending list and is
    ///   redelivered, in order, once the session restarts.
    async fn consume_queue<Q>(
        &self,
        provider: Q,
        group: &ConsumerGroupDescriptor,
        consumer: &str, // &ConsumerIdentifier
    ) -> EmptyResult
    where
        Q: QueueProvider + Send + Sync;
}

#[async_trait]
impl<C> ConsumerExt for C
where
    C: Consumer + Send + Sync,
    C::Notification: DeserializeOwned + Send + Sync,
{
    async fn consume_queue<Q>(
        &self,
        provider: Q,
        group: &ConsumerGroupDescriptor,
        consumer: &str, // &ConsumerIdentifier
    ) -> EmptyResult
    where
        Q: QueueProvider + Send + Sync,
    {
        let mut stream = provider
            .consume(
                C::Notification::queue(),
                group,
                consumer,
                PREFETCH_LIMIT,
                DEFAULT_IDLE_TIMEOUT,
            )
            .await?;

        while let Some(item) = stream.next().await {
            let mut entry = item?;

            let notification = match entry.parse_payload::<C::Notification>() {
                Ok(notification) => notification,
                Err(error) => {
                    warn!(
                        ?error,
                        "Discarding entry that failed to deserialize as {}",
                        type_name::<C::Notification>()
                    );
                    entry.acknowledge().await?;
                    continue;
                }
            };

            if let Err(error) = self.consume(notification).await {
                error!(
                    ?error,
                    "Failed to consume {}, leaving entry for redelivery",
                    type_name::<C::Notification>()
                );
                return Err(error);
            }

            entry.acknowledge().await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod does {
    use super::super::QueueDescriptor;
    use super::*;
    use crate::communication::implementation::json::JsonQueueEntry;
    use crate::BoxedError;
    use futures::stream::{self, BoxStream};
    use serde::{Deserialize, Serialize};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct CounterNotification {
        value: i64,
    }

    impl Notification for CounterNotification {
        fn queue() -> QueueDescriptor {
            QueueDescriptor::new("counter".into(), 42)
        }
    }

    struct StaticEntry {
        payload: Vec<u8>,
        acked: Arc<AtomicBool>,
    }

    #[async_trait]
    impl RawQueueEntry for StaticEntry {
        fn payload(&self) -> &[u8] {
            &self.payload
        }

        async fn acknowledge(&mut self) -> EmptyResult {
            self.acked.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    impl JsonQueueEntry for StaticEntry {}

    struct StaticQueueProvider {
        entries: Mutex<Vec<StaticEntry>>,
    }

    impl StaticQueueProvider {
        fn new(payloads: &[&str]) -> (Self, Vec<Arc<AtomicBool>>) {
            let flags: Vec<_> = payloads.iter().map(|_| Arc::new(AtomicBool::new(false))).collect();
            let entries = payloads
                .iter()
                .zip(flags.iter())
                .map(|(payload, acked)| StaticEntry {
                    payload: payload.as_bytes().to_vec(),
                    acked: acked.clone(),
                })
                .collect();

            (
                Self {
                    entries: Mutex::new(entries),
                },
                flags,
            )
        }
    }

    #[async_trait]
    impl QueueProvider for StaticQueueProvider {
        type Entry = StaticEntry;

        async fn consume(
            &self,
            _queue: QueueDescriptor,
            _group: &ConsumerGroupDescriptor,
            _consumer: &str,
            _batch_size: usize,
            _idle_timeout: Option<Duration>,
        ) -> Result<BoxStream<Result<Self::Entry, BoxedError>>, BoxedError> {
            let entries: Vec<_> = self.entries.lock().unwrap().drain(..).collect();
            Ok(stream::iter(entries.into_iter().map(Ok)).boxed())
        }
    }

    #[derive(Default)]
    struct CountingConsumer {
        seen: Mutex<Vec<i64>>,
        fail_on: Option<i64>,
    }

    #[async_trait]
    impl Consumer for CountingConsumer {
        type Notification = CounterNotification;

        async fn consume(&self, notification: Self::Notification) -> EmptyResult {
            if self.fail_on == Some(notification.value) {
                return Err("store went away".into());
            }

            self.seen.lock().unwrap().push(notification.value);
            Ok(())
        }
    }

    #[tokio::test]
    async fn acknowledge_processed_entries() {
        let (provider, acked) = StaticQueueProvider::new(&[r#"{"value":1}"#, r#"{"value":2}"#]);
        let consumer = CountingConsumer::default();

        consumer
            .consume_queue(provider, &ConsumerGroupDescriptor::default(), "test")
            .await
            .unwrap();

        assert_eq!(*consumer.seen.lock().unwrap(), vec![1, 2]);
        assert!(acked.iter().all(|flag| flag.load(Ordering::SeqCst)));
    }

    #[tokio::test]
    async fn discard_undeserializable_entries() {
        let (provider, acked) = StaticQueueProvider::new(&["not-json", r#"{"value":7}"#]);
        let consumer = CountingConsumer::default();

        consumer
            .consume_queue(provider, &ConsumerGroupDescriptor::default(), "test")
            .await
            .unwrap();

        assert_eq!(*consumer.seen.lock().unwrap(), vec![7]);
        assert!(acked[0].load(Ordering::SeqCst));
        assert!(acked[1].load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn leave_failed_entries_unacknowledged() {
        let (provider, acked) = StaticQueueProvider::new(&[r#"{"value":1}"#, r#"{"value":2}"#]);
        let consumer = CountingConsumer {
            fail_on: Some(1),
            ..Default::default()
        };

        let result = consumer
            .consume_queue(provider, &ConsumerGroupDescriptor::default(), "test")
            .await;

        assert!(result.is_err());
        assert!(consumer.seen.lock().unwrap().is_empty());
        assert!(!acked[0].load(Ordering::SeqCst));
        assert!(!acked[1].load(Ordering::SeqCst));
    }
}
