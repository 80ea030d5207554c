use std::sync::Arc;

use super::{MockNotificationPublisher, MockQueueProvider};
use crate::communication::event::Notification;
use crate::communication::CommunicationFactory;

pub struct MockCommunicationFactory {
    publisher: Arc<MockNotificationPublisher>,
}

impl CommunicationFactory for MockCommunicationFactory {
    type QueueProvider = MockQueueProvider;
    type NotificationPublisher = Arc<MockNotificationPublisher>;

    fn queue_provider(&self) -> Self::QueueProvider {
        MockQueueProvider {}
    }

    fn notification_publisher(&self) -> Self::NotificationPublisher {
        self.publisher.clone()
    }
}

impl Default for MockCommunicationFactory {
    fn default() -> Self {
        Self {
            publisher: Arc::new(MockNotificationPublisher::default()),
        }
    }
}

// Provide shorthands for the publisher methods
impl MockCommunicationFactory {
    pub fn expect<N: Notification + Send + Sync>(&self, notification: &N) -> &Self {
        self.publisher.expect(notification);
        self
    }
}
