use super::{BoxedResourceHandleProvider, RedisCommunicationFactory};
use async_trait::async_trait;
use jatsl::{Job, JobManager};
use library::communication::event::{ConsumerExt, ConsumerGroupDescriptor};
use library::communication::CommunicationFactory;
use library::EmptyResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::error;

/// Delay between two consume sessions after a failure
const SESSION_RESTART_DELAY: Duration = Duration::from_secs(5);

/// Structure which can be instantiated with a [`CommunicationFactory`]
pub trait Service<F: CommunicationFactory + Send + Sync> {
    /// Name of the service displayed in log messages
    const NAME: &'static str;
    /// Instance type which will be instantiated
    type Instance: Send + Sync;
    /// Configuration type passed to the service
    type Config: Send + Sync;

    /// Creates a new instance which could be of a different type
    fn instantiate(factory: F, config: &Self::Config) -> Self::Instance;
}

/// Runner for [`Service`] implementations where [`Service::Instance`] is conforming to the [`ConsumerExt`] trait
///
/// Consume sessions run forever. When one ends with an error (lost
/// connection, failed entry), the runner logs it, sleeps for a fixed
/// interval and opens a fresh session which resumes with the pending
/// entries of the consumer group. Infrastructure failures therefore never
/// propagate past this job; the scheduler above only steps in when a
/// monitored connection resource reports its own death.
pub struct ServiceRunner<S: Service<RedisCommunicationFactory>> {
    redis_url: String,
    group: ConsumerGroupDescriptor,
    consumer: String,
    config: <S as Service<RedisCommunicationFactory>>::Config,
}

impl<S> ServiceRunner<S>
where
    S: Service<RedisCommunicationFactory>,
    S::Instance: ConsumerExt + Send + Sync,
{
    /// Creates a new runner job which will connect to the given redis server and use the provided consumer group and name.
    pub fn new(
        redis_url: String,
        group: ConsumerGroupDescriptor,
        consumer: String,
        config: <S as Service<RedisCommunicationFactory>>::Config,
    ) -> Self {
        Self {
            redis_url,
            group,
            consumer,
            config,
        }
    }
}

#[async_trait]
impl<S> Job for ServiceRunner<S>
where
    S: Service<RedisCommunicationFactory> + Send + Sync,
    S::Instance: ConsumerExt,
{
    const NAME: &'static str = "ServiceRunner";

    fn name(&self) -> String {
        format!("{}({})", Self::NAME, S::NAME)
    }

    async fn execute(&self, manager: JobManager) -> EmptyResult {
        let handle_provider: BoxedResourceHandleProvider = Arc::new(manager.clone());
        let factory =
            RedisCommunicationFactory::new(self.redis_url.clone(), handle_provider.clone());
        let service = S::instantiate(
            RedisCommunicationFactory::new(self.redis_url.clone(), handle_provider),
            &self.config,
        );

        manager.ready().await;

        loop {
            let provider = factory.queue_provider();

            if let Err(error) = service
                .consume_queue(provider, &self.group, &self.consumer)
                .await
            {
                error!(
                    ?error,
                    "Consume session failed, restarting in {:?}", SESSION_RESTART_DELAY
                );
            }

            sleep(SESSION_RESTART_DELAY).await;
        }
    }
}
