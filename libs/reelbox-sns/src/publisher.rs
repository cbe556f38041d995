//! SNS Event Publisher Implementation
//!
//! Publishes domain events as JSON to an SNS topic, with the event type as
//! the `event_type` message attribute so subscribers can filter on it.
//! Without a topic ARN, publishing is a successful no-op.

use std::future::Future;

use aws_config::BehaviorVersion;
use aws_sdk_sns::{config::Region, types::MessageAttributeValue, Client};
use reelbox_domain::{ports::EventPublisher, video::DomainEvent, video::Result, VideoError};
use tracing::{debug, error, info, info_span, Instrument};

/// Connection settings for [`SnsEventPublisher`]
#[derive(Debug, Clone)]
pub struct SnsPublisherConfig {
    /// Target topic; blank disables publishing
    pub topic_arn: String,
    pub region: String,
    pub endpoint_url: Option<String>,
}

/// SNS-based implementation of the EventPublisher port
#[derive(Clone)]
pub struct SnsEventPublisher {
    client: Client,
    topic_arn: Option<String>,
}

impl SnsEventPublisher {
    pub fn new(client: Client, topic_arn: impl Into<String>) -> Self {
        let topic_arn = topic_arn.into();
        let topic_arn = (!topic_arn.trim().is_empty()).then_some(topic_arn);

        match &topic_arn {
            Some(arn) => info!(topic_arn = %arn, "Initializing SnsEventPublisher"),
            None => info!("No SNS topic configured, domain events will not be published"),
        }

        Self { client, topic_arn }
    }

    /// Build the client from the default AWS credential chain
    pub async fn connect(config: SnsPublisherConfig) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region));
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        Self::new(Client::new(&shared), config.topic_arn)
    }

    pub fn is_enabled(&self) -> bool {
        self.topic_arn.is_some()
    }
}

impl EventPublisher for SnsEventPublisher {
    fn publish(&self, event: &DomainEvent) -> impl Future<Output = Result<()>> + Send {
        let client = self.client.clone();
        let topic_arn = self.topic_arn.clone();
        let event_type = event.event_type();
        let message = event.to_json();

        let span = info_span!("sns.publish", event_type = event.event_type());

        async move {
            let Some(topic_arn) = topic_arn else {
                debug!(event_type, "Skipping publish, no topic configured");
                return Ok(());
            };

            let message = message.map_err(|err| {
                VideoError::publish(format!("Failed to encode {} event: {}", event_type, err))
            })?;
            let attribute = MessageAttributeValue::builder()
                .data_type("String")
                .string_value(event_type)
                .build()
                .map_err(|err| {
                    VideoError::publish(format!("Failed to build event_type attribute: {}", err))
                })?;

            match client
                .publish()
                .topic_arn(&topic_arn)
                .message(message)
                .message_attributes("event_type", attribute)
                .send()
                .await
            {
                Ok(output) => {
                    info!(
                        event_type,
                        message_id = ?output.message_id(),
                        "Published domain event"
                    );
                    Ok(())
                }
                Err(err) => {
                    error!(event_type, error = ?err, "Failed to publish domain event");
                    Err(VideoError::publish(format!(
                        "SNS publish to '{}' failed: {}",
                        topic_arn, err
                    )))
                }
            }
        }
        .instrument(span)
    }
}
