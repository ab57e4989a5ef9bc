//! Event-stream publishing behind a trait, so the pipeline can be exercised
//! against a recording double instead of a live broker.

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Publish one message to a subject. Delivery is fire-and-forget from the
/// pipeline's point of view; flushing belongs to whoever owns the client.
#[async_trait]
pub trait StreamPublisher: Send + Sync {
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()>;
}

/// Real NATS-backed publisher.
pub struct NatsStreamPublisher {
    client: async_nats::Client,
}

impl NatsStreamPublisher {
    pub fn new(client: async_nats::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StreamPublisher for NatsStreamPublisher {
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()> {
        self.client.publish(subject, payload).await?;
        Ok(())
    }
}

/// A message captured by [`TestPublisher`].
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub subject: String,
    pub payload: Bytes,
}

/// Recording publisher that lets tests inspect what would have gone to the
/// broker.
#[cfg(test)]
#[derive(Default)]
pub struct TestPublisher {
    published: std::sync::RwLock<Vec<PublishedMessage>>,
}

#[cfg(test)]
impl TestPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published_messages(&self) -> Vec<PublishedMessage> {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn publish_count(&self) -> usize {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

#[cfg(test)]
#[async_trait]
impl StreamPublisher for TestPublisher {
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()> {
        self.published
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(PublishedMessage { subject, payload });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publisher_records_messages() {
        let publisher = TestPublisher::new();
        publisher
            .publish("properties".to_string(), Bytes::from(r#"{"price":""}"#))
            .await
            .unwrap();

        assert_eq!(publisher.publish_count(), 1);
        let messages = publisher.published_messages();
        assert_eq!(messages[0].subject, "properties");
        assert_eq!(messages[0].payload, Bytes::from(r#"{"price":""}"#));
    }
}
