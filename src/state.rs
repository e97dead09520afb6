//! Shared application state

use std::sync::Arc;

use crate::config::Config;
use crate::domain::events::DomainEvent;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Domain events go here when configured
    pub nats: Option<async_nats::Client>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self { store, nats: None, config: Arc::new(config) }
    }

    pub fn with_nats(mut self, client: async_nats::Client) -> Self {
        self.nats = Some(client);
        self
    }

    /// Best effort: failures are logged and never reach the caller.
    pub async fn publish(&self, event: impl Into<DomainEvent>) {
        let Some(client) = &self.nats else { return };
        let event = event.into();
        let subject = format!("{}.{}", self.config.nats_subject_prefix, event.subject());
        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(%subject, error = %e, "failed to encode event");
                return;
            }
        };
        if let Err(e) = client.publish(subject.clone(), payload.into()).await {
            tracing::warn!(%subject, error = %e, "failed to publish event");
        }
    }
}
