use std::time::Duration;
use async_trait::async_trait;
use derive_more::Display;
use teloxide::types::UserId;
use crate::{metrics, repo};

/// Minimal interval between two consecutive deliveries to stay within Telegram's rate limits.
pub const PACING_DELAY: Duration = Duration::from_millis(50);
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    Undeliverable,
}

/// Sends one piece of content to a single recipient.
/// Implementations must map every transport error to `Undeliverable`.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn deliver(&self, recipient: UserId) -> DeliveryStatus;
}

#[async_trait]
pub trait RecipientRegistry: Send + Sync {
    async fn list_all(&self) -> anyhow::Result<Vec<UserId>>;
}

#[async_trait]
impl RecipientRegistry for repo::Users {
    async fn list_all(&self) -> anyhow::Result<Vec<UserId>> {
        repo::Users::list_all(self).await
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Display)]
#[display("delivered={delivered}, undeliverable={undeliverable}")]
pub struct BroadcastOutcome {
    pub delivered: u32,
    pub undeliverable: u32,
}

impl BroadcastOutcome {
    fn count(&mut self, status: DeliveryStatus) {
        match status {
            DeliveryStatus::Delivered => {
                metrics::BROADCAST_DELIVERIES.delivered.inc();
                self.delivered += 1
            }
            DeliveryStatus::Undeliverable => {
                metrics::BROADCAST_DELIVERIES.undeliverable.inc();
                self.undeliverable += 1
            }
        }
    }

    pub fn total(&self) -> u32 {
        self.delivered + self.undeliverable
    }
}

#[derive(Clone)]
pub struct Broadcaster<R: RecipientRegistry> {
    registry: R,
}

impl <R: RecipientRegistry> Broadcaster<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// Recipients registered after this call are not included in the broadcast.
    pub async fn snapshot(&self) -> anyhow::Result<Vec<UserId>> {
        self.registry.list_all().await
    }

    /// Delivers the content to every recipient one by one, sleeping for `PACING_DELAY` between attempts.
    /// A failed delivery is counted and never aborts the run.
    pub async fn broadcast(&self, recipients: &[UserId], delivery: &(impl Delivery + ?Sized)) -> BroadcastOutcome {
        log::info!("starting a broadcast to {} recipients", recipients.len());
        let mut outcome = BroadcastOutcome::default();
        for (i, &recipient) in recipients.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(PACING_DELAY).await;
            }
            let status = tokio::time::timeout(DELIVERY_TIMEOUT, delivery.deliver(recipient))
                .await
                .unwrap_or_else(|_| {
                    log::warn!("delivery to {recipient} timed out");
                    DeliveryStatus::Undeliverable
                });
            outcome.count(status);
        }
        log::info!("the broadcast to {} recipients is finished: {outcome}", outcome.total());
        outcome
    }
}
