//! Notification delivery for ChiParts
//!
//! An order is announced to every configured chat. Deliveries run
//! concurrently and one failing destination never affects the others.

pub mod message;
mod telegram;

pub use message::{order_message, startup_message, ORDER_MARKER};
pub use telegram::{NotificationError, TelegramNotifier};

use chrono::{DateTime, Utc};

/// Outcome of delivering one message to one destination
#[derive(Debug, Clone)]
pub struct DeliveryResult {
    pub chat_id: String,
    pub success: bool,
    pub error: Option<String>,
    pub sent_at: DateTime<Utc>,
}

/// Count the destinations that accepted a message
pub fn accepted_count(results: &[DeliveryResult]) -> usize {
    results.iter().filter(|r| r.success).count()
}

/// Fan-out delivery of a text message
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Send `message` to every destination and wait for all of them to settle.
    ///
    /// Returns one result per destination, in configuration order.
    async fn notify(&self, message: &str) -> Vec<DeliveryResult>;

    /// Number of configured destinations
    fn destinations(&self) -> usize;
}
