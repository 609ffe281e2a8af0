//! Order intake
//!
//! Validates a submission, announces it to every destination, records it in
//! the audit log and reports whether anyone received it. The HTTP layer only
//! maps the outcome of [`OrderIntake::submit`] onto responses.

use chrono::Local;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::audit::AuditLog;
use crate::error::{Error, Result};
use crate::models::{format_timestamp, Order, OrderRequest};
use crate::notify::{accepted_count, order_message, startup_message, DeliveryResult, Notifier};

/// Snapshot returned by the stats query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderStats {
    pub total_orders: usize,
    pub last_update: String,
}

/// Handles order submissions end to end
#[derive(Clone)]
pub struct OrderIntake {
    notifier: Arc<dyn Notifier>,
    audit: Arc<AuditLog>,
}

impl OrderIntake {
    /// Create an intake over a notifier and an audit log
    pub fn new(notifier: Arc<dyn Notifier>, audit: Arc<AuditLog>) -> Self {
        Self { notifier, audit }
    }

    /// Process one submission.
    ///
    /// Invalid input is rejected before anything is sent or written. A valid
    /// order is always logged, and the call fails with [`Error::Delivery`]
    /// only when no destination accepted it.
    pub async fn submit(&self, request: OrderRequest) -> Result<Order> {
        let validated = request.validate(Local::now()).map_err(|e| {
            metrics::counter!("chiparts_order_rejections_total").increment(1);
            warn!(error = %e, "Order rejected");
            e
        })?;
        metrics::counter!("chiparts_orders_total").increment(1);

        let message = order_message(&validated);
        let results = self.notifier.notify(&message).await;
        let sent_to = accepted_count(&results);
        record_deliveries(&results, sent_to);

        let order = validated.into_order(sent_to);
        self.audit.append(&order).await;

        if sent_to == 0 {
            error!(attempted = results.len(), "Order was not delivered to any destination");
            return Err(Error::Delivery {
                attempted: results.len(),
            });
        }

        info!(
            sent_to,
            destinations = results.len(),
            part = %order.part_name,
            "Order processed"
        );
        Ok(order)
    }

    /// Count logged orders
    pub async fn stats(&self) -> Result<OrderStats> {
        let total_orders = self.audit.count_marker().await?;
        Ok(OrderStats {
            total_orders,
            last_update: format_timestamp(Local::now()),
        })
    }

    /// Tell every destination the server is up
    pub async fn announce_startup(&self, port: u16, public_url: &str) -> Vec<DeliveryResult> {
        let message = startup_message(&format_timestamp(Local::now()), port, public_url);
        let results = self.notifier.notify(&message).await;

        let accepted = accepted_count(&results);
        if accepted == 0 {
            error!("Start-up notification was not delivered");
        } else {
            info!(accepted, destinations = results.len(), "Start-up notification sent");
        }
        results
    }

    /// Number of configured destinations
    pub fn destinations(&self) -> usize {
        self.notifier.destinations()
    }
}

fn record_deliveries(results: &[DeliveryResult], sent_to: usize) {
    let failed = results.len() - sent_to;
    metrics::counter!("chiparts_deliveries_total", "outcome" => "accepted").increment(sent_to as u64);
    metrics::counter!("chiparts_deliveries_total", "outcome" => "failed").increment(failed as u64);
}
