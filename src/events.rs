use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted by the service layer.
///
/// Events are advisory: senders treat delivery as best-effort and never fail
/// a request because the channel is closed or full.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Auth events
    UserRegistered {
        user_id: Uuid,
        role: String,
    },

    // Order events
    OrderPlaced(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },

    // Inventory events
    InventoryAdjusted {
        item_id: Uuid,
        old_quantity: i32,
        new_quantity: i32,
    },
    InventoryItemRemoved(Uuid),

    // Rating events
    RatingSubmitted {
        supplier_id: Uuid,
        overall_rating: i32,
    },

    // Credit events
    CreditTransactionCreated {
        vendor_id: Uuid,
        order_id: Uuid,
        amount: Decimal,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel and logs each event.
/// Runs for the lifetime of the process.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        info!(?event, "domain event");
    }
    warn!("Event channel closed; event processor exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_fails_once_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        drop(rx);

        let result = sender.send(Event::OrderPlaced(Uuid::new_v4())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn events_round_trip_through_the_channel() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        let order_id = Uuid::new_v4();

        sender
            .send(Event::OrderStatusChanged {
                order_id,
                old_status: "pending".into(),
                new_status: "confirmed".into(),
            })
            .await
            .expect("send event");

        match rx.recv().await.expect("receive event") {
            Event::OrderStatusChanged {
                order_id: id,
                old_status,
                new_status,
            } => {
                assert_eq!(id, order_id);
                assert_eq!(old_status, "pending");
                assert_eq!(new_status, "confirmed");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
