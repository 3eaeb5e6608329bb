use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tokio::sync::broadcast::{channel, Receiver, Sender};

/// Events pushed towards provider apps. This is a side-channel, not a
/// consistency mechanism: subscribers reconcile through the HTTP API.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProviderEvent {
    BookingAvailable {
        provider_id: i64,
        engagement_id: String,
        service_type: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        start_time: NaiveTime,
        total_amount: BigDecimal,
    },
    BookingAssigned {
        provider_id: i64,
        engagement_id: String,
    },
}

impl ProviderEvent {
    pub fn provider_id(&self) -> i64 {
        match self {
            ProviderEvent::BookingAvailable { provider_id, .. } => *provider_id,
            ProviderEvent::BookingAssigned { provider_id, .. } => *provider_id,
        }
    }
}

/// Fan-out to whatever transport delivers events to providers. Publishing
/// is fire-and-forget: a closed or lagging channel never fails the flow
/// that emitted the event.
#[derive(Clone)]
pub struct BookingNotifier {
    sender: Sender<ProviderEvent>,
}

impl Default for BookingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingNotifier {
    pub fn new() -> BookingNotifier {
        // Receivers are created later, by whoever attaches a transport.
        let (sender, _receiver) = channel(100);
        BookingNotifier { sender }
    }

    pub fn publish(&self, event: ProviderEvent) {
        if let Err(e) = self.sender.send(event) {
            log::debug!("no active subscribers for provider event: {}", e);
        }
    }

    pub fn subscribe(&self) -> Receiver<ProviderEvent> {
        self.sender.subscribe()
    }
}
