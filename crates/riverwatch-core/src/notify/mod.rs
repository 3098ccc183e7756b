mod telegram;

pub use telegram::{TelegramNotifier, TELEGRAM_MAX_MESSAGE_LENGTH};

use crate::Result;

/// Outcome of a successful `deliver` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    NothingToSend,
}

/// Posts a rendered digest to a chat channel
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message`. `None` is a no-op that never touches the network.
    /// Failures are `Error::DeliveryFailed` and are not retried here.
    async fn deliver(&self, message: Option<&str>) -> Result<Delivery>;
}
