use async_trait::async_trait;
use thiserror::Error;

use crate::domain::User;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Delivery to {recipient} failed: {reason}")]
    Delivery { recipient: String, reason: String },
}

/// Outbound mail.
#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn deliver_welcome(&self, user: &User) -> Result<(), NotificationError>;

    async fn deliver_reset_instructions(
        &self,
        user: &User,
        reset_url: &str,
    ) -> Result<(), NotificationError>;
}
