//! Mailer that writes composed messages to the structured log instead of
//! handing them to a transport.

use async_trait::async_trait;
use tracing::info;

use crate::domain::{NotificationError, NotificationPort, User};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
    base_url: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn welcome_message(&self, user: &User) -> MailMessage {
        MailMessage {
            from: self.from.clone(),
            to: user.email.clone(),
            subject: "Your account has been created".to_string(),
            body: format!(
                "Hello {},\n\nAn account with login \"{}\" has been created for you.\n\
                 Sign in at {}/admin/login\n",
                user.display_name(),
                user.login,
                self.base_url
            ),
        }
    }

    pub fn reset_message(&self, user: &User, reset_url: &str) -> MailMessage {
        MailMessage {
            from: self.from.clone(),
            to: user.email.clone(),
            subject: "Reset password instructions".to_string(),
            body: format!(
                "Hello {},\n\nSomeone has requested a link to change your password.\n\
                 Change it here: {}\n\n\
                 If you didn't request this, please ignore this email.\n",
                user.display_name(),
                reset_url
            ),
        }
    }

    fn send(&self, message: MailMessage) -> Result<(), NotificationError> {
        if message.to.trim().is_empty() {
            return Err(NotificationError::Delivery {
                recipient: message.to,
                reason: "recipient address is empty".to_string(),
            });
        }
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "Mail delivered"
        );
        Ok(())
    }
}

#[async_trait]
impl NotificationPort for LogMailer {
    async fn deliver_welcome(&self, user: &User) -> Result<(), NotificationError> {
        self.send(self.welcome_message(user))
    }

    async fn deliver_reset_instructions(
        &self,
        user: &User,
        reset_url: &str,
    ) -> Result<(), NotificationError> {
        self.send(self.reset_message(user, reset_url))
    }
}
