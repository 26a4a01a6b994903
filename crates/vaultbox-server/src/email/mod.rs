//! Outbound email.
//!
//! The emergency-access workflow talks to a [`Mailer`]; which transport sits
//! behind it is a deployment concern. [`LogMailer`] records each message as a
//! structured `tracing` event and is what the server runs with by default.

mod templates;

pub use templates::EmailContent;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Failed to send email: {0}")]
    SendFailed(String),
}

/// The messages the workflow sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailKind {
    /// Sent to a newly designated trusted contact.
    TrustedContactAdded,
    /// Confirms to a contact that their request is pending.
    AccessRequested { owner_email: String },
    /// Tells a contact they can now see the owner's shared entries.
    AccessGranted { owner_email: String },
    /// Sent to the owner when inactivity unlocks their vault.
    InactivityWarning { contact_email: String },
    /// Periodic reminder to a contact whose request is still pending.
    AccessStatusUpdate {
        owner_email: String,
        days_remaining: i64,
    },
}

impl EmailKind {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TrustedContactAdded => "trusted_contact_added",
            Self::AccessRequested { .. } => "access_requested",
            Self::AccessGranted { .. } => "access_granted",
            Self::InactivityWarning { .. } => "inactivity_warning",
            Self::AccessStatusUpdate { .. } => "access_status_update",
        }
    }

    pub fn render(&self) -> EmailContent {
        EmailContent::for_kind(self)
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, kind: EmailKind) -> Result<(), EmailError>;
}

/// Mailer that renders each message and logs it instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, kind: EmailKind) -> Result<(), EmailError> {
        let content = kind.render();
        info!(
            to,
            kind = kind.name(),
            subject = %content.subject,
            body_len = content.html.len(),
            "Email dispatched"
        );
        Ok(())
    }
}

#[cfg(test)]
pub use recording::RecordingMailer;


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        LogMailer
            .send("bob@example.com", EmailKind::TrustedContactAdded)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn recording_mailer_keeps_order_and_can_fail() {
        let mailer = RecordingMailer::new();
        mailer
            .send("bob@example.com", EmailKind::TrustedContactAdded)
            .await
            .unwrap();
        mailer
            .send(
                "alice@example.com",
                EmailKind::InactivityWarning {
                    contact_email: "bob@example.com".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(mailer.sent().len(), 2);
        assert_eq!(
            mailer.sent_to("bob@example.com"),
            vec![EmailKind::TrustedContactAdded]
        );

        mailer.set_failing(true);
        assert!(
            mailer
                .send("bob@example.com", EmailKind::TrustedContactAdded)
                .await
                .is_err()
        );
        assert_eq!(mailer.sent().len(), 2);
    }
}
