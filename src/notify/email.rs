//! SMTP delivery of failure reports

use crate::config::EmailConfig;
use crate::error::{Error, Result};
use crate::notify::{FailureReport, Notifier, recipients};
use crate::types::Series;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info, warn};

/// Notifier sending failure reports by email
pub struct EmailNotifier {
    config: EmailConfig,
    /// SMTP password; nothing is sent without it
    token: Option<String>,
}

fn parse_mailbox(addr: &str) -> Result<Mailbox> {
    addr.parse()
        .map_err(|e| Error::Email(format!("invalid address '{addr}': {e}")))
}

impl EmailNotifier {
    /// Create a notifier for the given policy
    pub fn new(config: EmailConfig, token: Option<String>) -> Self {
        Self {
            config,
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// Build the reply to the first patch of `series`
    pub fn compose(&self, series: &Series, report: &FailureReport) -> Result<Message> {
        let to = recipients(&self.config, series);
        if to.is_empty() {
            return Err(Error::Email("no recipients".to_string()));
        }

        let mut builder = Message::builder()
            .from(parse_mailbox(&self.config.user)?)
            .reply_to(parse_mailbox(&self.config.default_to)?)
            .subject(format!("RE: {}", series.display_name()));
        for addr in &to {
            builder = builder.to(parse_mailbox(addr)?);
        }
        if let Some(first) = series.patches.first()
            && !first.msgid.is_empty()
        {
            builder = builder
                .in_reply_to(first.msgid.clone())
                .references(first.msgid.clone());
        }

        builder
            .header(ContentType::TEXT_PLAIN)
            .body(report.render())
            .map_err(|e| Error::Email(e.to_string()))
    }

    async fn send(&self, token: &str, message: Message) -> Result<()> {
        let builder = if self.config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.server)
                .map_err(|e| Error::Email(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.server)
        };

        let transport = builder
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.user.clone(),
                token.to_string(),
            ))
            .build();

        transport
            .send(message)
            .await
            .map_err(|e| Error::Email(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, series: &Series, report: &FailureReport) -> Result<()> {
        if !self.config.enable {
            info!(series_id = series.id, "email is disabled, skip sending");
            return Ok(());
        }

        let message = self.compose(series, report)?;
        debug!(series_id = series.id, "composed failure email");

        let Some(token) = &self.token else {
            warn!(series_id = series.id, "EMAIL_TOKEN not set, skip sending");
            return Ok(());
        };

        self.send(token, message).await?;
        info!(
            series_id = series.id,
            server = %self.config.server,
            "failure email sent"
        );
        Ok(())
    }
}
