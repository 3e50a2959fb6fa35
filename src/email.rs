//! Email dispatch for checkout receipts
//!
//! The core only talks to the [`Mailer`] capability; which transport backs
//! it is a deployment decision. With SMTP credentials configured the relay
//! transport is used; otherwise messages are spooled to disk so local and
//! test environments never need a mail server.

use crate::config::EmailConfig;
use crate::models::EmailDispatch;
use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::MultiPart;
use lettre::transport::file::FileTransport;
use lettre::transport::smtp::{SmtpTransport, authentication::Credentials};
use lettre::{Message, Transport};
use rand::RngExt;
use std::path::PathBuf;
use std::sync::Arc;

/// Outbound mail capability
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one message and report how it was dispatched
    async fn send(&self, to: &str, subject: &str, html: &str, text: &str)
    -> Result<EmailDispatch>;
}

/// Pick the transport matching the configuration
pub fn mailer_from_config(config: &EmailConfig) -> Result<Arc<dyn Mailer>> {
    if config.smtp_configured() {
        Ok(Arc::new(SmtpMailer::new(config)?))
    } else {
        tracing::info!(
            "SMTP not configured, spooling mail to {}",
            config.spool_dir
        );
        Ok(Arc::new(FileMailer::new(config)?))
    }
}

fn build_message(from: &str, to: &str, subject: &str, html: &str, text: &str) -> Result<Message> {
    Message::builder()
        .from(from.parse().context("Failed to parse from address")?)
        .to(to.parse().context("Failed to parse to address")?)
        .subject(subject)
        .multipart(MultiPart::alternative_plain_html(
            text.to_string(),
            html.to_string(),
        ))
        .context("Failed to build email message")
}

const ID_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

fn dispatch_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..10)
        .map(|_| ID_CHARS[rng.random_range(0..ID_CHARS.len())] as char)
        .collect();
    format!("msg-{suffix}")
}

/// Relay transport used in production deployments
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let relay = config
            .smtp_relay
            .as_deref()
            .context("Missing SMTP relay host")?;
        let username = config
            .smtp_username
            .clone()
            .context("Missing SMTP username")?;
        let password = config
            .smtp_password
            .clone()
            .context("Missing SMTP password")?;

        let transport = SmtpTransport::relay(relay)?
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Self {
            transport,
            from: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<EmailDispatch> {
        let email = build_message(&self.from, to, subject, html, text)?;

        self.transport
            .send(&email)
            .context("Failed to send email")?;

        let id = dispatch_id();
        tracing::info!("Sent email to {} via SMTP ({})", to, id);
        Ok(EmailDispatch {
            success: true,
            transport: "smtp".to_string(),
            id: Some(id),
            file_path: None,
        })
    }
}

/// Spool transport for environments without an SMTP relay
pub struct FileMailer {
    transport: FileTransport,
    spool_dir: PathBuf,
    from: String,
}

impl FileMailer {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let spool_dir = PathBuf::from(&config.spool_dir);
        std::fs::create_dir_all(&spool_dir)
            .with_context(|| format!("Failed to create spool directory {}", spool_dir.display()))?;

        Ok(Self {
            transport: FileTransport::new(&spool_dir),
            spool_dir,
            from: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Mailer for FileMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<EmailDispatch> {
        let email = build_message(&self.from, to, subject, html, text)?;

        let id = self
            .transport
            .send(&email)
            .context("Failed to spool email")?;

        let file_path = self.spool_dir.join(format!("{id}.eml"));
        tracing::info!("Spooled email for {} to {}", to, file_path.display());
        Ok(EmailDispatch {
            success: true,
            transport: "file".to_string(),
            id: Some(id.to_string()),
            file_path: Some(file_path.display().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_mailer_spools_message() {
        let dir = tempfile::tempdir().unwrap();
        let config = EmailConfig {
            spool_dir: dir.path().display().to_string(),
            ..Default::default()
        };
        let mailer = FileMailer::new(&config).unwrap();

        let dispatch = mailer
            .send(
                "traveler@example.com",
                "Your TripFlow receipt",
                "<p>Thanks!</p>",
                "Thanks!",
            )
            .await
            .unwrap();

        assert!(dispatch.success);
        assert_eq!(dispatch.transport, "file");
        let file_path = dispatch.file_path.expect("file transport reports a path");
        assert!(std::path::Path::new(&file_path).exists());
    }

    #[test]
    fn test_smtp_mailer_requires_credentials() {
        let config = EmailConfig::default();
        assert!(SmtpMailer::new(&config).is_err());
    }

    #[test]
    fn test_dispatch_ids_are_unique() {
        assert_ne!(dispatch_id(), dispatch_id());
    }
}
