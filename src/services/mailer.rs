use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use crate::config::MailConfig;

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail relay answered HTTP {0}")]
    Rejected(u16),
}

/// Transport des emails sortants (codes de réinitialisation)
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// Poste le message en JSON vers un relais HTTP (MAIL_RELAY_URL)
pub struct RelayMailer {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    from: String,
}

impl RelayMailer {
    pub fn new(client: reqwest::Client, endpoint: String, token: Option<String>, from: String) -> Self {
        Self { client, endpoint, token, from }
    }
}

#[async_trait]
impl Mailer for RelayMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let mut request = self.client.post(&self.endpoint).json(&json!({
            "from": self.from,
            "to": [message.to],
            "subject": message.subject,
            "text": message.text,
            "html": message.html,
        }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(MailError::Rejected(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Sans relais configuré: seuls destinataire et sujet sont journalisés (dev)
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        // Le corps contient le code de réinitialisation: jamais dans les logs
        tracing::info!(to = %message.to, subject = %message.subject, "outgoing email dropped (no relay configured)");
        Ok(())
    }
}

pub fn from_config(client: reqwest::Client, config: &MailConfig) -> Arc<dyn Mailer> {
    match &config.relay_url {
        Some(url) => Arc::new(RelayMailer::new(
            client,
            url.clone(),
            config.relay_token.clone(),
            config.from.clone(),
        )),
        None => {
            tracing::warn!("MAIL_RELAY_URL not set, emails will only be logged");
            Arc::new(LogMailer)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn log_mailer_keeps_the_code_out_of_logs() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();

        let message = EmailMessage {
            to: "alice@example.com".to_string(),
            subject: "Password reset code".to_string(),
            text: "Your password reset code is: 482913".to_string(),
            html: "<strong>482913</strong>".to_string(),
        };
        tracing::subscriber::with_default(subscriber, || {
            futures::executor::block_on(LogMailer.send(&message)).unwrap();
        });

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("alice@example.com"), "{logs}");
        assert!(!logs.contains("482913"), "{logs}");
    }
}
