use crate::config::EmailConfig;
use crate::deliver::{Channel, DigestSink};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::Local;
use lettre::message::{Mailbox, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

/// One live SMTP session: good for exactly one send, then released.
#[async_trait]
pub trait SmtpSession: Send {
    async fn send(&mut self, message: Message) -> Result<()>;
    async fn quit(&mut self);
}

#[async_trait]
pub trait SmtpConnector: Send + Sync {
    type Session: SmtpSession;
    async fn connect(&self) -> Result<Self::Session>;
}

/// Open a session, send one message, release the session on every exit path.
/// A failed send still releases before the error surfaces to the caller.
pub async fn send_scoped<C: SmtpConnector>(connector: &C, message: Message) -> Result<()> {
    let mut session = connector.connect().await?;
    let outcome = session.send(message).await;
    session.quit().await;
    outcome
}

/// Implicit-TLS (SMTPS) connector against a fixed host and port.
#[derive(Debug)]
pub struct SmtpsConnector {
    host: String,
    port: u16,
    credentials: Credentials,
}

impl SmtpsConnector {
    pub fn new(host: String, port: u16, username: String, password: String) -> Self {
        Self {
            host,
            port,
            credentials: Credentials::new(username, password),
        }
    }
}

pub struct SmtpsSession {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

#[async_trait]
impl SmtpConnector for SmtpsConnector {
    type Session = SmtpsSession;

    async fn connect(&self) -> Result<SmtpsSession> {
        let tls = TlsParameters::new(self.host.clone())
            .map_err(|e| Error::api("smtp", e.to_string()))?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(self.host.as_str())
            .port(self.port)
            .tls(Tls::Wrapper(tls))
            .credentials(self.credentials.clone())
            .build();
        Ok(SmtpsSession { transport })
    }
}

#[async_trait]
impl SmtpSession for SmtpsSession {
    async fn send(&mut self, message: Message) -> Result<()> {
        self.transport
            .send(message)
            .await
            .map(drop)
            .map_err(|e| Error::api("smtp", e.to_string()))
    }

    async fn quit(&mut self) {
        // the unpooled transport closes its connection once the send returns
    }
}

#[derive(Debug)]
pub struct EmailDelivery {
    connector: SmtpsConnector,
    sender: Mailbox,
    recipient: Mailbox,
    subject: String,
}

impl EmailDelivery {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let sender: Mailbox = config
            .sender
            .parse()
            .map_err(|e| Error::config(format!("invalid sender address '{}': {e}", config.sender)))?;
        let recipient: Mailbox = config.recipient.parse().map_err(|e| {
            Error::config(format!(
                "invalid recipient address '{}': {e}",
                config.recipient
            ))
        })?;
        Ok(Self {
            connector: SmtpsConnector::new(
                config.smtp_host.clone(),
                config.smtp_port,
                config.sender.clone(),
                config.password.clone(),
            ),
            sender,
            recipient,
            subject: config.subject.clone(),
        })
    }

    pub fn recipient(&self) -> String {
        self.recipient.to_string()
    }

    fn build_message(&self, subject: &str, html: &str) -> Result<Message> {
        Message::builder()
            .from(self.sender.clone())
            .to(self.recipient.clone())
            .subject(subject)
            .singlepart(SinglePart::html(html.to_string()))
            .map_err(|e| Error::parse(format!("build email: {e}")))
    }

    pub async fn send_html(&self, subject: &str, html: &str) -> Result<()> {
        let message = self.build_message(subject, html)?;
        send_scoped(&self.connector, message).await?;
        info!(recipient = %self.recipient, subject, "email sent");
        Ok(())
    }

    fn dated_subject(&self) -> String {
        format!("{} - {}", self.subject, Local::now().format("%B %d, %Y"))
    }
}

#[async_trait]
impl DigestSink for EmailDelivery {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn deliver(&self, digest: &str) -> Result<()> {
        self.send_html(&self.dated_subject(), digest).await
    }
}
