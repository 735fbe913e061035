use async_trait::async_trait;
use daybrief::deliver::email::{SmtpConnector, SmtpSession, send_scoped};
use daybrief::error::{Error, Result};
use lettre::Message;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct CountingConnector {
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
    fail_send: bool,
}

impl CountingConnector {
    fn new(fail_send: bool) -> Self {
        Self {
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
            fail_send,
        }
    }
}

struct CountingSession {
    closed: Arc<AtomicUsize>,
    fail_send: bool,
}

#[async_trait]
impl SmtpConnector for CountingConnector {
    type Session = CountingSession;

    async fn connect(&self) -> Result<CountingSession> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(CountingSession {
            closed: Arc::clone(&self.closed),
            fail_send: self.fail_send,
        })
    }
}

#[async_trait]
impl SmtpSession for CountingSession {
    async fn send(&mut self, _message: Message) -> Result<()> {
        if self.fail_send {
            Err(Error::api("smtp", "554 transaction failed"))
        } else {
            Ok(())
        }
    }

    async fn quit(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

fn message() -> Message {
    Message::builder()
        .from("sender@example.com".parse().unwrap())
        .to("reader@example.com".parse().unwrap())
        .subject("Briefing")
        .body("<h1>hi</h1>".to_string())
        .unwrap()
}

#[tokio::test]
async fn successful_send_opens_and_closes_once() {
    let connector = CountingConnector::new(false);

    send_scoped(&connector, message()).await.unwrap();

    assert_eq!(connector.opened.load(Ordering::SeqCst), 1);
    assert_eq!(connector.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_send_still_closes_the_session() {
    let connector = CountingConnector::new(true);

    let err = send_scoped(&connector, message()).await.unwrap_err();

    assert!(err.to_string().contains("554"));
    assert_eq!(connector.opened.load(Ordering::SeqCst), 1);
    assert_eq!(connector.closed.load(Ordering::SeqCst), 1);
}
