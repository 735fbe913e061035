use async_trait::async_trait;
use daybrief::deliver::{Channel, DigestSink};
use daybrief::digest::TopicSection;
use daybrief::error::{Error, Result};
use daybrief::llm::TextGenerator;
use daybrief::news::Article;
use daybrief::pipeline::publish_sections;
use std::sync::{Arc, Mutex};

fn article(title: &str, url: &str) -> Article {
    Article {
        title: title.into(),
        url: url.into(),
        description: None,
    }
}

fn section(name: &str, articles: Vec<Article>) -> TopicSection {
    TopicSection {
        name: name.into(),
        articles,
    }
}

struct FakeGenerator {
    prompts: Arc<Mutex<Vec<String>>>,
}

impl FakeGenerator {
    fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                prompts: Arc::clone(&prompts),
            },
            prompts,
        )
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(format!("generated digest #{}", self.prompts.lock().unwrap().len()))
    }
}

struct FakeSink {
    channel: Channel,
    fail_with: Option<String>,
    delivered: Arc<Mutex<Vec<String>>>,
}

impl FakeSink {
    fn ok(channel: Channel) -> (Box<dyn DigestSink>, Arc<Mutex<Vec<String>>>) {
        let delivered = Arc::new(Mutex::new(Vec::new()));
        (
            Box::new(Self {
                channel,
                fail_with: None,
                delivered: Arc::clone(&delivered),
            }),
            delivered,
        )
    }

    fn failing(channel: Channel, message: &str) -> Box<dyn DigestSink> {
        Box::new(Self {
            channel,
            fail_with: Some(message.to_string()),
            delivered: Arc::new(Mutex::new(Vec::new())),
        })
    }
}

#[async_trait]
impl DigestSink for FakeSink {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn deliver(&self, digest: &str) -> Result<()> {
        if let Some(message) = &self.fail_with {
            return Err(Error::api("discord", message.clone()));
        }
        self.delivered.lock().unwrap().push(digest.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn empty_fetch_skips_generation_and_delivery() {
    let sections = vec![section("Technology News", vec![]), section("AI News", vec![])];
    let (generator, prompts) = FakeGenerator::new();
    let (chat, chat_log) = FakeSink::ok(Channel::Chat);
    let (email, email_log) = FakeSink::ok(Channel::Email);

    let result = publish_sections(&sections, &generator, &[chat, email]).await;

    assert!(result.is_ok());
    assert!(prompts.lock().unwrap().is_empty());
    assert!(chat_log.lock().unwrap().is_empty());
    assert!(email_log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn every_enabled_channel_gets_its_own_digest() {
    let sections = vec![section(
        "Technology News",
        vec![article("A", "u1"), article("B", "u2")],
    )];
    let (generator, prompts) = FakeGenerator::new();
    let (chat, chat_log) = FakeSink::ok(Channel::Chat);
    let (email, email_log) = FakeSink::ok(Channel::Email);

    publish_sections(&sections, &generator, &[chat, email])
        .await
        .unwrap();

    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 2);
    // distinct prompts per channel, both embedding the formatted list
    assert_ne!(prompts[0], prompts[1]);
    assert!(prompts.iter().all(|p| p.contains("1. Title: A\n   URL: u1")));

    assert_eq!(chat_log.lock().unwrap().len(), 1);
    assert_eq!(email_log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn chat_failure_does_not_block_email() {
    let sections = vec![section("Technology News", vec![article("A", "u1")])];
    let (generator, _prompts) = FakeGenerator::new();
    let chat = FakeSink::failing(Channel::Chat, "channel 42 not found or inaccessible");
    let (email, email_log) = FakeSink::ok(Channel::Email);

    let result = publish_sections(&sections, &generator, &[chat, email]).await;

    // the email channel was still attempted and succeeded
    assert_eq!(email_log.lock().unwrap().len(), 1);

    // but the run as a whole reports the failure
    let err = result.unwrap_err().to_string();
    assert!(err.contains("1 of 2"));
    assert!(err.contains("chat"));
}

#[tokio::test]
async fn all_channels_failing_reports_all() {
    let sections = vec![section("Technology News", vec![article("A", "u1")])];
    let (generator, _prompts) = FakeGenerator::new();
    let chat = FakeSink::failing(Channel::Chat, "channel not found");
    let email = FakeSink::failing(Channel::Email, "relay rejected");

    let err = publish_sections(&sections, &generator, &[chat, email])
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("2 of 2"));
}

#[tokio::test]
async fn generator_failure_counts_as_channel_failure() {
    struct BrokenGenerator;

    #[async_trait]
    impl TextGenerator for BrokenGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(Error::api("gemini", "quota exceeded"))
        }
    }

    let sections = vec![section("Technology News", vec![article("A", "u1")])];
    let (email, email_log) = FakeSink::ok(Channel::Email);

    let result = publish_sections(&sections, &BrokenGenerator, &[email]).await;

    assert!(result.is_err());
    assert!(email_log.lock().unwrap().is_empty());
}
