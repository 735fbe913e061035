//! Turning fetched articles into prompts for the narrative generator.

use crate::news::Article;
use std::fmt::Write;

/// One fetched batch topic, in configured order.
#[derive(Debug, Clone)]
pub struct TopicSection {
    pub name: String,
    pub articles: Vec<Article>,
}

/// Render articles as a numbered plain-text block for embedding in a prompt.
/// Pure function, 1-based, input order preserved.
pub fn format_articles(articles: &[Article]) -> String {
    let mut out = String::new();
    for (i, article) in articles.iter().enumerate() {
        let _ = write!(
            out,
            "{}. Title: {}\n   URL: {}\n\n",
            i + 1,
            article.title,
            article.url
        );
    }
    out
}

const EMAIL_PROMPT: &str = r#"You are an expert email newsletter designer. Turn the following lists of raw articles into a professional HTML newsletter.
The entire output must be a single block of HTML code with inline CSS and a clean, modern design.
Create one section per topic below. For each article, create a bold clickable headline in an <h2> tag and a one-sentence summary in a <p> tag. Separate items with an <hr>.
Here are the articles:
"#;

const CHAT_PROMPT: &str = r#"You are an expert news editor writing for a Discord channel. Turn the following lists of raw articles into a "Today's Top Headlines" report.
For each article, write a short punchy headline in bold and a one-sentence summary, grouped under the topic headings below.
Format the output using Discord markdown only, no HTML.
Here are the articles:
"#;

/// Fold the non-empty sections into one labelled block. Empty sections carry
/// no information for the model and are left out.
fn sections_block(sections: &[TopicSection]) -> String {
    let mut out = String::new();
    for section in sections {
        if section.articles.is_empty() {
            continue;
        }
        let _ = write!(out, "{}:\n{}\n", section.name, format_articles(&section.articles));
    }
    out
}

pub fn email_prompt(sections: &[TopicSection]) -> String {
    format!("{EMAIL_PROMPT}\n{}", sections_block(sections))
}

pub fn chat_prompt(sections: &[TopicSection]) -> String {
    format!("{CHAT_PROMPT}\n{}", sections_block(sections))
}

/// Single-topic variants used by the interactive commands.
pub fn email_topic_prompt(topic: &str, articles: &[Article]) -> String {
    format!(
        "You are an expert email newsletter designer. Given a list of raw articles about '{topic}', turn it into a visually appealing HTML email.\n\
         The entire output must be a single block of HTML code with inline CSS.\n\
         For each article, create a clickable headline in an <h2> tag and a one-sentence summary in a <p> tag, separated by an <hr>.\n\
         Here are the raw articles:\n{}",
        format_articles(articles)
    )
}

pub fn chat_topic_prompt(topic: &str, articles: &[Article]) -> String {
    format!(
        "You are an expert news editor for a Discord channel. Given a list of raw articles about '{topic}', turn it into a short \"Top News\" report.\n\
         For each article, write an exciting one-line headline and a one-sentence summary, using Discord markdown only.\n\
         Here are the raw articles:\n{}",
        format_articles(articles)
    )
}
