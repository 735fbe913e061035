use anyhow::Result;
use clap::Parser;
use daybrief::{LlmOverride, config, interactive, llm, news, pipeline};
use std::path::PathBuf;
use tracing::error;

fn make_llm_override(provider: Option<String>, model: Option<String>) -> Option<LlmOverride> {
    if provider.is_none() && model.is_none() {
        return None;
    }
    let provider = provider
        .map(|p| match p.as_str() {
            "anthropic" => llm::Provider::Anthropic,
            "openrouter" => llm::Provider::OpenRouter,
            "openai" => llm::Provider::OpenAi,
            _ => llm::Provider::Gemini,
        })
        .unwrap_or_default();
    let model = model.unwrap_or_else(|| match &provider {
        llm::Provider::Anthropic => "claude-sonnet-4-5-20250929".into(),
        llm::Provider::Gemini => "gemini-2.5-flash".into(),
        _ => "arcee-ai/trinity-large-preview:free".into(),
    });
    Some(LlmOverride { provider, model })
}

#[derive(Parser)]
#[command(
    name = "daybrief",
    about = "News briefing agent: fetch headlines, synthesize a digest with an LLM, deliver to Discord and email"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the briefing pipeline once and exit (scheduled/batch mode)
    Run {
        /// Path to config file
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        /// LLM provider override: gemini, anthropic, openrouter, openai
        #[arg(long)]
        provider: Option<String>,

        /// LLM model override
        #[arg(long)]
        model: Option<String>,
    },

    /// Stay resident and answer !ping, !news and !emailnews chat commands
    Listen {
        /// Path to config file
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        /// LLM provider override: gemini, anthropic, openrouter, openai
        #[arg(long)]
        provider: Option<String>,

        /// LLM model override
        #[arg(long)]
        model: Option<String>,
    },

    /// Fetch articles for a topic and print them as JSON (no generation or delivery)
    Fetch {
        /// Topic keyword(s) to search for
        topic: String,

        /// Path to config file
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daybrief=info".parse().unwrap()),
        )
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            provider,
            model,
        } => {
            let llm_override = make_llm_override(provider, model);
            // the one encompassing failure boundary: log, then shut down
            if let Err(e) = pipeline::run_batch(&config, llm_override.as_ref()).await {
                error!(error = %e, "briefing run failed");
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Listen {
            config,
            provider,
            model,
        } => {
            let llm_override = make_llm_override(provider, model);
            interactive::run_listener(&config, llm_override.as_ref()).await
        }
        Command::Fetch { topic, config } => {
            let cfg = config::Config::load_or_default(&config)?;
            if cfg.news.api_key.is_empty() {
                anyhow::bail!("NEWS_API_KEY not set. Export it or set news.api_key in config.toml");
            }
            let client = news::NewsClient::new(&cfg.news)?;
            let articles = client.fetch(&client.topic_params(&topic)).await?;
            println!("{}", serde_json::to_string_pretty(&articles)?);
            Ok(())
        }
    }
}
