mod prompt;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use prompt::cliclack::CliclackPrompt;
use session::{Backend, Outcome, Session};
use vinod::agent::{Agent, DEFAULT_MAX_ROUNDS, DEFAULT_MODEL_TIMEOUT, DEFAULT_TOOL_TIMEOUT};
use vinod::keyword::KeywordAgent;
use vinod::providers::configs::{get_env, GeminiProviderConfig};
use vinod::providers::gemini::GeminiProvider;
use vinod::tools::crypto::{CoinGecko, COINGECKO_HOST, DEFAULT_PRICE_TIMEOUT};
use vinod::tools::ToolRegistry;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Ask a single question, print the answer and exit
    #[arg(short, long)]
    message: Option<String>,

    /// Answer with the hosted model or the offline keyword matcher [env: VINOD_AGENT__MODE]
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Maximum tool rounds per question [env: VINOD_AGENT__MAX_TOOL_ROUNDS]
    #[arg(long)]
    max_rounds: Option<usize>,

    /// Gemini model [env: VINOD_PROVIDER__MODEL or GEMINI_MODEL]
    #[arg(long)]
    model: Option<String>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Mode {
    Agent,
    Keyword,
}

/// Read and parse an optional environment variable
fn parsed_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env(key, false, None)?
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("{key}: {e}"))
        })
        .transpose()
}

fn seconds(key: &str, default: Duration) -> Result<Duration> {
    Ok(parsed_env::<u64>(key)?.map_or(default, Duration::from_secs))
}

/// Flags win over `VINOD_*` variables, which win over the built-in defaults
fn resolve_mode(cli: &Cli) -> Result<Mode> {
    if let Some(mode) = cli.mode {
        return Ok(mode);
    }
    match get_env("VINOD_AGENT__MODE", false, None)? {
        Some(value) => <Mode as clap::ValueEnum>::from_str(value.trim(), true)
            .map_err(|e| anyhow::anyhow!("VINOD_AGENT__MODE: {e}")),
        None => Ok(Mode::Agent),
    }
}

fn build_backend(cli: &Cli) -> Result<Backend> {
    let prices_host = get_env("VINOD_PRICES__HOST", false, Some(COINGECKO_HOST.to_string()))?
        .unwrap_or_else(|| COINGECKO_HOST.to_string());
    let prices_timeout = seconds("VINOD_PRICES__TIMEOUT_SECS", DEFAULT_PRICE_TIMEOUT)?;
    let prices = CoinGecko::new(prices_host, prices_timeout)?;
    let registry = ToolRegistry::with_builtins(Arc::new(prices))?;

    match resolve_mode(cli)? {
        Mode::Keyword => Ok(Backend::Keyword(KeywordAgent::new(registry))),
        Mode::Agent => {
            let mut config = GeminiProviderConfig::from_env()
                .context("An API key is required in agent mode; try --mode keyword")?;
            if let Some(model) = &cli.model {
                config.model = model.clone();
            }
            let max_rounds = match cli.max_rounds {
                Some(rounds) => rounds,
                None => parsed_env("VINOD_AGENT__MAX_TOOL_ROUNDS")?.unwrap_or(DEFAULT_MAX_ROUNDS),
            };

            let tool_timeout = seconds("VINOD_AGENT__TOOL_TIMEOUT_SECS", DEFAULT_TOOL_TIMEOUT)?;
            let model_timeout = seconds("VINOD_AGENT__MODEL_TIMEOUT_SECS", DEFAULT_MODEL_TIMEOUT)?;

            let provider = GeminiProvider::new(config)?;
            let agent = Agent::new(Box::new(provider), registry)
                .with_max_rounds(max_rounds)
                .with_tool_timeout(tool_timeout)
                .with_model_timeout(model_timeout);
            Ok(Backend::Agent(agent))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Logs go to stderr and stay quiet unless asked for
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let backend = build_backend(&cli)?;
    let mut session = Session::new(backend, Box::new(CliclackPrompt::new()));

    match &cli.message {
        Some(message) => match session.ask(message).await {
            Outcome::Answer(text) => println!("{text}"),
            Outcome::Failed(apology) => {
                eprintln!("{}", style(apology).red());
                std::process::exit(1);
            }
            Outcome::Interrupted => std::process::exit(130),
        },
        None => {
            println!(
                "AgentVinod CLI {}",
                style("- type \"exit\" to end the session").dim()
            );
            session.start().await?;
        }
    }
    Ok(())
}
