//! Prism CLI — entry point.
//!
//! # Commands
//!
//! - `prism ask PROMPT` — one routed request (optionally streamed)
//! - `prism chat` — interactive REPL over the router
//! - `prism report|question|insights --data FILE` — report helpers on JSON data
//! - `prism providers` — available providers in selection order
//! - `prism status` — configuration and provider status
//! - `prism onboard` — write a default config file

mod helpers;
mod onboard;
mod repl;
mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use prism_core::config::{load_config, Config};
use prism_core::Request;
use prism_providers::{ReportAssistant, Router};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Prism — route prompts across LLM providers
#[derive(Parser)]
#[command(name = "prism", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that sends a request.
#[derive(Args, Clone, Debug, Default)]
struct RouteOpts {
    /// Provider to try first (falls back to priority order on failure)
    #[arg(short, long)]
    provider: Option<String>,

    /// Model (defaults to the provider's first model)
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum tokens to generate
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Sampling temperature
    #[arg(short, long)]
    temperature: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one prompt through the router
    Ask {
        /// The prompt text
        prompt: String,

        #[command(flatten)]
        route: RouteOpts,

        /// Stream the answer as it is generated (bypasses the cache)
        #[arg(long, default_value_t = false)]
        stream: bool,

        /// Print the full response as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Interactive chat (each line is an independent prompt)
    Chat {
        #[command(flatten)]
        route: RouteOpts,

        /// Stream answers as they are generated
        #[arg(long, default_value_t = false)]
        stream: bool,
    },

    /// Generate a Markdown report from a JSON data file
    Report {
        /// JSON file with the data context
        #[arg(short, long)]
        data: PathBuf,

        /// Report requirements (sections, focus, audience)
        #[arg(long)]
        template: Option<String>,

        /// Provider to try first
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// Ask a question about a JSON data file
    Question {
        /// The question
        question: String,

        /// JSON file with the data context
        #[arg(short, long)]
        data: PathBuf,

        /// Provider to try first
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// List insights found in a JSON data file
    Insights {
        /// JSON file with the data context
        #[arg(short, long)]
        data: PathBuf,

        /// Provider to try first
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// List available providers in selection order
    Providers,

    /// Show configuration and provider status
    Status,

    /// Create the default configuration file
    Onboard,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logs);

    match cli.command {
        Commands::Ask {
            prompt,
            route,
            stream,
            json,
        } => run_ask(prompt, route, stream, json).await,
        Commands::Chat { route, stream } => {
            let config = load_config(None);
            let router = build_router(&config)?;
            repl::run(router, route, &config, stream).await
        }
        Commands::Report {
            data,
            template,
            provider,
        } => {
            let (assistant, data) = assistant_and_data(provider, &data)?;
            let report = assistant
                .generate_report(&data, template.as_deref())
                .await
                .context("report generation failed")?;
            helpers::print_response(&report, None);
            Ok(())
        }
        Commands::Question {
            question,
            data,
            provider,
        } => {
            let (assistant, data) = assistant_and_data(provider, &data)?;
            let answer = assistant
                .interpret_question(&question, &data)
                .await
                .context("question failed")?;
            helpers::print_response(&answer, None);
            Ok(())
        }
        Commands::Insights { data, provider } => {
            let (assistant, data) = assistant_and_data(provider, &data)?;
            let insights = assistant
                .suggest_insights(&data)
                .await
                .context("insight extraction failed")?;
            helpers::print_insights(&insights);
            Ok(())
        }
        Commands::Providers => {
            let config = load_config(None);
            let router = build_router(&config)?;
            helpers::print_providers(&router.list_available());
            Ok(())
        }
        Commands::Status => status::run(),
        Commands::Onboard => onboard::run(),
    }
}

// ─────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────

async fn run_ask(prompt: String, route: RouteOpts, stream: bool, json: bool) -> Result<()> {
    let config = load_config(None);
    let router = build_router(&config)?;
    let route = with_default_provider(route, &config);

    let mut request = build_request(prompt, &route);
    if stream {
        request = request.with_stream(helpers::stream_printer());
    }

    info!(provider = ?request.provider_name, stream, "sending prompt");
    let response = router
        .send_request(&request)
        .await
        .context("request failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else if stream {
        helpers::finish_stream(&response);
    } else {
        helpers::print_response(&response.text, Some(&response));
    }
    Ok(())
}

/// Build a `Router` from the loaded configuration.
pub fn build_router(config: &Config) -> Result<Arc<Router>> {
    let router = Router::from_config(config).context("failed to initialize router")?;
    if router.list_available().is_empty() {
        eprintln!(
            "{}",
            "No provider has an API key. Run `prism onboard` or set e.g. OPENAI_API_KEY.".yellow()
        );
    }
    Ok(Arc::new(router))
}

/// Turn CLI options into a router request.
fn build_request(prompt: String, route: &RouteOpts) -> Request {
    let mut request = Request::new(prompt);
    request.provider_name = route.provider.clone();
    request.model = route.model.clone();
    request.max_tokens = route.max_tokens;
    request.temperature = route.temperature;
    request
}

/// Fill in `router.defaultProvider` when `--provider` is absent.
fn with_default_provider(mut route: RouteOpts, config: &Config) -> RouteOpts {
    if route.provider.is_none() {
        route.provider = config.router.default_provider.clone();
    }
    route
}

fn assistant_and_data(
    provider: Option<String>,
    data: &std::path::Path,
) -> Result<(ReportAssistant, serde_json::Value)> {
    let config = load_config(None);
    let router = build_router(&config)?;
    let provider = provider.or_else(|| config.router.default_provider.clone());
    let data = helpers::read_data_context(data)?;
    Ok((ReportAssistant::new(router).with_provider(provider), data))
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("prism=debug,prism_providers=debug,prism_core=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
