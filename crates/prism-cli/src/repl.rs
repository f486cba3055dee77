//! Interactive REPL over the router.
//!
//! Uses `rustyline` for readline-style editing with persistent history.
//! Every line is sent as an independent prompt; there is no conversation
//! state between turns.

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use prism_core::config::{load_config, Config};
use prism_core::utils::get_history_path;
use prism_providers::{ProviderRegistry, Router};

use crate::helpers;
use crate::{build_request, with_default_provider, RouteOpts};

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// A line the REPL handles itself instead of sending to a provider.
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Exit,
    ClearCache,
    Providers,
    Reload,
}

/// Run the interactive REPL loop.
///
/// `cli_route` holds only what was given on the command line; the config's
/// default provider is layered on top and recomputed on `/reload`.
pub async fn run(router: Arc<Router>, cli_route: RouteOpts, config: &Config, stream: bool) -> Result<()> {
    helpers::print_banner();

    let mut route = with_default_provider(cli_route.clone(), config);

    let mut editor = create_editor()?;

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => break,
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        let _ = editor.add_history_entry(&input);

        match parse_command(trimmed) {
            Some(ReplCommand::Exit) => {
                println!("\nGoodbye! 👋");
                break;
            }
            Some(ReplCommand::ClearCache) => {
                router.clear_cache();
                println!("{}", "  cache cleared".dimmed());
                continue;
            }
            Some(ReplCommand::Providers) => {
                helpers::print_providers(&router.list_available());
                continue;
            }
            Some(ReplCommand::Reload) => {
                route = reload(&router, &cli_route, &load_config(None));
                let count = router.list_available().len();
                println!("{}", format!("  config reloaded, {count} provider(s) available").dimmed());
                continue;
            }
            None => {}
        }

        debug!(input = trimmed, "processing input");
        let mut request = build_request(trimmed.to_string(), &route);

        if stream {
            request = request.with_stream(helpers::stream_printer());
            println!();
            match router.send_request(&request).await {
                Ok(response) => helpers::finish_stream(&response),
                Err(e) => eprintln!("\n❌ Error: {e}\n"),
            }
        } else {
            helpers::print_thinking();
            let result = router.send_request(&request).await;
            helpers::clear_thinking();
            match result {
                Ok(response) => helpers::print_response(&response.text, Some(&response)),
                Err(e) => eprintln!("\n❌ Error: {e}\n"),
            }
        }
    }

    save_history(&mut editor);

    Ok(())
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = get_history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = get_history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Swap in providers from `config` and recompute the effective route.
fn reload(router: &Router, cli_route: &RouteOpts, config: &Config) -> RouteOpts {
    router.reload_registry(ProviderRegistry::from_config(&config.providers));
    with_default_provider(cli_route.clone(), config)
}

fn parse_command(input: &str) -> Option<ReplCommand> {
    let lower = input.to_lowercase();
    if EXIT_COMMANDS.contains(&lower.as_str()) {
        return Some(ReplCommand::Exit);
    }
    match lower.as_str() {
        "/clear" => Some(ReplCommand::ClearCache),
        "/providers" => Some(ReplCommand::Providers),
        "/reload" => Some(ReplCommand::Reload),
        _ => None,
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_commands() {
        assert_eq!(parse_command("exit"), Some(ReplCommand::Exit));
        assert_eq!(parse_command("EXIT"), Some(ReplCommand::Exit));
        assert_eq!(parse_command("/quit"), Some(ReplCommand::Exit));
        assert_eq!(parse_command(":q"), Some(ReplCommand::Exit));
    }

    #[test]
    fn slash_commands() {
        assert_eq!(parse_command("/clear"), Some(ReplCommand::ClearCache));
        assert_eq!(parse_command("/Providers"), Some(ReplCommand::Providers));
        assert_eq!(parse_command("/reload"), Some(ReplCommand::Reload));
    }

    #[test]
    fn prompts_are_not_commands() {
        assert_eq!(parse_command("hello"), None);
        assert_eq!(parse_command("/clear the table please"), None);
        assert_eq!(parse_command("exit strategy for Q3?"), None);
    }

    #[test]
    fn reload_picks_up_new_default_provider() {
        let mut before = Config::default();
        before.providers.openai.api_key = "sk-1".into();
        before.router.default_provider = Some("openai".into());
        let router = Router::from_config(&before).unwrap();

        let mut after = before.clone();
        after.providers.groq.api_key = "gsk-1".into();
        after.router.default_provider = Some("groq".into());

        let route = reload(&router, &RouteOpts::default(), &after);
        assert_eq!(route.provider.as_deref(), Some("groq"));
        assert_eq!(router.list_available().len(), 2);
    }

    #[test]
    fn reload_keeps_explicit_provider() {
        let router = Router::from_config(&Config::default()).unwrap();
        let mut config = Config::default();
        config.router.default_provider = Some("groq".into());

        let cli_route = RouteOpts {
            provider: Some("anthropic".into()),
            ..Default::default()
        };
        assert_eq!(
            reload(&router, &cli_route, &config).provider.as_deref(),
            Some("anthropic")
        );
    }
}
