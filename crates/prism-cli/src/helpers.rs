//! Shared CLI helpers — path expansion, data loading, response printing.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::Value;

use prism_core::Response;
use prism_providers::ProviderDescriptor;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Load a JSON data context for the report commands.
pub fn read_data_context(path: &Path) -> Result<Value> {
    let path = expand_tilde(&path.to_string_lossy());
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Print a response body, with a provider/model footer when known.
pub fn print_response(text: &str, response: Option<&Response>) {
    println!();
    if text.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{text}");
    }
    if let Some(response) = response {
        println!("{}", footer(response).dimmed());
    }
    println!();
}

/// Close a streamed answer: newline plus footer.
pub fn finish_stream(response: &Response) {
    println!();
    println!("{}", footer(response).dimmed());
    println!();
}

fn footer(response: &Response) -> String {
    let mut line = format!("— {} · {}", response.provider_name, response.model_name);
    if let Some(usage) = &response.token_usage {
        line.push_str(&format!(
            " · {} tokens ({} in / {} out)",
            usage.total_tokens, usage.prompt_tokens, usage.completion_tokens
        ));
    }
    line
}

/// Stream callback printing only what is new since the last update.
///
/// The router hands over the accumulated text on every update.
pub fn stream_printer() -> impl Fn(&str) + Send + Sync + 'static {
    let printer = StreamPrinter::new(std::io::stdout());
    move |accumulated: &str| printer.update(accumulated)
}

/// Writes the growth of an accumulated stream to `out`.
pub struct StreamPrinter<W> {
    state: Mutex<(String, W)>,
}

impl<W: Write> StreamPrinter<W> {
    pub fn new(out: W) -> Self {
        Self {
            state: Mutex::new((String::new(), out)),
        }
    }

    pub fn update(&self, accumulated: &str) {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let (shown, out) = &mut *guard;
        let _ = match accumulated.strip_prefix(shown.as_str()) {
            Some(delta) => write!(out, "{delta}"),
            // Not an extension of what is on screen: a fallback provider
            // restarted the answer.
            None => write!(out, "\n{accumulated}"),
        };
        let _ = out.flush();
        shown.clear();
        shown.push_str(accumulated);
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.state.into_inner().unwrap_or_else(|e| e.into_inner()).1
    }
}

/// Print insights as a bulleted list.
pub fn print_insights(insights: &[String]) {
    println!();
    if insights.is_empty() {
        println!("{}", "(no insights)".dimmed());
    }
    for insight in insights {
        let insight = insight.trim_start_matches(['-', '*', '•']).trim_start();
        println!("  {} {}", "•".cyan(), insight);
    }
    println!();
}

/// Print available providers in selection order.
pub fn print_providers(providers: &[ProviderDescriptor]) {
    println!();
    if providers.is_empty() {
        println!("  {}", "No providers available.".yellow());
        println!();
        return;
    }
    for (i, provider) in providers.iter().enumerate() {
        println!(
            "  {}. {:<14} {:<20} {}",
            i + 1,
            provider.name.bold(),
            provider.default_model().unwrap_or("-"),
            format!(
                "priority {}{}",
                provider.priority,
                if provider.supports_streaming { ", streaming" } else { "" }
            )
            .dimmed()
        );
    }
    println!();
}

/// Print the banner shown at REPL start.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "◆ Prism".cyan().bold(), version.dimmed());
    println!(
        "{}",
        "Type a prompt, /providers, /clear, /reload, or \"exit\" to quit.".dimmed()
    );
    println!();
}

/// Print a "thinking" placeholder (for non-streaming mode).
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
