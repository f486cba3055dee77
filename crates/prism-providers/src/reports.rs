//! Report and insight helpers — fixed prompt templates on top of the router.
//!
//! The data context is an opaque JSON value supplied by the caller (a
//! spreadsheet export, a query result, ...). It is embedded pretty-printed.

use std::sync::Arc;

use serde_json::Value;

use prism_core::Request;

use crate::error::Result;
use crate::router::Router;

const DEFAULT_REPORT_OUTLINE: &str = "Include an overview, key metrics, notable trends, \
and recommended next steps.";

const REPORT_FORMAT_INSTRUCTION: &str = "Format the report in Markdown with clear headings, \
short paragraphs, and bullet points where they help readability.";

/// Prompt templates for reports, questions, and insights.
#[derive(Clone, Debug)]
pub struct ReportAssistant {
    router: Arc<Router>,
    provider: Option<String>,
}

impl ReportAssistant {
    pub fn new(router: Arc<Router>) -> Self {
        Self {
            router,
            provider: None,
        }
    }

    /// Prefer a provider for every request made by this assistant.
    pub fn with_provider(mut self, provider: Option<String>) -> Self {
        self.provider = provider;
        self
    }

    /// Write a report about `data_context`, following `template` when given.
    pub async fn generate_report(&self, data_context: &Value, template: Option<&str>) -> Result<String> {
        let prompt = report_prompt(data_context, template);
        Ok(self.send(prompt).await?.text)
    }

    /// Answer a natural-language question about `data_context`.
    pub async fn interpret_question(&self, question: &str, data_context: &Value) -> Result<String> {
        let prompt = question_prompt(question, data_context);
        Ok(self.send(prompt).await?.text)
    }

    /// List insights about `data_context`, one per non-empty line.
    pub async fn suggest_insights(&self, data_context: &Value) -> Result<Vec<String>> {
        let prompt = insights_prompt(data_context);
        let response = self.send(prompt).await?;
        Ok(split_insights(&response.text))
    }

    async fn send(&self, prompt: String) -> Result<prism_core::Response> {
        let mut request = Request::new(prompt);
        request.provider_name = self.provider.clone();
        self.router.send_request(&request).await
    }
}

fn render_data(data_context: &Value) -> String {
    serde_json::to_string_pretty(data_context).unwrap_or_else(|_| data_context.to_string())
}

pub fn report_prompt(data_context: &Value, template: Option<&str>) -> String {
    let outline = template
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_REPORT_OUTLINE);
    format!(
        "Generate a report based on the following data:\n\n{}\n\nReport requirements:\n{}\n\n{}",
        render_data(data_context),
        outline,
        REPORT_FORMAT_INSTRUCTION
    )
}

pub fn question_prompt(question: &str, data_context: &Value) -> String {
    format!(
        "Answer the following question using only the data provided.\n\n\
         Question: {}\n\nData:\n{}\n\n\
         If the data does not contain the answer, say so explicitly.",
        question.trim(),
        render_data(data_context)
    )
}

pub fn insights_prompt(data_context: &Value) -> String {
    format!(
        "Analyze the following data and identify the most important insights, trends, \
         and anomalies. Return one insight per line with no introduction or closing remarks.\n\n\
         Data:\n{}",
        render_data(data_context)
    )
}

/// Split model output into insights: one per line, trimmed, blanks dropped.
pub fn split_insights(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
