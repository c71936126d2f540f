use super::LanguageModel;
use anyhow::{Context, Result};
use std::sync::Arc;

fn summary_prompt(summary: &str, new_lines: &str) -> String {
    format!(
        "Progressively summarize the lines of conversation provided, \
adding onto the previous summary and returning a new summary.

Current summary:
{summary}

New lines of conversation:
{new_lines}

New summary:"
    )
}

/// Running conversation summary kept up to date by a language model
pub struct SummaryMemory {
    llm: Arc<dyn LanguageModel>,
    summary: String,
}

impl SummaryMemory {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self {
            llm,
            summary: String::new(),
        }
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
    }

    /// Fold one question/answer exchange into the summary
    pub async fn record_exchange(&mut self, question: &str, answer: &str) -> Result<()> {
        let new_lines = format!("Human: {}\nAI: {}", question, answer);
        let prompt = summary_prompt(&self.summary, &new_lines);

        let summary = self
            .llm
            .complete(&prompt)
            .await
            .context("Failed to update conversation summary")?;
        self.summary = summary.trim().to_string();
        tracing::debug!("Conversation summary is now {} chars", self.summary.len());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.summary.clear();
    }
}
