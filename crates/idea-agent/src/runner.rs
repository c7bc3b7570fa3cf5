use crate::process::ClaudeProcess;
use crate::types::{ContentBlock, Message, QueryOptions};
use crate::{AgentError, Result};

// ─── RunConfig ────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct RunConfig {
    /// The instruction sent as the single user turn.
    pub prompt: String,
    pub opts: QueryOptions,
}

// ─── RunResult ────────────────────────────────────────────────────────────

/// The terminal result of a completed run.
#[derive(Debug)]
pub struct RunResult {
    pub session_id: String,
    /// Final text (empty for error subtypes).
    pub result_text: String,
    /// Present when the CLI returned structured output alongside the text.
    pub structured_output: Option<serde_json::Value>,
    pub total_cost_usd: f64,
    pub num_turns: u32,
    pub is_error: bool,
    pub errors: Vec<String>,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Spawn the CLI, send the prompt, and wait for the terminal result.
pub async fn run(config: RunConfig) -> Result<RunResult> {
    let mut process = ClaudeProcess::spawn(&config.prompt, &config.opts).await?;
    let outcome = collect(&mut process).await;
    process.kill().await;
    outcome
}

// ─── Internal ─────────────────────────────────────────────────────────────

/// Drain messages until the first `result`. If the process ends without
/// one, its exit status (and stderr) becomes the error.
pub(crate) async fn collect(process: &mut ClaudeProcess) -> Result<RunResult> {
    while let Some(msg) = process.next_message().await? {
        match msg {
            Message::System(sys) => {
                tracing::debug!(session_id = %sys.session_id, model = ?sys.model, "generator session started");
            }
            Message::Assistant(asst) => {
                let chars: usize = asst
                    .message
                    .content
                    .iter()
                    .map(|b| match b {
                        ContentBlock::Text { text } => text.len(),
                        _ => 0,
                    })
                    .sum();
                tracing::trace!(chars, "assistant output");
            }
            Message::Result(r) => {
                return Ok(RunResult {
                    session_id: r.session_id().to_string(),
                    result_text: r.result_text().unwrap_or("").to_string(),
                    structured_output: r.structured_output().cloned(),
                    total_cost_usd: r.total_cost_usd(),
                    num_turns: r.num_turns(),
                    is_error: r.is_error(),
                    errors: r.errors().to_vec(),
                });
            }
        }
    }

    Err(process
        .wait_exit_error()
        .await
        .unwrap_or_else(|| AgentError::Process("stream ended without a result message".into())))
}

// ─── Tests ────────────────────────────────────────────────────────────────
