use std::future::Future;
use std::time::Duration;

use idea_core::config::GeneratorConfig;
use idea_core::error::GenerateError;
use idea_core::generate::{DesignGenerator, GeneratorOutput};
use idea_core::prompt::ARCHITECT_SYSTEM_PROMPT;

use crate::runner::{run, RunConfig, RunResult};
use crate::types::QueryOptions;
use crate::AgentError;

/// [`DesignGenerator`] backed by a Claude CLI subprocess.
pub struct ClaudeGenerator {
    opts: QueryOptions,
    timeout: Duration,
}

impl ClaudeGenerator {
    pub fn new(opts: QueryOptions, timeout: Duration) -> Self {
        Self { opts, timeout }
    }

    /// Build from config, using the architect persona as the system prompt.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        let opts = QueryOptions {
            path_to_executable: Some(config.executable.clone()),
            model: config.model.clone(),
            max_turns: config.max_turns,
            system_prompt: Some(ARCHITECT_SYSTEM_PROMPT.to_string()),
            ..Default::default()
        };
        Self::new(opts, Duration::from_secs(config.timeout_secs))
    }

    async fn run_with_timeout(&self, instruction: &str) -> Result<RunResult, AgentError> {
        let config = RunConfig {
            prompt: instruction.to_string(),
            opts: self.opts.clone(),
        };
        match tokio::time::timeout(self.timeout, run(config)).await {
            Ok(result) => result,
            Err(_) => Err(AgentError::Timeout(self.timeout.as_secs())),
        }
    }
}

impl DesignGenerator for ClaudeGenerator {
    fn generate(&self, instruction: &str) -> Result<GeneratorOutput, GenerateError> {
        tracing::info!(
            executable = self.opts.path_to_executable.as_deref().unwrap_or("claude"),
            timeout_secs = self.timeout.as_secs(),
            "spawning generator subprocess"
        );
        let result = block_on(self.run_with_timeout(instruction))?
            .map_err(|e| GenerateError::Generator(e.to_string()))?;
        tracing::info!(
            turns = result.num_turns,
            cost_usd = result.total_cost_usd,
            "generator finished"
        );
        into_output(result)
    }
}

/// Run `fut` to completion from synchronous code, reusing the current
/// runtime when there is one.
fn block_on<F: Future>(fut: F) -> Result<F::Output, GenerateError> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Ok(tokio::task::block_in_place(|| handle.block_on(fut))),
        Err(_) => {
            let rt = tokio::runtime::Runtime::new()
                .map_err(|e| GenerateError::Generator(format!("failed to create tokio runtime: {e}")))?;
            Ok(rt.block_on(fut))
        }
    }
}

fn into_output(result: RunResult) -> Result<GeneratorOutput, GenerateError> {
    if result.is_error {
        let detail = if result.errors.is_empty() {
            "no detail".to_string()
        } else {
            result.errors.join("; ")
        };
        return Err(GenerateError::Generator(format!(
            "generator run ended with an error result: {detail}"
        )));
    }
    Ok(match result.structured_output {
        Some(value) => GeneratorOutput::Structured(value),
        None => GeneratorOutput::Text(result.result_text),
    })
}
