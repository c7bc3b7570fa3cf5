//! The idea → instruction → generator → parse → validate pipeline.
//!
//! The generator itself is an untrusted, non-deterministic text source behind
//! the [`DesignGenerator`] trait. Parse and validation failures surface as
//! distinct [`GenerateError`] variants; nothing here retries or repairs
//! output; regenerating is the caller's decision.

use crate::config::Config;
use crate::design::{DesignResult, Issue};
use crate::error::GenerateError;
use crate::naming::project_name;
use crate::prompt::PromptBuilder;
use crate::schema::SchemaValidator;
use serde::Serialize;
use serde_json::Value;

/// Ideas shorter than this are rejected before any generation call.
pub const MIN_IDEA_CHARS: usize = 5;

// ---------------------------------------------------------------------------
// Generator boundary
// ---------------------------------------------------------------------------

/// What a generator hands back: plain text, or an already-structured value.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorOutput {
    Text(String),
    Structured(Value),
}

pub trait DesignGenerator: Send + Sync {
    fn generate(&self, instruction: &str) -> Result<GeneratorOutput, GenerateError>;
}

/// Parse generator output as JSON.
///
/// Text is parsed directly. A structured value is parsed from its textual
/// representation; a structured string is treated as the text itself.
pub fn parse_output(output: GeneratorOutput) -> Result<Value, GenerateError> {
    let text = match output {
        GeneratorOutput::Text(text) => text,
        GeneratorOutput::Structured(Value::String(text)) => text,
        GeneratorOutput::Structured(value) => value.to_string(),
    };
    serde_json::from_str(text.trim()).map_err(GenerateError::Parse)
}

pub fn check_idea(idea: &str) -> Result<(), GenerateError> {
    let got = idea.chars().count();
    if got < MIN_IDEA_CHARS {
        return Err(GenerateError::IdeaTooShort {
            min: MIN_IDEA_CHARS,
            got,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// GeneratedDesign
// ---------------------------------------------------------------------------

/// The tool-boundary result: a validated design plus its derived name.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDesign {
    pub project_name: String,
    pub design_markdown: String,
    pub issues: Vec<Issue>,
}

impl GeneratedDesign {
    pub fn new(project_name: String, design: DesignResult) -> Self {
        Self {
            project_name,
            design_markdown: design.design_markdown,
            issues: design.issues,
        }
    }

    pub fn design(&self) -> DesignResult {
        DesignResult {
            design_markdown: self.design_markdown.clone(),
            issues: self.issues.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// DesignWorkflow
// ---------------------------------------------------------------------------

pub struct DesignWorkflow<'a> {
    generator: &'a dyn DesignGenerator,
    prompt: PromptBuilder,
    validator: SchemaValidator,
    max_name_len: usize,
}

impl<'a> DesignWorkflow<'a> {
    pub fn new(config: &Config, generator: &'a dyn DesignGenerator) -> Self {
        Self {
            generator,
            prompt: PromptBuilder::new(config.validation.issue_count),
            validator: SchemaValidator::new(config.validation.clone()),
            max_name_len: config.naming.max_len,
        }
    }

    /// One generation attempt. Returns a validated design or the first fatal
    /// error; never calls the generator for an idea that is too short.
    pub fn generate(&self, idea: &str) -> Result<GeneratedDesign, GenerateError> {
        check_idea(idea)?;

        let instruction = self.prompt.build(idea);
        tracing::info!(idea_chars = idea.chars().count(), "requesting design from generator");
        let output = self.generator.generate(&instruction)?;

        let value = parse_output(output).inspect_err(|e| {
            tracing::warn!(error = %e, "generator output is not JSON");
        })?;
        let design = self.validator.validate(&value).inspect_err(|e| {
            tracing::warn!(violations = e.violations.len(), "generator output failed validation");
        })?;

        let name = project_name(idea, self.max_name_len);
        tracing::info!(project = %name, issues = design.issues.len(), "design generated");
        Ok(GeneratedDesign::new(name, design))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
