use super::IdeaTool;
use idea_core::config::Config;
use idea_core::generate::{check_idea, DesignGenerator, DesignWorkflow, MIN_IDEA_CHARS};
use serde_json::Value;
use std::sync::Arc;

pub struct GenerateDesignTool {
    config: Config,
    generator: Arc<dyn DesignGenerator>,
}

impl GenerateDesignTool {
    pub fn new(config: Config, generator: Arc<dyn DesignGenerator>) -> Self {
        Self { config, generator }
    }
}

impl IdeaTool for GenerateDesignTool {
    fn name(&self) -> &str {
        "generate_design"
    }

    fn description(&self) -> &str {
        "Turn an app idea into a design document and a prioritized, ordered backlog of issues"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "idea": {
                    "type": "string",
                    "minLength": MIN_IDEA_CHARS,
                    "description": "Free-text description of the application idea"
                }
            },
            "required": ["idea"]
        })
    }

    fn call(&self, args: Value) -> Result<Value, String> {
        let idea = args["idea"]
            .as_str()
            .ok_or("missing required argument: idea")?;
        check_idea(idea).map_err(|e| e.to_string())?;

        let design = DesignWorkflow::new(&self.config, self.generator.as_ref())
            .generate(idea)
            .map_err(|e| e.to_string())?;
        for warning in design.design().lint() {
            tracing::warn!(warning = %warning, "design lint");
        }
        serde_json::to_value(&design).map_err(|e| e.to_string())
    }
}
