use idea_core::config::Config;
use idea_core::generate::DesignGenerator;
use std::sync::Arc;

pub mod generate_design;

pub trait IdeaTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn schema(&self) -> serde_json::Value;
    fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, String>;
}

pub fn all_tools(config: &Config, generator: Arc<dyn DesignGenerator>) -> Vec<Box<dyn IdeaTool>> {
    vec![Box::new(generate_design::GenerateDesignTool::new(
        config.clone(),
        generator,
    ))]
}
