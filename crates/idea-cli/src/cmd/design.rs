use crate::output::{print_design, print_json};
use idea_agent::ClaudeGenerator;
use idea_core::config::Config;
use idea_core::generate::{DesignGenerator, DesignWorkflow, GeneratedDesign};
use idea_core::io::write_design_bundle;
use std::path::Path;

/// Generate once and report lint findings. Shared by `design` and `run`.
pub fn generate(config: &Config, generator: &dyn DesignGenerator, idea: &str) -> anyhow::Result<GeneratedDesign> {
    let design = DesignWorkflow::new(config, generator).generate(idea)?;
    for warning in design.design().lint() {
        tracing::warn!(warning = %warning, "design lint");
    }
    Ok(design)
}

pub fn run(config: &Config, idea: &str, out: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let generator = ClaudeGenerator::from_config(&config.generator);
    let design = generate(config, &generator, idea)?;

    if let Some(dir) = out {
        let (doc, data) = write_design_bundle(dir, &design, idea)?;
        if json {
            print_json(&serde_json::json!({
                "project_name": design.project_name,
                "design_doc": doc,
                "design_json": data,
            }))?;
        } else {
            println!("Wrote {} and {}", doc.display(), data.display());
        }
        return Ok(());
    }

    if json {
        print_json(&design)?;
    } else {
        print_design(&design);
    }
    Ok(())
}
