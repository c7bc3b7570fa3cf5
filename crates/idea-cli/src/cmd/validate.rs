use crate::output::print_json;
use anyhow::Context;
use idea_core::config::Config;
use idea_core::io::{read_json, split_bundle};
use idea_core::schema::SchemaValidator;
use std::path::Path;

pub fn run(config: &Config, file: &Path, json: bool) -> anyhow::Result<()> {
    let value = read_json(file).with_context(|| format!("failed to read {}", file.display()))?;
    let value = split_bundle(value).design;

    let validator = SchemaValidator::new(config.validation.clone());
    match validator.validate(&value) {
        Ok(design) => {
            let warnings: Vec<String> = design.lint().iter().map(|w| w.to_string()).collect();
            if json {
                print_json(&serde_json::json!({
                    "valid": true,
                    "issues": design.issues.len(),
                    "violations": [],
                    "warnings": warnings,
                }))?;
            } else {
                println!("{}: valid ({} issues)", file.display(), design.issues.len());
                for warning in &warnings {
                    println!("  warning: {warning}");
                }
            }
            Ok(())
        }
        Err(e) => {
            if json {
                let violations: Vec<serde_json::Value> = e
                    .violations
                    .iter()
                    .map(|v| {
                        serde_json::json!({
                            "path": v.path,
                            "kind": format!("{:?}", v.kind),
                            "message": v.message,
                        })
                    })
                    .collect();
                print_json(&serde_json::json!({
                    "valid": false,
                    "violations": violations,
                    "warnings": [],
                }))?;
            } else {
                println!("{}: invalid", file.display());
                for violation in &e.violations {
                    println!("  {violation}");
                }
            }
            Err(e.into())
        }
    }
}
