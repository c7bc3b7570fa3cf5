use crate::output::print_json;
use idea_core::config::Config;
use idea_core::naming::project_name;

pub fn run(config: &Config, idea: &str, max_len: Option<usize>, json: bool) -> anyhow::Result<()> {
    let max_len = max_len.unwrap_or(config.naming.max_len);
    let name = project_name(idea, max_len);
    if name.is_empty() {
        tracing::warn!("idea produced an empty project name");
    }

    if json {
        print_json(&serde_json::json!({ "project_name": name, "max_len": max_len }))?;
    } else {
        println!("{name}");
    }
    Ok(())
}
