use crate::output::print_json;
use clap::Subcommand;
use idea_core::config::{Config, Credentials};
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration (file, defaults and environment)
    Show,
}

pub fn run(config: &Config, path: &Path, subcommand: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcommand {
        ConfigSubcommand::Show => show(config, path, json),
    }
}

fn show(config: &Config, path: &Path, json: bool) -> anyhow::Result<()> {
    let token = if Credentials::from_env().is_ok() { "present" } else { "absent" };

    if json {
        print_json(&serde_json::json!({
            "path": path,
            "file_exists": path.exists(),
            "token": token,
            "config": config,
        }))?;
        return Ok(());
    }

    let source = if path.exists() { "" } else { " (not found, using defaults)" };
    println!("# config: {}{source}", path.display());
    println!("# token: {token}");
    print!("{}", serde_yaml::to_string(config)?);
    Ok(())
}
