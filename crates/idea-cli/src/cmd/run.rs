use crate::cmd::design::generate;
use crate::cmd::sync::publish;
use crate::output::print_design;
use anyhow::bail;
use idea_agent::ClaudeGenerator;
use idea_core::config::{Config, Credentials};
use idea_core::generate::{DesignGenerator, MIN_IDEA_CHARS};
use idea_core::sync::repo_description;
use std::io::{BufRead, Write};

/// The interactive flow: read an idea, show the design, and publish it on
/// confirmation. Returns the process exit code.
pub fn run(config: &Config, idea: Option<String>, yes: bool) -> anyhow::Result<i32> {
    let generator = ClaudeGenerator::from_config(&config.generator);
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut stdout = std::io::stdout();
    interact(config, &generator, idea, yes, &mut input, &mut stdout)
}

fn interact(
    config: &Config,
    generator: &dyn DesignGenerator,
    idea: Option<String>,
    yes: bool,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<i32> {
    let idea = match idea {
        Some(idea) => idea,
        None => prompt(input, out, "Enter your app idea: ")?,
    };
    let idea = idea.trim().to_string();
    if idea.chars().count() < MIN_IDEA_CHARS {
        bail!("Idea must be at least {MIN_IDEA_CHARS} characters long.");
    }

    let design = generate(config, generator, &idea)?;
    print_design(&design);

    if !yes {
        let answer = prompt(input, out, "\nCreate a new GitHub repo and add these issues? (y/n): ")?;
        if answer.trim().to_lowercase() != "y" {
            writeln!(out, "Skipping repository creation.")?;
            return Ok(0);
        }
    }

    let credentials = Credentials::from_env()?;
    publish(
        config,
        &credentials,
        &design.design(),
        &design.project_name,
        &repo_description(&idea),
        false,
    )
}

fn prompt(input: &mut impl BufRead, out: &mut impl Write, question: &str) -> anyhow::Result<String> {
    write!(out, "{question}")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
