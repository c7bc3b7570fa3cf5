use crate::output::{print_json, print_sync_report};
use anyhow::{bail, Context};
use idea_core::config::{Config, Credentials};
use idea_core::design::DesignResult;
use idea_core::io::{read_json, split_bundle};
use idea_core::naming::project_name;
use idea_core::schema::SchemaValidator;
use idea_core::sync::{repo_description, CancelToken, SyncEngine, SyncOptions, SyncOutcome};
use idea_core::tracker::github::GithubClient;
use std::path::Path;

pub struct SyncArgs<'a> {
    pub design: &'a Path,
    pub name: Option<&'a str>,
    pub idea: Option<&'a str>,
}

/// `idea sync`: publish a saved design. Returns the process exit code.
pub fn run(config: &Config, args: SyncArgs<'_>, json: bool) -> anyhow::Result<i32> {
    let value = read_json(args.design).with_context(|| format!("failed to read {}", args.design.display()))?;
    let saved = split_bundle(value);
    let design = SchemaValidator::new(config.validation.clone())
        .validate(&saved.design)
        .with_context(|| format!("{} is not a valid design", args.design.display()))?;

    let name = match (args.name, args.idea, saved.project_name) {
        (Some(name), _, _) => name.to_string(),
        (None, Some(idea), _) => project_name(idea, config.naming.max_len),
        (None, None, Some(stored)) => stored,
        (None, None, None) => bail!("no repository name: pass --name or --idea, or sync a saved design.json"),
    };
    let idea = args.idea.or(saved.idea.as_deref()).unwrap_or(&name);
    let description = repo_description(idea);

    let credentials = Credentials::from_env()?;
    publish(config, &credentials, &design, &name, &description, json)
}

/// Sync `design` into the repository `name` and print the outcome.
pub fn publish(
    config: &Config,
    credentials: &Credentials,
    design: &DesignResult,
    name: &str,
    description: &str,
    json: bool,
) -> anyhow::Result<i32> {
    let client = GithubClient::new(&config.github, credentials).context("failed to build GitHub client")?;
    let cancel = CancelToken::new();
    install_interrupt_handler(cancel.clone());

    tracing::info!(repo = name, issues = design.issues.len(), "starting sync");
    let outcome = SyncEngine::new(&client, SyncOptions::from(&config.github))
        .with_cancel(cancel)
        .run(name, description, design);
    let code = outcome.exit_code();
    let label = outcome.label();

    match outcome {
        SyncOutcome::Success(report) | SyncOutcome::PartialSuccess(report) => {
            if json {
                print_json(&serde_json::json!({ "outcome": label, "report": report }))?;
            } else {
                print_sync_report(&report, label);
            }
            Ok(code)
        }
        SyncOutcome::Aborted(abort) => {
            let error = anyhow::Error::new(abort.error);
            if json {
                print_json(&serde_json::json!({
                    "outcome": "aborted",
                    "state": abort.at,
                    "trace": abort.trace,
                    "error": format!("{error:#}"),
                }))?;
                Ok(code)
            } else {
                Err(error.context(format!("sync aborted at {}", abort.at)))
            }
        }
    }
}

/// Trip `cancel` on the first Ctrl-C. The in-flight request finishes and
/// remaining items are skipped. A second Ctrl-C exits immediately.
fn install_interrupt_handler(cancel: CancelToken) {
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt,
            Err(e) => {
                tracing::debug!(error = %e, "interrupt handler unavailable");
                return;
            }
        };
        rt.block_on(async {
            while tokio::signal::ctrl_c().await.is_ok() {
                if on_interrupt(&cancel) == Interrupt::Exit {
                    eprintln!("second interrupt; exiting");
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
                eprintln!("interrupt received; stopping after the current request (Ctrl-C again to exit)");
            }
        });
    });
}

/// Conventional exit status for a process stopped by SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, PartialEq, Eq)]
enum Interrupt {
    Cancel,
    Exit,
}

fn on_interrupt(cancel: &CancelToken) -> Interrupt {
    if cancel.is_cancelled() {
        Interrupt::Exit
    } else {
        cancel.cancel();
        Interrupt::Cancel
    }
}
