mod cmd;
mod output;
mod settings;
mod tools;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "idea",
    about = "Turn an app idea into a design document and a prioritized GitHub backlog",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: ./idea.yaml if present)
    #[arg(long, global = true, env = "IDEA_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Debug-level logging on stderr
    #[arg(long, short = 'v', global = true, env = "IDEA_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive flow: idea, design, confirm, publish to GitHub
    Run {
        /// The idea (prompted for on stdin when omitted)
        idea: Option<String>,

        /// Publish without asking for confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Generate a design document and backlog for an idea
    Design {
        idea: String,

        /// Write DESIGN.md and design.json into this directory
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Publish a saved design to GitHub
    Sync {
        /// design.json written by `idea design --out`, or a bare design document
        #[arg(long)]
        design: PathBuf,

        /// Repository name (overrides the saved project name)
        #[arg(long)]
        name: Option<String>,

        /// The original idea; used for the description and, without --name, the repository name
        #[arg(long)]
        idea: Option<String>,
    },

    /// Check a design file against the schema and content conventions
    Validate { file: PathBuf },

    /// Print the project name derived from an idea
    Name {
        idea: String,

        /// Maximum length (default: naming.max_len)
        #[arg(long)]
        max_len: Option<usize>,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Run as an MCP stdio server exposing `generate_design`
    Mcp,
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        match &cli.command {
            Commands::Run { .. } | Commands::Sync { .. } | Commands::Mcp => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = settings::load(cli.config.as_deref()).and_then(|config| {
        let json = cli.json;
        match cli.command {
            Commands::Run { idea, yes } => cmd::run::run(&config, idea, yes),
            Commands::Design { idea, out } => cmd::design::run(&config, &idea, out.as_deref(), json).map(|()| 0),
            Commands::Sync { design, name, idea } => cmd::sync::run(
                &config,
                cmd::sync::SyncArgs {
                    design: &design,
                    name: name.as_deref(),
                    idea: idea.as_deref(),
                },
                json,
            ),
            Commands::Validate { file } => cmd::validate::run(&config, &file, json).map(|()| 0),
            Commands::Name { idea, max_len } => cmd::name::run(&config, &idea, max_len, json).map(|()| 0),
            Commands::Config { subcommand } => {
                let path = settings::config_path(cli.config.as_deref());
                cmd::config::run(&config, &path, subcommand, json).map(|()| 0)
            }
            Commands::Mcp => cmd::mcp::run(&config).map(|()| 0),
        }
    });

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
