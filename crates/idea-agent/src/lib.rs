//! `idea-agent`: drives the Claude CLI as a design generator.
//!
//! ```text
//! QueryOptions
//!     │
//!     ▼
//! ClaudeProcess   ← spawns `claude --output-format stream-json …`
//!     │              prompt on stdin, JSONL on stdout
//!     ▼
//! runner::collect ← drains messages until the terminal `result`
//!     │
//!     ▼
//! ClaudeGenerator ← implements idea_core::generate::DesignGenerator
//! ```

pub mod error;
pub mod generator;
pub mod runner;
pub mod types;

pub(crate) mod process;

pub use error::AgentError;
pub use generator::ClaudeGenerator;
pub use runner::{run, RunConfig, RunResult};
pub use types::{Message, QueryOptions, ResultMessage};

pub type Result<T> = std::result::Result<T, AgentError>;
