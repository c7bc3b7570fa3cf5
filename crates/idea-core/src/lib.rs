pub mod config;
pub mod design;
pub mod error;
pub mod generate;
pub mod io;
pub mod naming;
pub mod prompt;
pub mod schema;
pub mod sync;
pub mod tracker;

pub use error::{IdeaError, Result};
