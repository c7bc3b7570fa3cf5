pub mod config;
pub mod design;
pub mod mcp;
pub mod name;
pub mod run;
pub mod sync;
pub mod validate;
