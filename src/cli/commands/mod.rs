//! CLI command implementations

pub mod utils;

pub mod completions;
pub mod deps;
pub mod graph;
pub mod init;
pub mod list;
pub mod new;
pub mod search;
pub mod show;
pub mod step;
pub mod validate;
