//! osh: a small command-line shell.
//!
//! A line is split into `;`/`&` segments, each segment into `|` stages, and
//! every stage is forked and exec'd with its stdin/stdout wired to pipes or
//! `<`/`>` redirection files. `!!` re-runs the previous line.

pub mod config;
pub mod error;
pub mod executor;
pub mod history;
pub mod jobs;
pub mod logging;
pub mod meta;
pub mod parse;
pub mod selftest;
pub mod shell;

pub use config::Config;
pub use error::ShellError;
pub use shell::Shell;
