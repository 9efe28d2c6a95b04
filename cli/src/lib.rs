pub mod audio;
pub mod commands;
pub mod context;
pub mod logging;
pub mod repl;
pub mod service;

pub use context::CliContext;
pub use repl::readline;
