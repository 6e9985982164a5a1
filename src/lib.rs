pub mod commands;
pub mod config;
pub mod conversation;
pub mod error;
pub mod feeds;
pub mod format;
pub mod repl;
pub mod store;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;
