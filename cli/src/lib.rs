//! planweave-cli library: exposes the command modules for unit tests.

pub mod cli;
pub mod commands;
pub mod error;
