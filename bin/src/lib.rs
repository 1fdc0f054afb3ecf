pub mod cli;
pub mod commands;
pub mod host;
pub mod session;
