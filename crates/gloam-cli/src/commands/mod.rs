//! CLI commands

pub mod connect;
pub mod edit;
