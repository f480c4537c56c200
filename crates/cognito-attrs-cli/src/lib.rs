//! Command-line host for the Cognito custom-attributes deployment hook.
//!
//! Plays the deployment host's role: loads the service descriptor, builds the
//! AWS gateway, registers the plugin and fires `after:deploy:deploy`.

pub mod cli;
pub mod commands;
pub mod config;
pub mod observability;
pub mod output;
pub mod service;
