// ReviewBadge shared type definitions
// Each submodule defines types used across the crate.

pub mod badge;
pub mod command;
pub mod errors;
pub mod page;
pub mod pull_request;
pub mod review;
pub mod settings;
