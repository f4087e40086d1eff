//! ReviewBadge: your own review status next to every GitHub pull request link.
//!
//! This library crate exposes all modules for use by the binaries and integration tests.

pub mod app;
pub mod dom;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
