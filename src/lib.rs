//! patchbridge - patch tracker to pull request bridge
//!
//! Turns patch series tracked on a patchwork instance into applied
//! branches and GitHub pull requests, posts apply results back to the
//! tracker as checks, and closes pull requests whose series are no longer
//! active.

pub mod config;
pub mod error;
pub mod filter;
pub mod notify;
pub mod platform;
pub mod reconcile;
pub mod repo;
pub mod tracker;
pub mod types;
