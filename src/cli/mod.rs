//! CLI commands

pub mod check;
pub mod context;
pub mod style;
pub mod sync;
