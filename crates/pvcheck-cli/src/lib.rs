//! Library side of the `pvcheck` binary.

pub mod commands;
pub mod logging;
pub mod types;
