//! CLI command implementations.

pub mod common;
pub mod demo;
pub mod devices;
pub mod play;
