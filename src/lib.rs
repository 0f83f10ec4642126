//! Shelf application library
//!
//! Wires the book module onto the shared store and exposes the entry points
//! used by the `shelf-app` binary and the `shelf` CLI.

pub mod app;
pub mod modules;

pub use app::{build_registry, run, seed};
