//! Core types and utilities for the ecosim grid ecosystem simulation.

pub mod types;
pub mod config;
pub mod error;
pub mod census;
pub mod rules;

pub use error::{Error, Result};
pub use types::*;
pub use config::*;
pub use census::*;
