//! Core types and utilities for batch image augmentation.
//!
//! This crate provides the error taxonomy, augmentation configuration and
//! report types shared by the pipeline crate and the command-line tool.

pub mod cli;
pub mod config;
pub mod error;
pub mod types;

pub use cli::*;
pub use config::*;
pub use error::{Error, ErrorKind, Result};
pub use types::*;
