//! stable-collector - index and search Stable Diffusion generation metadata
//!
//! This crate provides:
//! - A parser for the "parameters" text blob that the WebUI embeds in PNG outputs
//! - A persisted JSON index mapping image paths to parsed records (or error markers)
//! - A directory walker that populates the index without aborting on bad files
//! - Substring search over indexed records, for handing path lists to a viewer

pub mod commands;
pub mod config;
pub mod error;
pub mod index;
pub mod parse;
pub mod query;
pub mod reader;
pub mod walk;

pub use config::Config;
pub use error::{Error, Result};
