//! # tagdesk Common Library
//!
//! Core of the dataset labeling and LLM review tool:
//! - Database initialization and models
//! - Item store, dataset/session registry
//! - Cursor navigation and progress tracking over id-ordered records
//! - Label/curation mutator
//! - Configuration loading

pub mod config;
pub mod db;
pub mod error;
pub mod workflow;

pub use error::{Error, Result};
