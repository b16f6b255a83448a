//! Database models and queries

pub mod init;
pub mod models;
pub mod mutator;
pub mod navigator;
pub mod progress;
pub mod registry;
pub mod selection;
pub mod store;
pub mod tables;

pub use init::*;
pub use models::*;
pub use tables::{RecordTable, LABEL_ITEMS, REVIEW_INPUTS};
