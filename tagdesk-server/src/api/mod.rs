//! HTTP API handlers for tagdesk-server

pub mod buildinfo;
pub mod health;
pub mod labeling;
pub mod review;

pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use labeling::labeling_routes;
pub use review::review_routes;

use serde::Serialize;
use tagdesk_common::db::{ReviewPick, Step};

/// Response for every endpoint that shows a record
///
/// Boundary and empty-queue outcomes are ordinary 200 responses so clients
/// can branch on `outcome` instead of treating them as failures.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome<T> {
    Item(T),
    EndOfSequence { msg: &'static str },
    NoMoreItems { msg: &'static str },
}

impl<T> From<Step<T>> for Outcome<T> {
    fn from(step: Step<T>) -> Self {
        match step {
            Step::Found(view) => Outcome::Item(view),
            Step::EndOfSequence => Outcome::EndOfSequence {
                msg: "No more items in this direction",
            },
        }
    }
}

impl<T> From<ReviewPick<T>> for Outcome<T> {
    fn from(pick: ReviewPick<T>) -> Self {
        match pick {
            ReviewPick::Found(view) => Outcome::Item(view),
            ReviewPick::NoMoreItems => Outcome::NoMoreItems {
                msg: "No more items to review",
            },
        }
    }
}

/// Body returned by mutations
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub status: &'static str,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

/// Body returned by imports
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub inserted: u64,
}
