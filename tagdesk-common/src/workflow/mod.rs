//! Walkthrough operations combining the store, navigator and progress tracker
//!
//! Each function returns a complete view: the record plus its position and
//! the parent's current total.

pub mod labeling;
pub mod review;
