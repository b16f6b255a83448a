//! Database models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Cursor direction in id order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prev" => Ok(Direction::Prev),
            "next" => Ok(Direction::Next),
            other => Err(Error::MalformedInput(format!(
                "direction must be 'prev' or 'next', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Prev => write!(f, "prev"),
            Direction::Next => write!(f, "next"),
        }
    }
}

/// Labeling completion, derived from the label itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    Completed,
}

impl ItemStatus {
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some(l) if !l.is_empty() => ItemStatus::Completed,
            _ => ItemStatus::Pending,
        }
    }
}

/// Review status, stored explicitly in `llm_inputs.status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Reviewed,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Reviewed => "reviewed",
        }
    }
}

impl FromStr for ReviewStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReviewStatus::Pending),
            "reviewed" => Ok(ReviewStatus::Reviewed),
            other => Err(Error::Internal(format!("unknown review status '{}'", other))),
        }
    }
}

/// A labeling dataset with its fixed label option list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    pub id: i64,
    pub name: String,
    pub label_options: Vec<String>,
    pub created_at: NaiveDateTime,
}

/// An LLM review session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmSession {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: NaiveDateTime,
}

/// One labelable item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabelItem {
    pub id: i64,
    pub dataset_id: i64,
    pub content: Value,
    pub label: Option<String>,
}

impl LabelItem {
    pub fn status(&self) -> ItemStatus {
        ItemStatus::from_label(self.label.as_deref())
    }

    /// Top-level field names of the payload, in document order
    pub fn all_keys(&self) -> Vec<String> {
        match &self.content {
            Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}

/// One input/output pair under review
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewInput {
    pub id: i64,
    pub session_id: i64,
    pub input: String,
    pub original_output: String,
    pub curated_output: Option<String>,
    pub status: ReviewStatus,
}

/// Import payload for a review session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewPair {
    pub input: String,
    pub output: String,
}

/// Counts for one parent collection, computed fresh per call
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Progress {
    pub total: i64,
    pub completed: i64,
}

/// Result of a cursor move: the adjacent record, or the boundary
#[derive(Debug, Clone, PartialEq)]
pub enum Step<T> {
    Found(T),
    EndOfSequence,
}

impl<T> Step<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Step::Found(t) => Some(t),
            Step::EndOfSequence => None,
        }
    }
}

/// Result of review selection: a record, or an empty session
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewPick<T> {
    Found(T),
    NoMoreItems,
}

impl<T> ReviewPick<T> {
    pub fn found(self) -> Option<T> {
        match self {
            ReviewPick::Found(t) => Some(t),
            ReviewPick::NoMoreItems => None,
        }
    }
}

/// A labeling item as shown to the client
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LabelingView {
    pub id: i64,
    pub dataset_id: i64,
    pub content: Value,
    pub label: Option<String>,
    pub status: ItemStatus,
    pub label_options: Vec<String>,
    pub all_keys: Vec<String>,
    pub position: i64,
    pub total: i64,
}

/// A review input as shown to the client
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReviewView {
    pub id: i64,
    pub session_id: i64,
    pub input: String,
    pub original_output: String,
    pub curated_output: Option<String>,
    pub status: ReviewStatus,
    pub position: i64,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direction_parse() {
        assert_eq!("prev".parse::<Direction>().unwrap(), Direction::Prev);
        assert_eq!("next".parse::<Direction>().unwrap(), Direction::Next);
        assert!(matches!(
            "sideways".parse::<Direction>(),
            Err(Error::MalformedInput(_))
        ));
    }

    #[test]
    fn test_item_status_derived_from_label() {
        assert_eq!(ItemStatus::from_label(None), ItemStatus::Pending);
        assert_eq!(ItemStatus::from_label(Some("")), ItemStatus::Pending);
        assert_eq!(ItemStatus::from_label(Some("apple")), ItemStatus::Completed);
    }

    #[test]
    fn test_all_keys_preserves_document_order() {
        let item = LabelItem {
            id: 1,
            dataset_id: 1,
            content: json!({"zeta": 1, "alpha": 2, "mid": 3}),
            label: None,
        };
        assert_eq!(item.all_keys(), vec!["zeta", "alpha", "mid"]);
    }
}
