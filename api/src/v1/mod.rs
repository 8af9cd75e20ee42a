use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message returned by a successful delete.
pub const DELETED_MESSAGE: &str = "Todo deleted successfully";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/todos`.
///
/// `text` is optional on the wire so that a missing field is reported the
/// same way as a blank one.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub text: Option<String>,
}

impl CreateTodo {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// Body of `PUT /api/todos/{id}`. Absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdateTodo {
    pub fn completed(completed: bool) -> Self {
        Self {
            text: None,
            completed: Some(completed),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            completed: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.completed.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub message: String,
}

impl Default for Deleted {
    fn default() -> Self {
        Self {
            message: String::from(DELETED_MESSAGE),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Trims `text`, returning `None` when nothing but whitespace is left.
pub fn trimmed_text(text: &str) -> Option<&str> {
    let text = text.trim();

    match text.is_empty() {
        true => None,
        false => Some(text),
    }
}
