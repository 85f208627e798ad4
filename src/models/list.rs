use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// A todo list reachable by its owners through the `users_lists` relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TodoList {
    pub id: i32,
    pub title: String,
    pub description: String,
}

/// Payload for creating a list.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TodoListInput {
    /// Must be between 1 and 255 characters.
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    /// Optional on the wire, stored as an empty string when omitted.
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,
}

/// Partial update of a list. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_list_update_not_empty"))]
pub struct UpdateListInput {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

impl UpdateListInput {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

fn validate_list_update_not_empty(input: &UpdateListInput) -> Result<(), ValidationError> {
    if input.is_empty() {
        return Err(ValidationError::new("update_has_no_values"));
    }
    Ok(())
}
