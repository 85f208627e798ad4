use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// An item that belongs to a list through the `lists_items` relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TodoItem {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub done: bool,
}

/// Payload for creating an item. New items always start with `done = false`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TodoItemInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,
}

/// Partial update of an item, applied in the order title, description, done.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_item_update_not_empty"))]
pub struct UpdateItemInput {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub done: Option<bool>,
}

impl UpdateItemInput {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.done.is_none()
    }
}

fn validate_item_update_not_empty(input: &UpdateItemInput) -> Result<(), ValidationError> {
    if input.is_empty() {
        return Err(ValidationError::new("update_has_no_values"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_input_validation() {
        let too_long = TodoItemInput {
            title: "a".repeat(256),
            description: String::new(),
        };
        assert!(too_long.validate().is_err());

        let long_description = TodoItemInput {
            title: "Milk".to_string(),
            description: "b".repeat(1001),
        };
        assert!(long_description.validate().is_err());
    }

    #[test]
    fn test_done_only_update_is_accepted() {
        let update: UpdateItemInput = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert_eq!(update.done, Some(true));
        assert!(update.title.is_none());
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_empty_update_is_rejected() {
        let update: UpdateItemInput = serde_json::from_str("{}").unwrap();
        assert!(update.validate().is_err());
    }
}
