use serde::{Deserialize, Serialize};

use super::repo::TodoItem;
use crate::validation::ValidationErrors;

/// Request body for creating or replacing a to-do item.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoRequest {
    pub title: String,
    #[serde(default)]
    pub is_done: bool,
}

impl TodoRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.title.is_empty() {
            errors.add("title", "Title is required.");
        } else if self.title.chars().count() > 200 {
            errors.add("title", "Title must be between 1 and 200 characters.");
        }
        errors.into_result()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub id: i64,
    pub title: String,
    pub is_done: bool,
    pub user_id: i64,
}

impl From<TodoItem> for TodoResponse {
    fn from(item: TodoItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            is_done: item.is_done,
            user_id: item.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str) -> TodoRequest {
        TodoRequest {
            title: title.into(),
            is_done: false,
        }
    }

    #[test]
    fn one_character_title_is_accepted() {
        assert!(request("x").validate().is_ok());
    }

    #[test]
    fn two_hundred_character_title_is_accepted() {
        assert!(request(&"a".repeat(200)).validate().is_ok());
    }

    #[test]
    fn empty_title_is_rejected() {
        let errors = request("").validate().unwrap_err().into_map();
        assert_eq!(errors["title"][0], "Title is required.");
    }

    #[test]
    fn oversized_title_is_rejected() {
        let errors = request(&"a".repeat(201)).validate().unwrap_err().into_map();
        assert_eq!(
            errors["title"][0],
            "Title must be between 1 and 200 characters."
        );
    }

    #[test]
    fn response_uses_camel_case() {
        let json = serde_json::to_value(TodoResponse {
            id: 3,
            title: "buy milk".into(),
            is_done: true,
            user_id: 9,
        })
        .unwrap();
        assert_eq!(json["isDone"], true);
        assert_eq!(json["userId"], 9);
    }
}
