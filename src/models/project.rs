use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents the status of a project.
/// Corresponds to the `project_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Completed,
}

/// Input structure for creating a project.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ProjectInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 2000))]
    pub description: String,
}

/// Partial update for a project. Absent fields are left untouched.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ProjectUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 2000))]
    pub description: Option<String>,

    pub status: Option<ProjectStatus>,
}

impl ProjectUpdate {
    /// At least one field must be supplied for an update to make sense.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }
}

/// Represents a project entity as stored in the database and returned by
/// the API. `is_deleted`/`deleted_at` implement the soft-delete lifecycle:
/// a project with `is_deleted = true` is only reachable through trash
/// endpoints until it is recovered or permanently removed.
#[derive(Debug, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub user_id: i32,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new `Project` from input and the owner's user id.
    /// Status starts as `active`; the trash fields start cleared.
    pub fn new(input: ProjectInput, user_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            status: ProjectStatus::Active,
            user_id,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_creation() {
        let input = ProjectInput {
            title: "Alpha".to_string(),
            description: "desc1".to_string(),
        };
        let project = Project::new(input, 1);
        assert_eq!(project.title, "Alpha");
        assert_eq!(project.user_id, 1);
        assert_eq!(project.status, ProjectStatus::Active);
        assert!(!project.is_deleted);
        assert!(project.deleted_at.is_none());
    }

    #[test]
    fn test_project_input_validation() {
        let valid = ProjectInput {
            title: "Alpha".to_string(),
            description: "desc1".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty_title = ProjectInput {
            title: "".to_string(),
            description: "desc1".to_string(),
        };
        assert!(empty_title.validate().is_err());

        let long_title = ProjectInput {
            title: "a".repeat(201),
            description: "desc1".to_string(),
        };
        assert!(long_title.validate().is_err());
    }

    #[test]
    fn test_project_update_is_empty() {
        let empty = ProjectUpdate {
            title: None,
            description: None,
            status: None,
        };
        assert!(empty.is_empty());

        let status_only = ProjectUpdate {
            title: None,
            description: None,
            status: Some(ProjectStatus::Completed),
        };
        assert!(!status_only.is_empty());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&ProjectStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::to_string(&ProjectStatus::Completed).unwrap(),
            "\"completed\""
        );
    }
}
